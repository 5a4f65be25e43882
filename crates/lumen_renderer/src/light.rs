//! Light sources.
//!
//! Every light answers the same four questions about a shading point: its
//! color, the direction towards it, how much it fades with distance, and how
//! much of it gets through the scene (shadowing). Shadows are found by
//! probing towards the light and multiplying the transmittance `kt` of every
//! surface crossed, so transparent objects cast tinted shadows.

use lumen_core::Color;
use lumen_math::{Ray, Vec3, RAY_EPSILON};

use crate::scene::Scene;

/// Transmittance below which a shadow is treated as fully dark.
const SHADOW_CUTOFF: f64 = 1.0e-6;

/// Upper bound on surfaces crossed by one shadow probe.
const MAX_SHADOW_PROBES: usize = 1024;

/// Distance falloff `1 / (c0 + c1 d + c2 d^2)`, capped at 1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Attenuation {
    pub constant: f64,
    pub linear: f64,
    pub quadratic: f64,
}

impl Attenuation {
    pub fn new(constant: f64, linear: f64, quadratic: f64) -> Self {
        Self {
            constant,
            linear,
            quadratic,
        }
    }

    /// Falloff at distance `d`. A zero divisor means no falloff.
    pub fn factor(&self, d: f64) -> f64 {
        let divisor = self.constant + self.linear * d + self.quadratic * d * d;
        if divisor == 0.0 {
            return 1.0;
        }
        (1.0 / divisor).min(1.0)
    }
}

impl From<[f64; 3]> for Attenuation {
    fn from([constant, linear, quadratic]: [f64; 3]) -> Self {
        Self::new(constant, linear, quadratic)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Light {
    /// Light from infinitely far away along `orientation`
    Directional { color: Color, orientation: Vec3 },
    Point {
        color: Color,
        position: Vec3,
        attenuation: Attenuation,
    },
    /// Point light restricted to a cone around `orientation`, with a Warn
    /// falloff `cos^focus` inside it
    Spot {
        color: Color,
        position: Vec3,
        orientation: Vec3,
        /// Half-angle of the cone in degrees
        cone_angle: f64,
        focus: f64,
        attenuation: Attenuation,
    },
    /// Uniform light that only feeds the ambient term
    Ambient { color: Color },
}

impl Light {
    /// Light travelling along `direction`.
    pub fn directional(direction: Vec3, color: Color) -> Self {
        Light::Directional {
            color,
            orientation: direction.normalize_or_zero(),
        }
    }

    /// Point light without distance falloff.
    pub fn point(position: Vec3, color: Color) -> Self {
        Light::Point {
            color,
            position,
            attenuation: Attenuation::default(),
        }
    }

    pub fn spot(position: Vec3, direction: Vec3, color: Color, cone_angle: f64, focus: f64) -> Self {
        Light::Spot {
            color,
            position,
            orientation: direction.normalize_or_zero(),
            cone_angle,
            focus,
            attenuation: Attenuation::default(),
        }
    }

    pub fn ambient(color: Color) -> Self {
        Light::Ambient { color }
    }

    /// Set the distance falloff. Only point and spot lights fade.
    pub fn with_attenuation(mut self, falloff: Attenuation) -> Self {
        match &mut self {
            Light::Point { attenuation, .. } | Light::Spot { attenuation, .. } => {
                *attenuation = falloff;
            }
            Light::Directional { .. } | Light::Ambient { .. } => {}
        }
        self
    }

    pub fn color(&self) -> Color {
        match self {
            Light::Directional { color, .. }
            | Light::Point { color, .. }
            | Light::Spot { color, .. }
            | Light::Ambient { color } => *color,
        }
    }

    pub fn is_ambient(&self) -> bool {
        matches!(self, Light::Ambient { .. })
    }

    /// Unit direction from `p` towards the light. Zero for ambient light.
    pub fn direction(&self, p: Vec3) -> Vec3 {
        match self {
            Light::Directional { orientation, .. } => -*orientation,
            Light::Point { position, .. } | Light::Spot { position, .. } => {
                (*position - p).normalize_or_zero()
            }
            Light::Ambient { .. } => Vec3::ZERO,
        }
    }

    /// Scalar falloff of the light at `p`.
    pub fn distance_attenuation(&self, p: Vec3) -> f64 {
        match self {
            Light::Directional { .. } | Light::Ambient { .. } => 1.0,
            Light::Point {
                position,
                attenuation,
                ..
            } => attenuation.factor(p.distance(*position)),
            Light::Spot {
                position,
                attenuation,
                focus,
                ..
            } => match self.cone_cosine(p) {
                Some(cos_lambda) => attenuation.factor(p.distance(*position)) * cos_lambda.powf(*focus),
                None => 0.0,
            },
        }
    }

    /// Fraction of the light that reaches `p` through the scene.
    pub fn shadow_attenuation(&self, scene: &Scene, p: Vec3) -> Color {
        match self {
            Light::Ambient { .. } => Color::ONE,
            Light::Directional { .. } => transmittance(scene, p, self.direction(p), f64::INFINITY),
            Light::Point { position, .. } => {
                transmittance(scene, p, self.direction(p), p.distance(*position))
            }
            Light::Spot { position, .. } => {
                // Nothing is cast outside the cone
                if self.cone_cosine(p).is_none() {
                    return Color::ONE;
                }
                transmittance(scene, p, self.direction(p), p.distance(*position))
            }
        }
    }

    /// Cosine between the spot axis and the direction to `p`, or `None`
    /// outside the cone.
    fn cone_cosine(&self, p: Vec3) -> Option<f64> {
        let Light::Spot {
            position,
            orientation,
            cone_angle,
            ..
        } = self
        else {
            return None;
        };
        let cos_lambda = (p - *position).normalize_or_zero().dot(*orientation).max(0.0);
        (cos_lambda >= cone_angle.to_radians().cos()).then_some(cos_lambda)
    }
}

/// Product of `kt` over every surface between `p` and a light `distance` away
/// along `direction`.
fn transmittance(scene: &Scene, p: Vec3, direction: Vec3, distance: f64) -> Color {
    let mut result = Color::ONE;
    let mut travelled = RAY_EPSILON;

    for _ in 0..MAX_SHADOW_PROBES {
        let probe = Ray::new(p + direction * travelled, direction);
        let Some(hit) = scene.intersect(&probe) else {
            return result;
        };

        // Surfaces behind the light do not occlude it
        if travelled + hit.t >= distance {
            return result;
        }

        result *= scene.material(hit.material).kt;
        if result.max_element() < SHADOW_CUTOFF {
            return Color::ZERO;
        }
        travelled += hit.t + RAY_EPSILON;
    }

    result
}
