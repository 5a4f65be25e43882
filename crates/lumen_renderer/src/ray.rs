//! Traced rays and the dielectric medium stack.
//!
//! A traced ray carries, besides its origin and direction, the list of
//! transparent materials it is currently inside. The list is persistent:
//! pushing or popping yields a new stack that shares its tail with the old one,
//! so the reflected and refracted children of a hit each get their own nesting
//! state without copying or mutating the parent's.

use std::sync::Arc;

use lumen_math::{Vec2, Vec3};

use crate::scene::MaterialId;

#[derive(Debug)]
struct MediumNode {
    material: MaterialId,
    below: MediumStack,
}

/// Persistent stack of the media a ray has entered. Empty means vacuum.
#[derive(Debug, Clone, Default)]
pub struct MediumStack {
    top: Option<Arc<MediumNode>>,
}

impl MediumStack {
    /// The empty stack (travelling in vacuum).
    pub fn new() -> Self {
        Self { top: None }
    }

    /// Material the ray currently travels inside, if any.
    pub fn top(&self) -> Option<MaterialId> {
        self.top.as_ref().map(|node| node.material)
    }

    /// Stack with `material` entered on top of this one.
    pub fn push(&self, material: MaterialId) -> Self {
        Self {
            top: Some(Arc::new(MediumNode {
                material,
                below: self.clone(),
            })),
        }
    }

    /// Stack with the current medium left. Popping vacuum stays in vacuum.
    pub fn pop(&self) -> Self {
        match &self.top {
            Some(node) => node.below.clone(),
            None => Self::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    /// Number of nested media.
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut current = &self.top;
        while let Some(node) = current {
            depth += 1;
            current = &node.below.top;
        }
        depth
    }
}

/// A ray being traced through the scene.
#[derive(Debug, Clone)]
pub struct Ray {
    /// Origin point of the ray
    origin: Vec3,
    /// Unit direction
    direction: Vec3,
    /// Media the ray is travelling inside
    media: MediumStack,
    /// Normalized screen position of the primary sample this ray descends from
    screen: Vec2,
}

impl Ray {
    /// Create a ray in vacuum. The direction is normalized.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
            media: MediumStack::new(),
            screen: Vec2::ZERO,
        }
    }

    /// Create a primary ray for the screen position `(x, y)`.
    pub fn primary(ray: lumen_math::Ray, x: f64, y: f64) -> Self {
        Self::new(ray.origin, ray.direction).with_screen(Vec2::new(x, y))
    }

    pub fn with_media(mut self, media: MediumStack) -> Self {
        self.media = media;
        self
    }

    pub fn with_screen(mut self, screen: Vec2) -> Self {
        self.screen = screen;
        self
    }

    /// A child ray that inherits this ray's screen position.
    pub fn spawn(&self, origin: Vec3, direction: Vec3, media: MediumStack) -> Self {
        Self::new(origin, direction)
            .with_media(media)
            .with_screen(self.screen)
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    #[inline]
    pub fn media(&self) -> &MediumStack {
        &self.media
    }

    #[inline]
    pub fn screen(&self) -> Vec2 {
        self.screen
    }

    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + t * self.direction
    }

    /// The bare geometric ray for intersection queries.
    #[inline]
    pub fn geometric(&self) -> lumen_math::Ray {
        lumen_math::Ray::new(self.origin, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_direction_is_normalized() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 3.0, 4.0));
        assert!((ray.direction().length() - 1.0).abs() < 1e-12);
        assert!((ray.at(5.0) - Vec3::new(0.0, 3.0, 4.0)).length() < 1e-12);
        assert!(ray.media().is_empty());
    }

    #[test]
    fn test_medium_stack_push_pop() {
        let vacuum = MediumStack::new();
        let glass = vacuum.push(MaterialId(1));
        let water_in_glass = glass.push(MaterialId(2));

        assert_eq!(vacuum.top(), None);
        assert_eq!(glass.top(), Some(MaterialId(1)));
        assert_eq!(water_in_glass.top(), Some(MaterialId(2)));
        assert_eq!(water_in_glass.depth(), 2);
        assert_eq!(water_in_glass.pop().top(), Some(MaterialId(1)));

        // Popping vacuum is a no-op
        assert!(vacuum.pop().is_empty());
    }

    #[test]
    fn test_sibling_branches_are_independent() {
        let parent = MediumStack::new().push(MaterialId(1));

        // One child enters a new medium, its sibling leaves the current one
        let entered = parent.push(MaterialId(2));
        let left = parent.pop();

        assert_eq!(parent.top(), Some(MaterialId(1)));
        assert_eq!(entered.top(), Some(MaterialId(2)));
        assert!(left.is_empty());
        assert_eq!(parent.depth(), 1);
    }

    #[test]
    fn test_spawn_keeps_screen_position() {
        let primary = Ray::primary(lumen_math::Ray::new(Vec3::ZERO, Vec3::NEG_Z), 0.25, 0.75);
        let child = primary.spawn(Vec3::ONE, Vec3::X, MediumStack::new().push(MaterialId(0)));

        assert_eq!(child.screen(), Vec2::new(0.25, 0.75));
        assert_eq!(child.media().top(), Some(MaterialId(0)));
        assert_eq!(child.geometric().direction, Vec3::X);
    }
}
