//! Real roots of low-degree polynomials.
//!
//! Closed-form solvers (quadratic, Cardano cubic, Ferrari quartic) used by the
//! torus primitive. Quartic roots are refined with a few Newton steps, since the
//! closed form loses several digits when the resolvent is ill-conditioned.

use std::f64::consts::PI;

const EPSILON: f64 = 1e-12;

/// Newton refinement steps applied to each quartic root.
const POLISH_ITERATIONS: usize = 3;

/// Solve `a*x^2 + b*x + c = 0`. Roots are returned in ascending order.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        // Linear
        if b.abs() > EPSILON {
            return vec![-c / b];
        }
        return Vec::new();
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return Vec::new();
    }

    // Avoid cancellation between -b and the square root
    let q = -0.5 * (b + disc.sqrt().copysign(b));
    let mut roots = if q == 0.0 {
        vec![0.0, 0.0]
    } else {
        vec![q / a, c / q]
    };
    roots.sort_by(f64::total_cmp);
    roots
}

/// Solve `a*x^3 + b*x^2 + c*x + d = 0` with Cardano's formula.
pub fn solve_cubic(a: f64, b: f64, c: f64, d: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        return solve_quadratic(b, c, d);
    }

    // Normalize: x^3 + px^2 + qx + r = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;

    // Depressed cubic via substitution x = t - p/3
    let p2 = p * p;
    let aa = q - p2 / 3.0;
    let bb = r - p * q / 3.0 + 2.0 * p2 * p / 27.0;

    let delta = bb * bb / 4.0 + aa * aa * aa / 27.0;
    let shift = p / 3.0;

    if delta > 1e-14 {
        // One real root
        let sqrt_delta = delta.sqrt();
        let u = (-bb / 2.0 + sqrt_delta).cbrt();
        let v = (-bb / 2.0 - sqrt_delta).cbrt();
        vec![u + v - shift]
    } else if delta.abs() <= 1e-14 {
        if aa.abs() < EPSILON && bb.abs() < EPSILON {
            // Triple root
            vec![-shift]
        } else {
            // Double root
            let u = (-bb / 2.0).cbrt();
            vec![2.0 * u - shift, -u - shift]
        }
    } else {
        // Three real roots (trigonometric form)
        let m = 2.0 * (-aa / 3.0).sqrt();
        let theta = (3.0 * bb / (aa * m)).clamp(-1.0, 1.0).acos() / 3.0;

        vec![
            m * theta.cos() - shift,
            m * (theta - 2.0 * PI / 3.0).cos() - shift,
            m * (theta + 2.0 * PI / 3.0).cos() - shift,
        ]
    }
}

/// Solve `a*x^4 + b*x^3 + c*x^2 + d*x + e = 0` with Ferrari's method.
///
/// Returns the real roots in ascending order (repeated roots may appear twice).
pub fn solve_quartic(a: f64, b: f64, c: f64, d: f64, e: f64) -> Vec<f64> {
    if a.abs() < EPSILON {
        return solve_cubic(b, c, d, e);
    }

    // Normalize: x^4 + px^3 + qx^2 + rx + s = 0
    let p = b / a;
    let q = c / a;
    let r = d / a;
    let s = e / a;

    // Depressed quartic y^4 + a2*y^2 + a1*y + a0 = 0 via x = y - p/4
    let p2 = p * p;
    let a2 = q - 3.0 * p2 / 8.0;
    let a1 = r - p * q / 2.0 + p2 * p / 8.0;
    let a0 = s - p * r / 4.0 + p2 * q / 16.0 - 3.0 * p2 * p2 / 256.0;
    let shift = p / 4.0;

    let mut roots = Vec::with_capacity(4);

    if a1.abs() < 1e-14 {
        // Biquadratic
        for z in solve_quadratic(1.0, a2, a0) {
            if z >= 0.0 {
                let y = z.sqrt();
                roots.push(y - shift);
                roots.push(-y - shift);
            }
        }
    } else {
        // Resolvent cubic 8m^3 + 8*a2*m^2 + (2*a2^2 - 8*a0)*m - a1^2 = 0 always has a
        // positive root when a1 != 0; the largest one is the best conditioned.
        let m = solve_cubic(8.0, 8.0 * a2, 2.0 * a2 * a2 - 8.0 * a0, -a1 * a1)
            .into_iter()
            .fold(f64::NEG_INFINITY, f64::max);
        if m <= 0.0 {
            return Vec::new();
        }

        let s = (2.0 * m).sqrt();
        let k = a1 / (2.0 * s);
        for y in solve_quadratic(1.0, -s, a2 / 2.0 + m + k) {
            roots.push(y - shift);
        }
        for y in solve_quadratic(1.0, s, a2 / 2.0 + m - k) {
            roots.push(y - shift);
        }
    }

    for root in roots.iter_mut() {
        *root = polish_root(*root, [a, b, c, d, e]);
    }
    roots.sort_by(f64::total_cmp);
    roots
}

/// Newton-refine a root of the quartic with the given coefficients.
fn polish_root(mut x: f64, [a, b, c, d, e]: [f64; 5]) -> f64 {
    for _ in 0..POLISH_ITERATIONS {
        let f = (((a * x + b) * x + c) * x + d) * x + e;
        let df = ((4.0 * a * x + 3.0 * b) * x + 2.0 * c) * x + d;
        if df == 0.0 {
            break;
        }
        let next = x - f / df;
        if !next.is_finite() {
            break;
        }
        x = next;
    }
    x
}
