//! Rotation primitives on top of glam.

use glam::{Quat, Vec3};

/// Dot products below this magnitude count as orthogonal; above `1 - EPS` as parallel
const PARALLEL_EPSILON: f32 = 1e-3;

/// Unit quaternion for a rotation of `degrees` about `axis`:
/// `(n * sin(θ/2), cos(θ/2))` with `n = axis / |axis|`.
/// Returns `None` for a zero or non-finite axis.
pub fn axis_angle(axis: Vec3, degrees: f32) -> Option<Quat> {
    let n = axis.try_normalize()?;
    let half = degrees.to_radians() * 0.5;
    let (sin, cos) = half.sin_cos();
    Some(Quat::from_xyzw(n.x * sin, n.y * sin, n.z * sin, cos))
}

/// Ordered product `q1 * q2 * ... * qn`, identity when empty
pub fn compose(rotations: impl IntoIterator<Item = Quat>) -> Quat {
    rotations.into_iter().fold(Quat::IDENTITY, |acc, q| acc * q)
}

/// Extension trait for comparing rotations under the double cover
pub trait RotationExt {
    /// `1 - |q · t|`: zero for the same rotation, sign-independent
    fn rotation_distance(&self, target: &Quat) -> f32;

    /// Flip to the hemisphere with non-negative w
    fn canonical(&self) -> Quat;

    /// Angle and unit axis if this is a rotation about a single axis within
    /// `PARALLEL_EPSILON` of `axis`; the angle is signed relative to `axis`.
    fn angle_about(&self, axis: Vec3) -> Option<f32>;
}

impl RotationExt for Quat {
    fn rotation_distance(&self, target: &Quat) -> f32 {
        (1.0 - self.dot(*target).abs()).max(0.0)
    }

    fn canonical(&self) -> Quat {
        if self.w < 0.0 { -*self } else { *self }
    }

    fn angle_about(&self, axis: Vec3) -> Option<f32> {
        let n = axis.try_normalize()?;
        let q = self.canonical();
        let (own_axis, angle) = q.to_axis_angle();
        if angle.abs() < f32::EPSILON {
            return Some(0.0);
        }
        let alignment = own_axis.dot(n);
        if alignment > 1.0 - PARALLEL_EPSILON {
            Some(angle.to_degrees())
        } else if alignment < -(1.0 - PARALLEL_EPSILON) {
            Some(-angle.to_degrees())
        } else {
            None
        }
    }
}

/// True if two axes point in opposite directions
pub fn antiparallel(a: Vec3, b: Vec3) -> bool {
    match (a.try_normalize(), b.try_normalize()) {
        (Some(a), Some(b)) => a.dot(b) < -(1.0 - PARALLEL_EPSILON),
        _ => false,
    }
}

/// Round to a number of decimal places
pub fn round_to(value: f32, decimals: u32) -> f32 {
    let scale = 10f32.powi(decimals as i32);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_degrees_is_exact_identity() {
        let q = axis_angle(Vec3::new(1.0, 1.0, 0.0), 0.0).unwrap();
        assert_eq!(q, Quat::from_xyzw(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_axis_is_normalized() {
        let a = axis_angle(Vec3::new(0.0, -5.0, 0.0), 30.0).unwrap();
        let b = Quat::from_axis_angle(Vec3::NEG_Y, 30f32.to_radians());
        assert!(a.rotation_distance(&b) < 1e-6);
        assert!((a.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_axis_is_rejected() {
        assert!(axis_angle(Vec3::ZERO, 10.0).is_none());
    }

    #[test]
    fn test_distance_ignores_sign() {
        let q = axis_angle(Vec3::X, 40.0).unwrap();
        let t = axis_angle(Vec3::Y, 25.0).unwrap();
        let d1 = q.rotation_distance(&t);
        let d2 = (-q).rotation_distance(&t);
        assert!((d1 - d2).abs() < 1e-7);
        assert!(q.rotation_distance(&-q) < 1e-6);
    }

    #[test]
    fn test_composition_is_order_sensitive() {
        let a = axis_angle(Vec3::X, 60.0).unwrap();
        let b = axis_angle(Vec3::Y, 60.0).unwrap();
        let ab = compose([a, b]);
        let ba = compose([b, a]);
        assert!(ab.rotation_distance(&ba) > 1e-3);
        assert_eq!(compose([]), Quat::IDENTITY);
    }

    #[test]
    fn test_angle_about_axis() {
        let q = axis_angle(Vec3::new(0.0, 0.0, -2.0), 35.0).unwrap();
        let angle = q.angle_about(Vec3::NEG_Z).unwrap();
        assert!((angle - 35.0).abs() < 1e-3);
        let flipped = q.angle_about(Vec3::Z).unwrap();
        assert!((flipped + 35.0).abs() < 1e-3);
        assert!(q.angle_about(Vec3::X).is_none());
    }

    #[test]
    fn test_antiparallel_axes() {
        assert!(antiparallel(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)));
        assert!(!antiparallel(Vec3::new(0.0, 0.0, -1.0), Vec3::new(1.0, 0.0, -1.0)));
    }

    #[test]
    fn test_round_to_three_decimals() {
        assert_eq!(round_to(12.34567, 3), 12.346);
        assert_eq!(round_to(-0.0004, 3), 0.0);
    }
}
