//! Vector helpers on top of `glam::DVec3`.
//!
//! Scene coordinates have Y pointing down (towards the ground), which is
//! also the screen's Y direction, so no flips happen between the two.

use glam::DVec3;

/// World and camera space vector (f64 precision).
pub type Vector = DVec3;

/// One degree in radians.
pub const DEGREE: f64 = std::f64::consts::PI / 180.0;

/// Coordinate axis used by the axis-aligned rotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Extension trait for DVec3 with the rotations and projections the scene
/// builders need.
pub trait VectorExt {
    /// Rotate around an axis-aligned line through `pivot`.
    ///
    /// The rotation goes from the first remaining axis towards the second,
    /// i.e. Y→Z for `Axis::X`, X→Z for `Axis::Y` and X→Y for `Axis::Z`.
    fn rotated_around(self, pivot: DVec3, angle: f64, axis: Axis) -> DVec3;

    /// Rotate around the line through `a1` and `a2` (Rodrigues' formula).
    fn rotated_around_axis(self, a1: DVec3, a2: DVec3, angle: f64) -> DVec3;

    /// Orthogonal projection onto the line through `a1` and `a2`.
    fn projection_onto_axis(self, a1: DVec3, a2: DVec3) -> DVec3;

    /// Point at fraction `f` of the way to `other`.
    fn between(self, other: DVec3, f: f64) -> DVec3;
}

impl VectorExt for DVec3 {
    fn rotated_around(self, pivot: DVec3, angle: f64, axis: Axis) -> DVec3 {
        let d = self - pivot;
        let (sin, cos) = angle.sin_cos();
        let rotated = match axis {
            Axis::X => DVec3::new(d.x, d.y * cos - d.z * sin, d.y * sin + d.z * cos),
            Axis::Y => DVec3::new(d.x * cos - d.z * sin, d.y, d.x * sin + d.z * cos),
            Axis::Z => DVec3::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos, d.z),
        };
        rotated + pivot
    }

    fn rotated_around_axis(self, a1: DVec3, a2: DVec3, angle: f64) -> DVec3 {
        let v = self - a1;
        let k = (a2 - a1).normalize();
        let (sin, cos) = angle.sin_cos();
        let rotated = v * cos + k.cross(v) * sin + k * (k.dot(v) * (1.0 - cos));
        a1 + rotated
    }

    fn projection_onto_axis(self, a1: DVec3, a2: DVec3) -> DVec3 {
        let axis = (a2 - a1).normalize();
        a1 + axis * (self - a1).dot(axis)
    }

    fn between(self, other: DVec3, f: f64) -> DVec3 {
        self + (other - self) * f
    }
}

/// Two unit vectors spanning the plane orthogonal to the unit vector `n`.
///
/// The first one always lies in the XZ plane, the second is `n × ux`. A
/// straight up or down `n` yields `(1, 0, 0)` as the first axis.
pub fn cross_axes(n: DVec3) -> (DVec3, DVec3) {
    let (n1, n2, n3) = (n.x, n.y, n.z);
    let (x1, x3) = if n1 != 0.0 {
        let mut x3 = (1.0 / (n3 * n3 / (n1 * n1) + 1.0)).sqrt();
        if n1 > 0.0 {
            x3 = -x3;
        }
        (-x3 * n3 / n1, x3)
    } else if n3 != 0.0 {
        let mut x1 = (1.0 / (n1 * n1 / (n3 * n3) + 1.0)).sqrt();
        if n3 < 0.0 {
            x1 = -x1;
        }
        (x1, -x1 * n1 / n3)
    } else {
        (1.0, 0.0)
    };

    let ux = DVec3::new(x1, 0.0, x3);
    let uy = DVec3::new(x3 * n2, -(x3 * n1 - x1 * n3), -(x1 * n2));
    (ux, uy)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < EPS, "{:?} != {:?}", a, b);
    }

    #[test]
    fn test_rotated_around_z() {
        let p = DVec3::new(2.0, 1.0, 5.0);
        let pivot = DVec3::new(1.0, 1.0, 0.0);
        let r = p.rotated_around(pivot, 90.0 * DEGREE, Axis::Z);
        assert_close(r, DVec3::new(1.0, 2.0, 5.0));
    }

    #[test]
    fn test_rotated_around_x_and_y() {
        let p = DVec3::new(0.0, 1.0, 0.0);
        assert_close(
            p.rotated_around(DVec3::ZERO, 90.0 * DEGREE, Axis::X),
            DVec3::new(0.0, 0.0, 1.0),
        );
        let q = DVec3::new(1.0, 0.0, 0.0);
        assert_close(
            q.rotated_around(DVec3::ZERO, 90.0 * DEGREE, Axis::Y),
            DVec3::new(0.0, 0.0, 1.0),
        );
    }

    #[test]
    fn test_rodrigues_matches_axis_rotation() {
        let p = DVec3::new(3.0, -2.0, 7.0);
        let pivot = DVec3::new(1.0, 2.0, 3.0);
        let angle = 37.0 * DEGREE;
        let expected = p.rotated_around(pivot, angle, Axis::Z);
        let actual = p.rotated_around_axis(pivot, pivot + DVec3::Z, angle);
        assert_close(actual, expected);
    }

    #[test]
    fn test_projection_onto_axis() {
        let p = DVec3::new(5.0, 3.0, -2.0);
        let proj = p.projection_onto_axis(DVec3::ZERO, DVec3::new(10.0, 0.0, 0.0));
        assert_close(proj, DVec3::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn test_between() {
        let a = DVec3::new(0.0, 0.0, 0.0);
        let b = DVec3::new(10.0, -4.0, 2.0);
        assert_close(a.between(b, 0.25), DVec3::new(2.5, -1.0, 0.5));
    }

    #[test]
    fn test_cross_axes_orthonormal() {
        let normals = [
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(-1.0, 2.0, 0.5).normalize(),
            DVec3::new(0.3, -0.4, -0.8).normalize(),
            DVec3::new(0.0, 1.0, 0.0),
        ];
        for n in normals {
            let (ux, uy) = cross_axes(n);
            assert!((ux.length() - 1.0).abs() < EPS);
            assert!((uy.length() - 1.0).abs() < EPS);
            assert!(ux.dot(n).abs() < EPS);
            assert!(uy.dot(n).abs() < EPS);
            assert!(ux.dot(uy).abs() < EPS);
            assert_eq!(ux.y, 0.0);
        }
    }

    #[test]
    fn test_cross_axes_looking_forward() {
        let (ux, uy) = cross_axes(DVec3::Z);
        assert_close(ux, DVec3::X);
        assert_close(uy, DVec3::Y);
    }
}
