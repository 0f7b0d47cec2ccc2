//! Plane/line intersection via a 3×3 linear solve.

use glam::DVec3;

/// Intersect the plane `p0 + a*e1 + b*e2` with the line `l0 + t*el`.
///
/// Returns `(a, b, t)` packed into a vector, or `None` when the system is
/// singular (line parallel to the plane or degenerate plane axes). Gaussian
/// elimination with partial pivoting.
pub fn intersection_of_plane_and_line(
    p0: DVec3,
    e1: DVec3,
    e2: DVec3,
    l0: DVec3,
    el: DVec3,
) -> Option<DVec3> {
    let mut a = [
        [e1.x, e2.x, -el.x],
        [e1.y, e2.y, -el.y],
        [e1.z, e2.z, -el.z],
    ];
    let rhs = l0 - p0;
    let mut b = [rhs.x, rhs.y, rhs.z];

    for col in 0..3 {
        // pick the row with the largest absolute value in this column
        let mut pivot_row = col;
        let mut pivot_abs = 0.0;
        for (row, values) in a.iter().enumerate().skip(col) {
            let abs = values[col].abs();
            if abs > pivot_abs {
                pivot_abs = abs;
                pivot_row = row;
            }
        }
        if pivot_abs == 0.0 {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; 3];
    for row in (0..3).rev() {
        let mut sum = b[row];
        for k in row + 1..3 {
            sum -= a[row][k] * x[k];
        }
        x[row] = sum / a[row][row];
    }

    Some(DVec3::new(x[0], x[1], x[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_aligned_plane() {
        // plane z = 5, line along +z from the origin
        let r = intersection_of_plane_and_line(
            DVec3::new(0.0, 0.0, 5.0),
            DVec3::X,
            DVec3::Y,
            DVec3::new(1.0, 2.0, 0.0),
            DVec3::Z,
        )
        .unwrap();
        assert!((r - DVec3::new(1.0, 2.0, 5.0)).length() < 1e-12);
    }

    #[test]
    fn test_needs_pivoting() {
        // first column starts with a zero, elimination without pivoting would divide by 0
        let p0 = DVec3::new(0.0, 0.0, 0.0);
        let e1 = DVec3::new(0.0, 1.0, 0.0);
        let e2 = DVec3::new(1.0, 0.0, 0.0);
        let l0 = DVec3::new(3.0, 4.0, -2.0);
        let el = DVec3::new(0.0, 0.0, 1.0);
        let r = intersection_of_plane_and_line(p0, e1, e2, l0, el).unwrap();
        let on_plane = p0 + e1 * r.x + e2 * r.y;
        let on_line = l0 + el * r.z;
        assert!((on_plane - on_line).length() < 1e-12);
        assert!((r.z - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_parallel_line_fails() {
        let r = intersection_of_plane_and_line(
            DVec3::ZERO,
            DVec3::X,
            DVec3::Y,
            DVec3::new(0.0, 0.0, 1.0),
            DVec3::new(1.0, 1.0, 0.0),
        );
        assert!(r.is_none());
    }

    #[test]
    fn test_skewed_plane() {
        let p0 = DVec3::new(1.0, -2.0, 3.0);
        let e1 = DVec3::new(2.0, 1.0, 0.5);
        let e2 = DVec3::new(-1.0, 3.0, 1.0);
        let l0 = DVec3::new(-4.0, 0.0, -7.0);
        let el = DVec3::new(0.5, 0.2, 1.0);
        let r = intersection_of_plane_and_line(p0, e1, e2, l0, el).unwrap();
        let on_plane = p0 + e1 * r.x + e2 * r.y;
        let on_line = l0 + el * r.z;
        assert!((on_plane - on_line).length() < 1e-9);
    }
}
