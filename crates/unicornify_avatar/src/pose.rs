//! Leg poses: periodic joint angle curves sampled at one phase.

use serde::Serialize;
use unicornify_core::Skeleton;
use unicornify_math::{Axis, DEGREE};

use crate::unicorn::Leg;

/// Piecewise-linear periodic curve through `(t, value)` keyframes, with
/// `t` in `[0, 1)` and period 1.
#[derive(Debug, Clone)]
pub struct Keyframes {
    points: Vec<(f64, f64)>,
}

impl Keyframes {
    pub fn new(keyframes: &[(f64, f64)]) -> Self {
        let mut sorted = keyframes.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        // wrap the last keyframe to before 0 and the first to after 1
        let mut points = Vec::with_capacity(sorted.len() + 2);
        if let (Some(&first), Some(&last)) = (sorted.first(), sorted.last()) {
            points.push((last.0 - 1.0, last.1));
            points.extend_from_slice(&sorted);
            points.push((first.0 + 1.0, first.1));
        }
        Self { points }
    }

    /// Value at phase `t`; any real `t` is reduced modulo 1.
    pub fn at(&self, t: f64) -> f64 {
        let t = t.rem_euclid(1.0);
        let (mut t1, mut v1) = (-2.0, 0.0);
        let (mut t2, mut v2) = (2.0, 0.0);
        for &(pt, pv) in &self.points {
            if pt <= t && pt > t1 {
                (t1, v1) = (pt, pv);
            }
            if pt >= t && pt < t2 {
                (t2, v2) = (pt, pv);
            }
        }
        if t1 == t2 {
            return v1;
        }
        v1 + (t - t1) / (t2 - t1) * (v2 - v1)
    }
}

/// Gait the legs are posed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Pose {
    RotatoryGallop,
    Walk,
}

/// Angle curves (degrees) for the upper and lower halves of front and back
/// legs, plus the phase lag of the left legs.
struct Gait {
    front_top: Keyframes,
    front_bottom: Keyframes,
    back_top: Keyframes,
    back_bottom: Keyframes,
    front_left_lag: f64,
    back_left_lag: f64,
}

impl Pose {
    pub const ALL: [Pose; 2] = [Pose::RotatoryGallop, Pose::Walk];

    fn gait(self) -> Gait {
        match self {
            Pose::RotatoryGallop => Gait {
                front_top: Keyframes::new(&[(9.0 / 12.0, 74.0), (2.5 / 12.0, -33.0)]),
                front_bottom: Keyframes::new(&[
                    (2.0 / 12.0, 0.0),
                    (6.0 / 12.0, -107.0),
                    (8.0 / 12.0, -90.0),
                    (10.0 / 12.0, 0.0),
                ]),
                back_top: Keyframes::new(&[
                    (11.0 / 12.0, -53.0),
                    (4.0 / 12.0, 0.0),
                    (6.0 / 12.0, 0.0),
                ]),
                back_bottom: Keyframes::new(&[
                    (11.0 / 12.0, 0.0),
                    (1.5 / 12.0, 90.0),
                    (6.0 / 12.0, 30.0),
                    (8.0 / 12.0, 50.0),
                ]),
                front_left_lag: 0.25,
                back_left_lag: 0.167,
            },
            Pose::Walk => Gait {
                front_top: Keyframes::new(&[(6.5 / 9.0, 40.0), (2.5 / 9.0, -35.0)]),
                front_bottom: Keyframes::new(&[
                    (7.0 / 9.0, 0.0),
                    (2.0 / 9.0, 0.0),
                    (5.0 / 9.0, -70.0),
                ]),
                back_top: Keyframes::new(&[
                    (1.0 / 9.0, -35.0),
                    (4.0 / 9.0, 0.0),
                    (6.0 / 12.0, 0.0),
                ]),
                back_bottom: Keyframes::new(&[(5.0 / 9.0, 40.0), (9.0 / 9.0, 10.0)]),
                front_left_lag: 0.56,
                back_left_lag: 0.44,
            },
        }
    }

    /// Bend the legs (front left, front right, back left, back right) into
    /// this pose at `phase`.
    pub fn apply(self, skeleton: &mut Skeleton, legs: &[Leg; 4], phase: f64) {
        let gait = self.gait();
        let [front_left, front_right, back_left, back_right] = legs;

        bend(skeleton, front_right, &gait.front_top, &gait.front_bottom, phase);
        bend(
            skeleton,
            front_left,
            &gait.front_top,
            &gait.front_bottom,
            phase - gait.front_left_lag,
        );
        bend(skeleton, back_right, &gait.back_top, &gait.back_bottom, phase);
        bend(
            skeleton,
            back_left,
            &gait.back_top,
            &gait.back_bottom,
            phase - gait.back_left_lag,
        );
    }
}

/// Swing the whole leg about the hip, then the lower half about the knee,
/// both in the side plane.
fn bend(skeleton: &mut Skeleton, leg: &Leg, top: &Keyframes, bottom: &Keyframes, phase: f64) {
    let upper = top.at(phase) * DEGREE;
    skeleton.rotate_around(leg.knee, leg.hip, upper, Axis::Z);
    skeleton.rotate_around(leg.hoof, leg.hip, upper, Axis::Z);
    skeleton.rotate_around(leg.hoof, leg.knee, bottom.at(phase) * DEGREE, Axis::Z);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframes_interpolate_and_wrap() {
        let curve = Keyframes::new(&[(0.75, 74.0), (0.25, -33.0)]);
        assert!((curve.at(0.25) + 33.0).abs() < 1e-9);
        assert!((curve.at(0.75) - 74.0).abs() < 1e-9);
        assert!((curve.at(0.5) - 20.5).abs() < 1e-9);
        // across the wrap: 0.75 -> 1.25
        assert!((curve.at(1.0) - 20.5).abs() < 1e-9);
        assert!((curve.at(0.0) - curve.at(1.0)).abs() < 1e-9);
        assert!((curve.at(-0.5) - curve.at(0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_single_keyframe_is_constant() {
        let curve = Keyframes::new(&[(0.3, 12.0)]);
        assert!((curve.at(0.0) - 12.0).abs() < 1e-9);
        assert!((curve.at(0.9) - 12.0).abs() < 1e-9);
    }
}
