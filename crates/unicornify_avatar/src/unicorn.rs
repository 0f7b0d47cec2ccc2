//! The unicorn recipe: balls and bones placed from a [`UnicornData`].
//!
//! Model coordinates have the head at the origin, the body extending
//! along +X and Y pointing down towards the hooves (at about y = 320).

use unicornify_core::{Ball, BallId, BoneCurve, Color, Figure, Skeleton, Thing};
use unicornify_math::{Axis, Vector, DEGREE};

use crate::data::UnicornData;

/// Hip, knee and hoof of one leg plus the rest lengths of its two bones.
#[derive(Debug, Clone, Copy)]
pub struct Leg {
    pub hip: BallId,
    pub knee: BallId,
    pub hoof: BallId,
    calf_length: f64,
    shin_length: f64,
    is_front: bool,
    is_left: bool,
}

impl Leg {
    fn new(
        skeleton: &Skeleton,
        hip: BallId,
        knee: BallId,
        hoof: BallId,
        is_front: bool,
        is_left: bool,
    ) -> Self {
        let (hip_c, knee_c, hoof_c) = (
            skeleton.ball(hip).center,
            skeleton.ball(knee).center,
            skeleton.ball(hoof).center,
        );
        Self {
            hip,
            knee,
            hoof,
            calf_length: (knee_c - hip_c).length(),
            shin_length: (hoof_c - knee_c).length(),
            is_front,
            is_left,
        }
    }

    /// Put the hoof at `target` and bend the knee so both bones keep their
    /// lengths. Front knees bend forward, back knees backward, and legs
    /// reaching far out sideways splay outwards.
    pub fn move_hoof_to(&self, skeleton: &mut Skeleton, target: Vector) {
        let hip = skeleton.ball(self.hip).center;
        let delta = target - hip;
        let side = if self.is_left { -1.0 } else { 1.0 };
        // front legs reach forward (-x), back legs backward (+x)
        let forward = if self.is_front { -1.0 } else { 1.0 };

        let dir = if delta.x * forward <= 0.0 {
            Vector::new(forward, 1.0, 0.0)
        } else {
            let slope = delta.y.abs() / delta.x.abs();
            if slope < 0.3 {
                Vector::new(0.0, 0.0, side)
            } else if slope > 0.6 {
                Vector::new(forward, -1.0, 0.0)
            } else {
                let f = (slope - 0.3) / (0.6 - 0.3);
                Vector::new(forward * f, -f, side * (1.0 - f))
            }
        };

        let knee = hip + joint(delta, self.calf_length, self.shin_length, dir);
        skeleton.ball_mut(self.hoof).center = target;
        skeleton.ball_mut(self.knee).center = knee;
    }

    fn things(&self) -> [Thing; 2] {
        [
            Thing::bone(self.hip, self.knee),
            Thing::bone(self.knee, self.hoof),
        ]
    }
}

/// Knee position relative to the hip for a two-bone limb spanning `span`,
/// bent towards `bend`. Out-of-reach spans straighten the limb.
fn joint(span: Vector, upper: f64, lower: f64, bend: Vector) -> Vector {
    let reach = span.length();
    let Some(axis) = span.try_normalize() else {
        return bend.normalize_or_zero() * upper;
    };
    if reach >= upper + lower || reach <= (upper - lower).abs() {
        return axis * upper;
    }
    let along = (upper * upper - lower * lower + reach * reach) / (2.0 * reach);
    let out = (upper * upper - along * along).max(0.0).sqrt();
    let perpendicular = (bend - axis * axis.dot(bend)).normalize_or_zero();
    axis * along + perpendicular * out
}

/// A built unicorn: its figure plus the named balls the avatar framing
/// needs.
#[derive(Debug, Clone)]
pub struct Unicorn {
    pub figure: Figure,
    pub head: BallId,
    pub snout: BallId,
    pub shoulder: BallId,
    pub butt: BallId,
    pub horn_tip: BallId,
    pub legs: [Leg; 4],
}

impl Unicorn {
    /// Build the unicorn into `skeleton`.
    pub fn new(data: &UnicornData, skeleton: &mut Skeleton) -> Self {
        let body = |l| data.body.color(l);
        let hair = |l| data.hair.color(l);
        let add = |skeleton: &mut Skeleton, p: Vector, r: f64, c: Color| {
            skeleton.add(Ball::new(p, r, c))
        };

        let head = add(skeleton, Vector::ZERO, data.head_size, body(60));
        let snout = add(skeleton, Vector::new(-25.0, 60.0, 0.0), data.snout_size, body(80));
        skeleton.set_distance(snout, data.snout_length, head);
        let shoulder = add(skeleton, Vector::new(80.0, 120.0, 0.0), data.shoulder_size, body(40));
        let butt = add(skeleton, Vector::new(235.0, 155.0, 0.0), data.butt_size, body(40));

        let horn_onset = add(
            skeleton,
            Vector::new(-22.0, -10.0, 0.0),
            data.horn_onset_size,
            data.horn.color(70),
        );
        skeleton.move_to_sphere(horn_onset, head);
        let tip_pos = skeleton.ball(horn_onset).center + Vector::new(-10.0, 0.0, 0.0);
        let horn_tip = add(skeleton, tip_pos, data.horn_tip_size, data.horn.color(90));
        skeleton.set_distance(horn_tip, data.horn_length, horn_onset);
        skeleton.rotate_around(horn_tip, horn_onset, data.horn_angle, Axis::Z);

        let face = make_face(data, skeleton, head);
        let ears = [-1.0, 1.0].map(|side| make_ear(data, skeleton, head, side));
        let legs = make_legs(data, skeleton, shoulder, butt);

        data.pose.apply(skeleton, &legs, data.pose_phase);
        for leg in &legs {
            let hoof = skeleton.ball(leg.hoof).center;
            leg.move_hoof_to(skeleton, hoof);
        }

        let mane = make_mane(data, skeleton, head, shoulder);

        let tail_start_pos = skeleton.ball(butt).center + Vector::new(10.0, -10.0, 0.0);
        let tail_start = add(skeleton, tail_start_pos, data.tail_start_size, hair(80));
        skeleton.move_to_sphere(tail_start, butt);
        let tail_end_pos = skeleton.ball(tail_start).center + Vector::new(10.0, 0.0, 0.0);
        let tail_end = add(skeleton, tail_end_pos, data.tail_end_size, hair(60));
        skeleton.set_distance(tail_end, data.tail_length, tail_start);
        skeleton.rotate_around(tail_end, tail_start, data.tail_angle, Axis::Z);
        let tail = Thing::curved_bone(
            tail_start,
            tail_end,
            None,
            Some(BoneCurve::weighted(data.tail_gamma, 0.3)),
        );

        let mut figure = Figure::new();
        figure.add(Thing::bone(snout, head));
        figure.add(Thing::bone(horn_onset, horn_tip));
        for thing in face {
            figure.add(thing);
        }
        for ear in ears {
            figure.add(ear);
        }

        let head_center = skeleton.ball(head).center;
        skeleton.rotate_all(&figure.ball_ids(), head_center, data.face_tilt, Axis::X);

        figure.add(Thing::bone(head, shoulder));
        figure.add(mane);

        let shoulder_center = skeleton.ball(shoulder).center;
        skeleton.rotate_all(&figure.ball_ids(), shoulder_center, data.neck_tilt, Axis::Y);

        figure.add(Thing::bone(shoulder, butt));
        figure.add(tail);
        for leg in &legs {
            for thing in leg.things() {
                figure.add(thing);
            }
        }

        Self {
            figure,
            head,
            snout,
            shoulder,
            butt,
            horn_tip,
            legs,
        }
    }
}

/// Eyes with pupils and the two three-ball brows.
fn make_face(data: &UnicornData, skeleton: &mut Skeleton, head: BallId) -> Vec<Thing> {
    let mut things = Vec::new();
    let mood = data.brow_mood * 3.0;
    let brow_curve = Some(BoneCurve::gamma(1.5));

    for side in [-1.0, 1.0] {
        let eye = skeleton.add(Ball::new(
            Vector::new(-10.0, 3.0, 5.0 * side),
            data.eye_size,
            Color::WHITE,
        ));
        skeleton.set_gap(eye, 5.0, head);
        let eye_center = skeleton.ball(eye).center;

        let pupil = skeleton.add(Ball::new(
            eye_center + Vector::new(-1.0, 0.0, 0.0),
            data.pupil_size,
            Color::BLACK,
        ));
        skeleton.move_to_sphere(pupil, eye);

        // inner brow ends point towards the middle of the face
        let brow = |z: f64, gap: f64, lightness: i32, skeleton: &mut Skeleton| {
            let id = skeleton.add(Ball::new(
                eye_center + Vector::new(0.0, -10.0, z),
                data.brow_size,
                data.hair.color(lightness),
            ));
            skeleton.set_gap(id, gap, eye);
            id
        };
        let inner = brow(-side * data.brow_length, 5.0 + mood, 50, skeleton);
        let middle = brow(0.0, 5.0 + data.brow_length, 70, skeleton);
        let outer = brow(side * data.brow_length, 5.0 - mood, 60, skeleton);

        things.push(Thing::Ball(eye));
        things.push(Thing::Ball(pupil));
        things.push(Thing::curved_bone(inner, middle, None, brow_curve));
        things.push(Thing::curved_bone(middle, outer, None, brow_curve));
    }
    things
}

/// A hollowed, clipped bone: the outer ear minus an inner one, cut by a
/// fat box bone, then turned by the brow mood.
fn make_ear(data: &UnicornData, skeleton: &mut Skeleton, head: BallId, side: f64) -> Figure {
    let color = data.body.color(60);
    let base_radius = data.head_size * 0.35;

    let base = skeleton.add(Ball::new(
        Vector::new(0.0, -10.0, 10.0 * side),
        base_radius,
        data.body.color(50),
    ));
    skeleton.set_gap(base, -base_radius, head);
    let base_center = skeleton.ball(base).center;
    let tip = skeleton.add(Ball::new(
        base_center + Vector::new(0.0, -data.ear_length, 0.0),
        4.0,
        data.body.color(70),
    ));
    let tip_ball = *skeleton.ball(tip);

    let base_inner = skeleton.add(Ball::new(base_center, base_radius - 2.0, data.body.color(50)));
    let tip_inner = skeleton.add(Ball::new(
        tip_ball.center + Vector::new(-tip_ball.radius, 0.0, 0.0),
        tip_ball.radius - 2.0,
        tip_ball.color,
    ));
    let box_start = skeleton.add(Ball::new(
        base_center + Vector::new(2.0 * base_radius, 2.0 * base_radius, 0.0),
        2.0 * base_radius,
        color,
    ));
    let box_end = skeleton.add(Ball::new(
        tip_ball.center + Vector::new(2.0 * base_radius, -2.0 * base_radius, 0.0),
        2.0 * base_radius,
        color,
    ));

    let mut ear = Figure::new();
    ear.add(Thing::intersection(
        Thing::difference(Thing::bone(base, tip), Thing::bone(base_inner, tip_inner)),
        Thing::bone(box_start, box_end),
    ));

    let front_back = (-45.0 - 45.0 * data.brow_mood * data.brow_mood) * side * DEGREE;
    let up_down = (-20.0 - 10.0 * data.brow_mood) * side * DEGREE;
    let ids = ear.ball_ids();
    skeleton.rotate_all(&ids, base_center, front_back, Axis::Y);
    skeleton.rotate_all(&ids, base_center, up_down, Axis::X);
    ear
}

/// Front legs hang from the shoulder, back legs from the butt. Order is
/// front left, front right, back left, back right.
fn make_legs(data: &UnicornData, skeleton: &mut Skeleton, shoulder: BallId, butt: BallId) -> [Leg; 4] {
    let body = |l| data.body.color(l);
    let leg = |skeleton: &mut Skeleton, anchor, points: [(f64, f64); 3], z: f64, front| {
        let [(hx, hy), (kx, ky), (fx, fy)] = points;
        let hip = skeleton.add(Ball::new(Vector::new(hx, hy, z), 25.0, body(40)));
        let knee = skeleton.add(Ball::new(Vector::new(kx, ky, z), 9.0, body(70)));
        let hoof = skeleton.add(Ball::new(Vector::new(fx, fy, z), 11.0, body(45)));
        skeleton.move_to_sphere(hip, anchor);
        Leg::new(skeleton, hip, knee, hoof, front, z < 0.0)
    };

    let front = [(55.0, 160.0), (35.0, 254.0), (55.0, 310.0)];
    let back = [(225.0, 190.0), (230.0, 265.0), (220.0, 310.0)];
    [
        leg(skeleton, shoulder, front, -25.0, true),
        leg(skeleton, shoulder, front, 25.0, true),
        leg(skeleton, butt, back, -25.0, false),
        leg(skeleton, butt, back, 25.0, false),
    ]
}

/// Curved hairs rooted along the line from the top of the head to the top
/// of the shoulder.
fn make_mane(data: &UnicornData, skeleton: &mut Skeleton, head: BallId, shoulder: BallId) -> Figure {
    let anchor = |skeleton: &mut Skeleton, on: BallId, offset: Vector| {
        let id = skeleton.add(Ball::new(
            skeleton.ball(on).center + offset,
            5.0,
            Color::BLACK,
        ));
        skeleton.move_to_sphere(id, on);
        skeleton.ball(id).center
    };
    let top = anchor(skeleton, head, Vector::new(10.0, -5.0, 0.0));
    let bottom = anchor(skeleton, shoulder, Vector::new(10.0, -15.0, 0.0));
    let span = bottom - top;

    let mut mane = Figure::new();
    for hair in &data.hairs {
        let p = top + span * (hair.start / 100.0);
        let start = skeleton.add(Ball::new(p, 5.0, data.hair.color(60)));
        let end = skeleton.add(Ball::new(
            p + Vector::new(hair.length, 0.0, hair.straightness),
            2.0,
            data.hair.color(hair.tip_lightness),
        ));
        skeleton.rotate_around(end, start, -hair.angle, Axis::Z);
        mane.add(Thing::curved_bone(
            start,
            end,
            Some(BoneCurve::weighted(hair.gamma, 0.2)),
            Some(BoneCurve::weighted(1.0 / hair.gamma, 0.2)),
        ));
    }
    mane
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedRandom;

    fn unicorn(seed: &str) -> (Skeleton, Unicorn) {
        let mut rand = SeedRandom::from_hex(seed).unwrap();
        let mut data = UnicornData::default();
        data.randomize1(&mut rand);
        data.randomize2(&mut rand);
        data.randomize3(&mut rand);
        data.randomize4(&mut rand);
        let mut skeleton = Skeleton::new();
        let unicorn = Unicorn::new(&data, &mut skeleton);
        (skeleton, unicorn)
    }

    #[test]
    fn test_joint_keeps_lengths() {
        let span = Vector::new(10.0, 80.0, 0.0);
        let knee = joint(span, 60.0, 50.0, Vector::new(-1.0, 0.0, 0.0));
        assert!((knee.length() - 60.0).abs() < 1e-9);
        assert!(((span - knee).length() - 50.0).abs() < 1e-9);
        assert!(knee.x < 0.0);

        // out of reach: straight towards the target
        let straight = joint(Vector::new(0.0, 200.0, 0.0), 60.0, 50.0, Vector::X);
        assert!((straight - Vector::new(0.0, 60.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn test_leg_bones_keep_length_after_pose() {
        let (skeleton, unicorn) = unicorn("abad1dea");
        for leg in &unicorn.legs {
            let hip = skeleton.ball(leg.hip).center;
            let knee = skeleton.ball(leg.knee).center;
            let hoof = skeleton.ball(leg.hoof).center;
            let reach = (hoof - hip).length();
            if reach < leg.calf_length + leg.shin_length
                && reach > (leg.calf_length - leg.shin_length).abs()
            {
                assert!(((knee - hip).length() - leg.calf_length).abs() < 1e-6);
                assert!(((hoof - knee).length() - leg.shin_length).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_figure_layout() {
        let (skeleton, unicorn) = unicorn("0badcafe");
        let head = skeleton.ball(unicorn.head).center;
        let butt = skeleton.ball(unicorn.butt).center;
        let horn_tip = skeleton.ball(unicorn.horn_tip).center;
        assert!(butt.x > head.x);
        assert!(horn_tip.y < head.y);
        // every hoof hangs below the body
        for leg in &unicorn.legs {
            assert!(skeleton.ball(leg.hoof).center.y > skeleton.ball(unicorn.shoulder).center.y);
        }
        assert!(unicorn.figure.len() > 10);
    }

    #[test]
    fn test_body_stays_in_side_plane() {
        let (skeleton, unicorn) = unicorn("1234");
        let shoulder = skeleton.ball(unicorn.shoulder).center;
        let butt = skeleton.ball(unicorn.butt).center;
        // the body is never rotated
        assert!((shoulder.z).abs() < 1e-9);
        assert!((butt.z).abs() < 1e-9);
        let snout = skeleton.ball(unicorn.snout).center;
        assert!(snout.is_finite());
    }
}
