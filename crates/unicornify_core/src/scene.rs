//! Scene description: balls and the things built from them.
//!
//! Balls live in a [`Skeleton`] arena and things refer to them by
//! [`BallId`]. Bones that meet at a joint share the joint's ball, so moving
//! the ball moves both bones, and bulk transforms over a figure's ball set
//! touch every ball exactly once.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use unicornify_math::{Axis, Vector, VectorExt};

use crate::{Color, TraceIntervals};

/// A sphere with a color. Bones interpolate between the colors of their
/// end balls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub center: Vector,
    pub radius: f64,
    pub color: Color,
}

impl Ball {
    pub fn new(center: Vector, radius: f64, color: Color) -> Self {
        Self {
            center,
            radius,
            color,
        }
    }

    pub fn shifted(&self, delta: Vector) -> Ball {
        Ball {
            center: self.center + delta,
            ..*self
        }
    }
}

/// Handle to a ball in a [`Skeleton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BallId(usize);

/// Arena owning every ball of a scene.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    balls: Vec<Ball>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a ball and return its handle.
    pub fn add(&mut self, ball: Ball) -> BallId {
        self.balls.push(ball);
        BallId(self.balls.len() - 1)
    }

    pub fn ball(&self, id: BallId) -> &Ball {
        &self.balls[id.0]
    }

    pub fn ball_mut(&mut self, id: BallId) -> &mut Ball {
        &mut self.balls[id.0]
    }

    pub fn len(&self) -> usize {
        self.balls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balls.is_empty()
    }

    /// Move `id` along the line from `other`'s center so the centers are
    /// `distance` apart.
    pub fn set_distance(&mut self, id: BallId, distance: f64, other: BallId) {
        let anchor = self.ball(other).center;
        let ball = self.ball_mut(id);
        let span = ball.center - anchor;
        ball.center = anchor + span * (distance / span.length());
    }

    /// Put the center of `id` onto the surface of `other`.
    pub fn move_to_sphere(&mut self, id: BallId, other: BallId) {
        let radius = self.ball(other).radius;
        self.set_distance(id, radius, other);
    }

    /// Leave a surface gap of `gap` between `id` and `other` (negative gaps
    /// overlap).
    pub fn set_gap(&mut self, id: BallId, gap: f64, other: BallId) {
        let distance = self.ball(id).radius + self.ball(other).radius + gap;
        self.set_distance(id, distance, other);
    }

    pub fn shift(&mut self, id: BallId, delta: Vector) {
        self.ball_mut(id).center += delta;
    }

    /// Rotate the center of `id` around an axis-aligned line through the
    /// center of `pivot`.
    pub fn rotate_around(&mut self, id: BallId, pivot: BallId, angle: f64, axis: Axis) {
        let pivot = self.ball(pivot).center;
        let ball = self.ball_mut(id);
        ball.center = ball.center.rotated_around(pivot, angle, axis);
    }

    /// Put the center of `id` onto the surface of the bone between `a` and
    /// `b`, next to the point of the bone axis closest to it.
    pub fn move_to_bone(&mut self, id: BallId, a: BallId, b: BallId) {
        let (b1, b2) = (*self.ball(a), *self.ball(b));
        let span = b2.center - b1.center;
        let offset = self.ball(id).center - b1.center;
        let f = span.dot(offset) / span.length_squared();
        if f <= 0.0 {
            self.move_to_sphere(id, a);
        } else if f >= 1.0 {
            self.move_to_sphere(id, b);
        } else {
            let anchor = b1.center + span * f;
            let radius = b1.radius + f * (b2.radius - b1.radius);
            let ball = self.ball_mut(id);
            let dir = ball.center - anchor;
            ball.center = anchor + dir * (radius / dir.length());
        }
    }

    /// Scale centers (about the origin) and radii of the given balls.
    pub fn scale(&mut self, ids: &BTreeSet<BallId>, factor: f64) {
        for &id in ids {
            let ball = self.ball_mut(id);
            ball.center *= factor;
            ball.radius *= factor;
        }
    }

    pub fn shift_all(&mut self, ids: &BTreeSet<BallId>, delta: Vector) {
        for &id in ids {
            self.shift(id, delta);
        }
    }

    /// Rotate the given balls around an axis-aligned line through `pivot`.
    pub fn rotate_all(&mut self, ids: &BTreeSet<BallId>, pivot: Vector, angle: f64, axis: Axis) {
        for &id in ids {
            let ball = self.ball_mut(id);
            ball.center = ball.center.rotated_around(pivot, angle, axis);
        }
    }
}

/// Bend of a non-linear bone along one of its cross axes:
/// `f(x) = weight * x^gamma + (1 - weight) * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoneCurve {
    pub gamma: f64,
    pub weight: f64,
}

impl BoneCurve {
    pub fn gamma(gamma: f64) -> Self {
        Self { gamma, weight: 1.0 }
    }

    pub fn weighted(gamma: f64, weight: f64) -> Self {
        Self { gamma, weight }
    }

    pub fn apply(&self, x: f64) -> f64 {
        self.weight * x.powf(self.gamma) + (1.0 - self.weight) * x
    }
}

/// Tapered capsule between two balls; curves make it non-linear.
#[derive(Debug, Clone, PartialEq)]
pub struct Bone {
    pub balls: [BallId; 2],
    pub x_curve: Option<BoneCurve>,
    pub y_curve: Option<BoneCurve>,
}

impl Bone {
    pub fn is_linear(&self) -> bool {
        self.x_curve.is_none() && self.y_curve.is_none()
    }
}

/// Planar triangle, or parallelogram when `four_corners` is set, spanned
/// by three ball centers.
#[derive(Debug, Clone, PartialEq)]
pub struct Flat {
    pub balls: [BallId; 3],
    pub four_corners: bool,
    /// Color of the implicit fourth corner.
    pub fourth_color: Color,
    /// Hint for which side counts as the outside.
    pub rough_direction: Vector,
}

/// Slab with the thickness of its first ball: the triangle (or
/// parallelogram) through three centers, extruded both ways.
#[derive(Debug, Clone, PartialEq)]
pub struct Steak {
    pub balls: [BallId; 3],
    pub four_corners: bool,
    pub fourth_color: Color,
    /// Round the edges off with bones instead of flat sides.
    pub rounded: bool,
}

/// Where a ray meets one of a sandwich's reference planes, in plane
/// coordinates along the two spanning edges plus depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub u: f64,
    pub v: f64,
    pub z: f64,
}

/// Contents of a sandwich: turns the hits on the bottom and top reference
/// planes into the depth intervals of whatever fills the slab.
pub trait SandwichFill: Send + Sync + fmt::Debug {
    fn fill(
        &self,
        x: f64,
        y: f64,
        bottom: Option<PlaneHit>,
        top: Option<PlaneHit>,
    ) -> Option<TraceIntervals>;
}

/// Slab between a parallelogram and its copy shifted by `extrusion`,
/// filled procedurally.
#[derive(Debug, Clone)]
pub struct Sandwich {
    pub balls: [BallId; 3],
    pub extrusion: Vector,
    pub fill: Arc<dyn SandwichFill>,
}

/// Ordered collection of things, traced as a group.
#[derive(Debug, Clone, Default)]
pub struct Figure {
    things: Vec<Thing>,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, thing: impl Into<Thing>) {
        self.things.push(thing.into());
    }

    pub fn things(&self) -> &[Thing] {
        &self.things
    }

    pub fn len(&self) -> usize {
        self.things.len()
    }

    pub fn is_empty(&self) -> bool {
        self.things.is_empty()
    }

    /// Every ball used anywhere in the figure, each once.
    pub fn ball_ids(&self) -> BTreeSet<BallId> {
        let mut ids = BTreeSet::new();
        for thing in &self.things {
            thing.collect_balls(&mut ids);
        }
        ids
    }
}

/// Anything that can be turned into a tracer.
#[derive(Debug, Clone)]
pub enum Thing {
    Ball(BallId),
    Bone(Bone),
    Flat(Flat),
    Steak(Steak),
    Sandwich(Sandwich),
    Figure(Figure),
    Difference {
        base: Box<Thing>,
        subtrahend: Box<Thing>,
    },
    Intersection {
        base: Box<Thing>,
        other: Box<Thing>,
    },
}

impl Thing {
    pub fn bone(a: BallId, b: BallId) -> Thing {
        Thing::Bone(Bone {
            balls: [a, b],
            x_curve: None,
            y_curve: None,
        })
    }

    pub fn curved_bone(
        a: BallId,
        b: BallId,
        x_curve: Option<BoneCurve>,
        y_curve: Option<BoneCurve>,
    ) -> Thing {
        Thing::Bone(Bone {
            balls: [a, b],
            x_curve,
            y_curve,
        })
    }

    pub fn difference(base: impl Into<Thing>, subtrahend: impl Into<Thing>) -> Thing {
        Thing::Difference {
            base: Box::new(base.into()),
            subtrahend: Box::new(subtrahend.into()),
        }
    }

    pub fn intersection(base: impl Into<Thing>, other: impl Into<Thing>) -> Thing {
        Thing::Intersection {
            base: Box::new(base.into()),
            other: Box::new(other.into()),
        }
    }

    /// Insert every ball this thing uses into `ids`.
    pub fn collect_balls(&self, ids: &mut BTreeSet<BallId>) {
        match self {
            Thing::Ball(id) => {
                ids.insert(*id);
            }
            Thing::Bone(bone) => ids.extend(bone.balls),
            Thing::Flat(flat) => ids.extend(flat.balls),
            Thing::Steak(steak) => ids.extend(steak.balls),
            Thing::Sandwich(sandwich) => ids.extend(sandwich.balls),
            Thing::Figure(figure) => {
                for thing in figure.things() {
                    thing.collect_balls(ids);
                }
            }
            Thing::Difference { base, subtrahend } => {
                base.collect_balls(ids);
                subtrahend.collect_balls(ids);
            }
            Thing::Intersection { base, other } => {
                base.collect_balls(ids);
                other.collect_balls(ids);
            }
        }
    }
}

impl From<BallId> for Thing {
    fn from(id: BallId) -> Self {
        Thing::Ball(id)
    }
}

impl From<Figure> for Thing {
    fn from(figure: Figure) -> Self {
        Thing::Figure(figure)
    }
}

impl From<Bone> for Thing {
    fn from(bone: Bone) -> Self {
        Thing::Bone(bone)
    }
}

impl From<Steak> for Thing {
    fn from(steak: Steak) -> Self {
        Thing::Steak(steak)
    }
}

impl From<Flat> for Thing {
    fn from(flat: Flat) -> Self {
        Thing::Flat(flat)
    }
}

impl From<Sandwich> for Thing {
    fn from(sandwich: Sandwich) -> Self {
        Thing::Sandwich(sandwich)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicornify_math::DEGREE;

    fn close(a: Vector, b: Vector) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn test_set_distance_and_gap() {
        let mut sk = Skeleton::new();
        let a = sk.add(Ball::new(Vector::ZERO, 10.0, Color::BLACK));
        let b = sk.add(Ball::new(Vector::new(3.0, 4.0, 0.0), 2.0, Color::BLACK));
        sk.set_distance(b, 10.0, a);
        assert!(close(sk.ball(b).center, Vector::new(6.0, 8.0, 0.0)));
        sk.move_to_sphere(b, a);
        assert!(close(sk.ball(b).center, Vector::new(6.0, 8.0, 0.0)));
        sk.set_gap(b, 3.0, a);
        assert!((sk.ball(b).center.length() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_rotate_around() {
        let mut sk = Skeleton::new();
        let pivot = sk.add(Ball::new(Vector::new(1.0, 1.0, 0.0), 1.0, Color::BLACK));
        let b = sk.add(Ball::new(Vector::new(2.0, 1.0, 0.0), 1.0, Color::BLACK));
        sk.rotate_around(b, pivot, 90.0 * DEGREE, Axis::Z);
        assert!(close(sk.ball(b).center, Vector::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_move_to_bone() {
        let mut sk = Skeleton::new();
        let a = sk.add(Ball::new(Vector::ZERO, 10.0, Color::BLACK));
        let b = sk.add(Ball::new(Vector::new(100.0, 0.0, 0.0), 20.0, Color::BLACK));
        let c = sk.add(Ball::new(Vector::new(50.0, 50.0, 0.0), 1.0, Color::BLACK));
        sk.move_to_bone(c, a, b);
        // closest axis point is halfway, where the bone radius is 15
        assert!(close(sk.ball(c).center, Vector::new(50.0, 15.0, 0.0)));

        sk.ball_mut(c).center = Vector::new(-30.0, 5.0, 0.0);
        sk.move_to_bone(c, a, b);
        assert!((sk.ball(c).center.length() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_ball_moves_both_bones() {
        let mut sk = Skeleton::new();
        let hip = sk.add(Ball::new(Vector::ZERO, 5.0, Color::BLACK));
        let knee = sk.add(Ball::new(Vector::new(0.0, 50.0, 0.0), 3.0, Color::BLACK));
        let hoof = sk.add(Ball::new(Vector::new(0.0, 100.0, 0.0), 4.0, Color::BLACK));
        let mut leg = Figure::new();
        leg.add(Thing::bone(hip, knee));
        leg.add(Thing::bone(knee, hoof));

        let ids = leg.ball_ids();
        assert_eq!(ids.len(), 3);
        sk.shift_all(&ids, Vector::new(10.0, 0.0, 0.0));
        assert!(close(sk.ball(knee).center, Vector::new(10.0, 50.0, 0.0)));
    }

    #[test]
    fn test_scale() {
        let mut sk = Skeleton::new();
        let a = sk.add(Ball::new(Vector::new(2.0, 4.0, 6.0), 3.0, Color::BLACK));
        let ids: BTreeSet<_> = [a].into_iter().collect();
        sk.scale(&ids, 0.5);
        assert!(close(sk.ball(a).center, Vector::new(1.0, 2.0, 3.0)));
        assert_eq!(sk.ball(a).radius, 1.5);
    }

    #[test]
    fn test_ball_ids_through_csg() {
        let mut sk = Skeleton::new();
        let ids: Vec<BallId> = (0..4)
            .map(|i| sk.add(Ball::new(Vector::splat(i as f64), 1.0, Color::BLACK)))
            .collect();
        let ear = Thing::intersection(
            Thing::difference(Thing::bone(ids[0], ids[1]), Thing::bone(ids[1], ids[2])),
            Thing::bone(ids[2], ids[3]),
        );
        let mut figure = Figure::new();
        figure.add(ear);
        figure.add(ids[0]);
        assert_eq!(figure.ball_ids().into_iter().collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_bone_curve() {
        let c = BoneCurve::weighted(2.0, 0.5);
        assert_eq!(c.apply(0.0), 0.0);
        assert_eq!(c.apply(1.0), 1.0);
        assert!((c.apply(0.5) - 0.375).abs() < 1e-12);
        assert_eq!(BoneCurve::gamma(3.0).apply(0.5), 0.125);
    }
}
