//! Turning scene things into tracer trees for one view.

use std::sync::Arc;

use unicornify_core::{Skeleton, Thing};
use unicornify_math::{Vector, WorldView};

use crate::ball::{BallProjection, BallTracer};
use crate::bone::{curved_bone_tracer, BoneTracer};
use crate::csg::{DifferenceTracer, IntersectionTracer};
use crate::flat::FlatTracer;
use crate::lighting::ShadowCastingTracer;
use crate::sandwich::SandwichTracer;
use crate::steak::steak_tracer;
use crate::tracer::Tracer;
use crate::GroupTracer;

/// Knobs for building tracers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TracerSettings {
    /// Straight pieces a curved bone is split into before merging
    /// near-collinear neighbours.
    pub bone_segments: usize,
}

impl Default for TracerSettings {
    fn default() -> Self {
        Self { bone_segments: 255 }
    }
}

/// Build the tracer for `thing` as seen from `view`.
pub fn tracer_for(
    thing: &Thing,
    skeleton: &Skeleton,
    view: &WorldView,
    settings: &TracerSettings,
) -> Arc<dyn Tracer> {
    match thing {
        Thing::Ball(id) => Arc::new(BallTracer::new(view, skeleton.ball(*id))),
        Thing::Bone(bone) => {
            let [b1, b2] = bone.balls.map(|id| skeleton.ball(id));
            if bone.is_linear() {
                Arc::new(BoneTracer::new(
                    BallProjection::new(view, b1),
                    BallProjection::new(view, b2),
                ))
            } else {
                Arc::new(curved_bone_tracer(
                    view,
                    b1,
                    b2,
                    bone.x_curve,
                    bone.y_curve,
                    settings.bone_segments,
                ))
            }
        }
        Thing::Flat(flat) => {
            let [b1, b2, b3] = flat.balls.map(|id| skeleton.ball(id));
            Arc::new(FlatTracer::new(
                view,
                b1,
                b2,
                b3,
                flat.four_corners,
                flat.fourth_color,
                flat.rough_direction,
            ))
        }
        Thing::Steak(steak) => steak_tracer(
            view,
            steak.balls.map(|id| skeleton.ball(id)),
            steak.four_corners,
            steak.fourth_color,
            steak.rounded,
        ),
        Thing::Sandwich(sandwich) => Arc::new(SandwichTracer::new(
            view,
            sandwich.balls.map(|id| skeleton.ball(id)),
            sandwich.extrusion,
            sandwich.fill.clone(),
        )),
        Thing::Figure(figure) => {
            let mut group = GroupTracer::new();
            for thing in figure.things() {
                group.add(tracer_for(thing, skeleton, view, settings));
            }
            Arc::new(group)
        }
        Thing::Difference { base, subtrahend } => Arc::new(DifferenceTracer::new(
            tracer_for(base, skeleton, view, settings),
            tracer_for(subtrahend, skeleton, view, settings),
        )),
        Thing::Intersection { base, other } => Arc::new(IntersectionTracer::new(
            tracer_for(base, skeleton, view, settings),
            tracer_for(other, skeleton, view, settings),
        )),
    }
}

/// Wrap `source` so that `caster`, lit from `light_position` towards
/// `light_target`, throws shadows onto it.
#[allow(clippy::too_many_arguments)]
pub fn shadow_casting_tracer(
    source: Arc<dyn Tracer>,
    view: &WorldView,
    caster: &Thing,
    skeleton: &Skeleton,
    settings: &TracerSettings,
    light_position: Vector,
    light_target: Vector,
    lighten: f64,
    darken: f64,
) -> ShadowCastingTracer {
    // the light's focal length is irrelevant, only directions matter
    let light_view = WorldView::new(light_position, light_target, 1.0);
    let light_tracer = tracer_for(caster, skeleton, &light_view, settings);
    ShadowCastingTracer::new(source, view, &light_view, light_tracer, lighten, darken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicornify_core::{Ball, BoneCurve, Color, Figure, Steak};

    fn front_view() -> WorldView {
        WorldView::new(Vector::new(0.0, 0.0, -500.0), Vector::ZERO, 100.0)
    }

    #[test]
    fn test_figure_with_shared_balls() {
        let view = front_view();
        let mut skeleton = Skeleton::new();
        let a = skeleton.add(Ball::new(Vector::new(-100.0, 0.0, 0.0), 20.0, Color::BLACK));
        let b = skeleton.add(Ball::new(Vector::ZERO, 20.0, Color::WHITE));
        let c = skeleton.add(Ball::new(Vector::new(0.0, 100.0, 0.0), 20.0, Color::BLACK));

        let mut figure = Figure::new();
        figure.add(Thing::bone(a, b));
        figure.add(Thing::bone(b, c));
        let tracer = tracer_for(&figure.into(), &skeleton, &view, &TracerSettings::default());

        let joint = tracer.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((joint.z - 480.0).abs() < 1e-6);
        assert_eq!(joint.color, Color::WHITE);
        assert!(tracer.trace(-10.0, 0.0, view.ray(-10.0, 0.0)).is_some());
        assert!(tracer.trace(0.0, 10.0, view.ray(0.0, 10.0)).is_some());
        assert!(tracer.trace(-10.0, 10.0, view.ray(-10.0, 10.0)).is_none());
    }

    #[test]
    fn test_csg_things() {
        let view = front_view();
        let mut skeleton = Skeleton::new();
        let big = skeleton.add(Ball::new(Vector::ZERO, 50.0, Color::WHITE));
        let bite = skeleton.add(Ball::new(Vector::new(0.0, 0.0, -50.0), 30.0, Color::BLACK));
        let settings = TracerSettings::default();

        let diff = tracer_for(&Thing::difference(big, bite), &skeleton, &view, &settings);
        let hit = diff.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((hit.z - 480.0).abs() < 1e-9);

        let inter = tracer_for(&Thing::intersection(big, bite), &skeleton, &view, &settings);
        let hit = inter.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((hit.z - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_other_things_build() {
        let view = front_view();
        let mut skeleton = Skeleton::new();
        let a = skeleton.add(Ball::new(Vector::new(-100.0, -100.0, 0.0), 10.0, Color::WHITE));
        let b = skeleton.add(Ball::new(Vector::new(100.0, -100.0, 0.0), 10.0, Color::WHITE));
        let c = skeleton.add(Ball::new(Vector::new(-100.0, 100.0, 0.0), 10.0, Color::WHITE));
        let settings = TracerSettings::default();

        let steak = Thing::Steak(Steak {
            balls: [a, b, c],
            four_corners: true,
            fourth_color: Color::WHITE,
            rounded: false,
        });
        let hit = tracer_for(&steak, &skeleton, &view, &settings)
            .trace(0.0, 0.0, view.ray(0.0, 0.0))
            .unwrap();
        assert!((hit.z - 490.0).abs() < 1e-9);

        let curved = Thing::curved_bone(a, b, None, Some(BoneCurve::gamma(2.0)));
        let tracer = tracer_for(&curved, &skeleton, &view, &settings);
        assert!(!tracer.bounds().is_empty());
    }

    #[test]
    fn test_shadow_from_thing() {
        let view = front_view();
        let mut skeleton = Skeleton::new();
        let ground = skeleton.add(Ball::new(Vector::ZERO, 100.0, Color::new(128, 128, 128)));
        let blocker = skeleton.add(Ball::new(Vector::new(0.0, -300.0, 0.0), 30.0, Color::WHITE));
        let mut figure = Figure::new();
        figure.add(ground);
        figure.add(blocker);
        let thing: Thing = figure.into();
        let settings = TracerSettings::default();

        let source = tracer_for(&thing, &skeleton, &view, &settings);
        let shadow = shadow_casting_tracer(
            source,
            &view,
            &thing,
            &skeleton,
            &settings,
            Vector::new(0.0, -1000.0, 0.0),
            Vector::ZERO,
            60.0,
            60.0,
        );
        let point = view.project_sphere(Vector::new(0.0, -1.0, -0.3).normalize() * 100.0, 0.0);
        let hit = shadow
            .trace(point.x(), point.y(), view.ray(point.x(), point.y()))
            .unwrap();
        assert_eq!(hit.color, Color::new(68, 68, 68));
    }
}
