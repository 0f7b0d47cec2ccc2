//! Steak primitive: a flat extruded to the thickness of its first ball.

use std::sync::Arc;

use unicornify_core::{Ball, Color, RenderingParameters, TraceInterval, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector, WorldView};

use crate::ball::BallProjection;
use crate::bone::BoneTracer;
use crate::flat::FlatTracer;
use crate::tracer::{simply_pruned, undeepify_trace, Tracer};
use crate::GroupTracer;

/// Convex slab made of flats; the inside along a ray runs from the nearest
/// to the farthest face hit.
pub struct SteakTracer {
    flats: Vec<FlatTracer>,
    bounds: Bounds,
}

impl SteakTracer {
    fn add(&mut self, flat: FlatTracer) {
        self.bounds = self.bounds.union(&flat.bounds());
        self.flats.push(flat);
    }
}

/// Tracer for a steak over three balls. The slab is as thick as the first
/// ball's radius on each side. Rounded steaks get bones along their edges.
pub fn steak_tracer(
    view: &WorldView,
    balls: [&Ball; 3],
    four_corners: bool,
    fourth_color: Color,
    rounded: bool,
) -> Arc<dyn Tracer> {
    let [b1, b2, b3] = balls;
    let (col1, col2, col3) = (b1.color, b2.color, b3.color);
    let w12 = b2.center - b1.center;
    let w13 = b3.center - b1.center;
    let w14 = w12 + w13;

    let cross = w12.cross(w13).normalize_or_zero() * b1.radius;
    let top = b1.center + cross;
    let bottom = b1.center - cross;
    let at = |p: Vector, color: Color| Ball::new(p, 0.0, color);

    let mut steak = SteakTracer {
        flats: Vec::with_capacity(6),
        bounds: Bounds::EMPTY,
    };
    let mut face = |c1: Ball, c2: Ball, c3: Ball, quad: bool, fourth: Color, rough: Vector| {
        steak.add(FlatTracer::new(view, &c1, &c2, &c3, quad, fourth, rough));
    };

    face(
        at(top, col1),
        at(top + w12, col2),
        at(top + w13, col3),
        four_corners,
        fourth_color,
        cross,
    );
    face(
        at(bottom, col1),
        at(bottom + w12, col2),
        at(bottom + w13, col3),
        four_corners,
        fourth_color,
        -cross,
    );
    face(at(top, col1), at(bottom, col1), at(top + w12, col2), true, col2, -w13);
    face(at(top, col1), at(bottom, col1), at(top + w13, col3), true, col3, -w12);
    if four_corners {
        face(at(top + w12, col2), at(bottom + w12, col2), at(top + w14, fourth_color), true, fourth_color, w12);
        face(at(top + w13, col3), at(bottom + w13, col3), at(top + w14, fourth_color), true, fourth_color, w13);
    } else {
        face(at(top + w12, col2), at(bottom + w12, col2), at(top + w13, col3), true, col3, w12);
    }

    if !rounded {
        return Arc::new(steak);
    }

    let project = |b: &Ball| BallProjection::new(view, b);
    let (p1, p2, p3) = (project(b1), project(b2), project(b3));
    let mut group = GroupTracer::new();
    group.add(Arc::new(BoneTracer::new(p1, p2)));
    group.add(Arc::new(BoneTracer::new(p1, p3)));
    if four_corners {
        let p4 = project(&Ball::new(b1.center + w14, b1.radius, fourth_color));
        group.add(Arc::new(BoneTracer::new(p2, p4)));
        group.add(Arc::new(BoneTracer::new(p3, p4)));
    } else {
        group.add(Arc::new(BoneTracer::new(p2, p3)));
    }
    group.add(Arc::new(steak));
    Arc::new(group)
}

impl Tracer for SteakTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        undeepify_trace(self, x, y, ray)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        let mut near: Option<TraceResult> = None;
        let mut far: Option<TraceResult> = None;
        for flat in &self.flats {
            if !flat.bounds().contains_xy(x, y) {
                continue;
            }
            let Some(hit) = flat.trace(x, y, ray) else {
                continue;
            };
            if near.map_or(true, |n| hit.z < n.z) {
                near = Some(hit);
            }
            if far.map_or(true, |f| hit.z > f.z) {
                far = Some(hit);
            }
        }

        let interval = TraceInterval::new(near?, far?);
        // a single face hit means the ray only grazes an edge
        if interval.is_empty() {
            return None;
        }
        Some(TraceIntervals::single(interval))
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        simply_pruned(self, rp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_view() -> WorldView {
        WorldView::new(Vector::new(0.0, 0.0, -500.0), Vector::ZERO, 100.0)
    }

    fn slab(rounded: bool) -> Arc<dyn Tracer> {
        let b1 = Ball::new(Vector::new(-100.0, -100.0, 0.0), 10.0, Color::BLACK);
        let b2 = Ball::new(Vector::new(100.0, -100.0, 0.0), 10.0, Color::BLACK);
        let b3 = Ball::new(Vector::new(-100.0, 100.0, 0.0), 10.0, Color::BLACK);
        steak_tracer(&front_view(), [&b1, &b2, &b3], true, Color::BLACK, rounded)
    }

    #[test]
    fn test_steak_thickness() {
        let view = front_view();
        let steak = slab(false);
        let deep = steak.trace_deep(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert_eq!(deep.len(), 1);
        assert!((deep.as_slice()[0].start.z - 490.0).abs() < 1e-9);
        assert!((deep.as_slice()[0].end.z - 510.0).abs() < 1e-9);
        // the front face points towards the camera
        assert!(deep.as_slice()[0].start.direction.z < 0.0);
        assert!(steak.trace(30.0, 0.0, view.ray(30.0, 0.0)).is_none());
    }

    #[test]
    fn test_rounded_steak_covers_edges() {
        let view = front_view();
        let sharp = slab(false);
        let rounded = slab(true);
        // just beyond the right edge of the slab, inside the edge bone
        let (x, y) = (20.5, 0.0);
        assert!(sharp.trace(x, y, view.ray(x, y)).is_none());
        assert!(rounded.trace(x, y, view.ray(x, y)).is_some());
        let center = rounded.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((center.z - 490.0).abs() < 1e-9);
    }
}
