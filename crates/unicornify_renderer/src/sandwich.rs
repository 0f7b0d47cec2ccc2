//! Sandwich primitive: a slab between two parallel parallelograms whose
//! contents come from a [`SandwichFill`].

use std::sync::Arc;

use unicornify_core::{
    Ball, Color, RenderingParameters, SandwichFill, TraceIntervals, TraceResult,
};
use unicornify_math::{Bounds, Vector, WorldView};

use crate::flat::FlatTracer;
use crate::tracer::{simply_pruned, undeepify_trace, Tracer};

pub struct SandwichTracer {
    bottom: FlatTracer,
    top: FlatTracer,
    bounds: Bounds,
    fill: Arc<dyn SandwichFill>,
}

impl SandwichTracer {
    /// The bottom parallelogram is spanned by the three balls, the top one
    /// is the same shifted by `extrusion`.
    pub fn new(
        view: &WorldView,
        balls: [&Ball; 3],
        extrusion: Vector,
        fill: Arc<dyn SandwichFill>,
    ) -> Self {
        let [b1, b2, b3] = balls;
        let bottom = FlatTracer::new(view, b1, b2, b3, true, Color::BLACK, extrusion);
        let top = FlatTracer::new(
            view,
            &b1.shifted(extrusion),
            &b2.shifted(extrusion),
            &b3.shifted(extrusion),
            true,
            Color::BLACK,
            extrusion,
        );
        Self {
            bounds: bottom.bounds().union(&top.bounds()),
            bottom,
            top,
            fill,
        }
    }
}

impl Tracer for SandwichTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        undeepify_trace(self, x, y, ray)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        let bottom = self.bottom.trace_to_intersection(ray);
        let top = self.top.trace_to_intersection(ray);
        if bottom.is_none() && top.is_none() {
            return None;
        }
        self.fill
            .fill(x, y, bottom, top)
            .filter(|intervals| !intervals.is_empty())
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
    use unicornify_core::{PlaneHit, TraceInterval};

    /// Solid between the two planes wherever both are hit inside the
    /// parallelogram.
    #[derive(Debug)]
    struct SolidFill;

    impl SandwichFill for SolidFill {
        fn fill(
            &self,
            _x: f64,
            _y: f64,
            bottom: Option<PlaneHit>,
            top: Option<PlaneHit>,
        ) -> Option<TraceIntervals> {
            let (b, t) = (bottom?, top?);
            if !(0.0..=1.0).contains(&b.u) || !(0.0..=1.0).contains(&b.v) {
                return None;
            }
            let (near, far) = if b.z < t.z { (b, t) } else { (t, b) };
            Some(TraceIntervals::single(TraceInterval::new(
                TraceResult::new(near.z, Vector::NEG_Z, Color::WHITE),
                TraceResult::new(far.z, Vector::Z, Color::WHITE),
            )))
        }
    }

    #[test]
    fn test_sandwich_calls_fill_with_both_planes() {
        let view = WorldView::new(Vector::new(0.0, 0.0, -500.0), Vector::ZERO, 100.0);
        let corner = |x: f64, y: f64| Ball::new(Vector::new(x, y, 0.0), 0.0, Color::BLACK);
        let sandwich = SandwichTracer::new(
            &view,
            [&corner(-100.0, -100.0), &corner(100.0, -100.0), &corner(-100.0, 100.0)],
            Vector::new(0.0, 0.0, -50.0),
            Arc::new(SolidFill),
        );
        let deep = sandwich.trace_deep(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((deep.as_slice()[0].start.z - 450.0).abs() < 1e-9);
        assert!((deep.as_slice()[0].end.z - 500.0).abs() < 1e-9);
        assert!(sandwich.trace(30.0, 0.0, view.ray(30.0, 0.0)).is_none());
        // top plane sits closer, so the bounds grow
        assert!(sandwich.bounds().contains_xy(22.0, 0.0));
    }
}
