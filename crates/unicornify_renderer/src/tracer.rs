//! Tracer trait: what every renderable node answers per screen position.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceInterval, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector};

use crate::FacetTracer;

/// Something that can be hit by the ray through a screen position.
///
/// `ray` is the unit camera-space direction for `(x, y)`; tracers that
/// remap screen coordinates regenerate it for their source.
pub trait Tracer: Send + Sync {
    /// Nearest surface along the ray.
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult>;

    /// Every depth range along the ray that lies inside this solid.
    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals>;

    /// Screen-space extent and depth range; no hit lies outside.
    fn bounds(&self) -> Bounds;

    /// A tracer equivalent to this one inside `rp`, or `None` if nothing
    /// in `rp` can be hit.
    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>>;

    /// Add this tracer, pruned to `rp`, to a facet grid. Groups add their
    /// members one by one instead of themselves.
    fn prune_into(self: Arc<Self>, rp: &RenderingParameters, facets: &mut FacetTracer) {
        if let Some(pruned) = self.pruned(rp) {
            facets.add(pruned);
        }
    }
}

/// Keep the tracer as is if `rp` overlaps its bounds.
pub fn simply_pruned<T: Tracer + 'static>(
    tracer: Arc<T>,
    rp: &RenderingParameters,
) -> Option<Arc<dyn Tracer>> {
    if rp.contains(&tracer.bounds()) {
        Some(tracer)
    } else {
        None
    }
}

/// Deep trace for surface-only tracers: solid from the hit to infinity.
pub fn deepify_trace<T: Tracer + ?Sized>(
    tracer: &T,
    x: f64,
    y: f64,
    ray: Vector,
) -> Option<TraceIntervals> {
    let hit = tracer.trace(x, y, ray)?;
    let end = TraceResult {
        z: f64::INFINITY,
        ..hit
    };
    Some(TraceIntervals::single(TraceInterval::new(hit, end)))
}

/// Surface trace for volume tracers: entry of the first interval.
pub fn undeepify_trace<T: Tracer + ?Sized>(
    tracer: &T,
    x: f64,
    y: f64,
    ray: Vector,
) -> Option<TraceResult> {
    let intervals = tracer.trace_deep(x, y, ray)?;
    intervals.first().map(|interval| interval.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicornify_core::Color;
    use unicornify_math::Interval;

    /// Flat wall at a fixed depth covering a screen square.
    struct Wall {
        z: f64,
    }

    impl Tracer for Wall {
        fn trace(&self, x: f64, y: f64, _ray: Vector) -> Option<TraceResult> {
            self.bounds()
                .contains_xy(x, y)
                .then(|| TraceResult::new(self.z, Vector::NEG_Z, Color::WHITE))
        }

        fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
            deepify_trace(self, x, y, ray)
        }

        fn bounds(&self) -> Bounds {
            Bounds::new(
                Interval::new(0.0, 10.0),
                Interval::new(0.0, 10.0),
                Interval::new(self.z, self.z),
            )
        }

        fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
            simply_pruned(self, rp)
        }
    }

    #[test]
    fn test_deepify_and_undeepify() {
        let wall = Wall { z: 7.0 };
        let deep = wall.trace_deep(5.0, 5.0, Vector::Z).unwrap();
        assert_eq!(deep.len(), 1);
        assert_eq!(deep.as_slice()[0].start.z, 7.0);
        assert_eq!(deep.as_slice()[0].end.z, f64::INFINITY);
        assert_eq!(undeepify_trace(&wall, 5.0, 5.0, Vector::Z).unwrap().z, 7.0);
        assert!(wall.trace_deep(50.0, 5.0, Vector::Z).is_none());
    }

    #[test]
    fn test_simply_pruned() {
        let wall = Arc::new(Wall { z: 7.0 });
        assert!(wall
            .clone()
            .pruned(&RenderingParameters::new(5.0, 20.0, 5.0, 20.0))
            .is_some());
        assert!(wall
            .clone()
            .pruned(&RenderingParameters::new(11.0, 20.0, 0.0, 20.0))
            .is_none());

        let behind = Arc::new(Wall { z: -1.0 });
        assert!(behind.pruned(&RenderingParameters::unbounded()).is_none());
    }
}
