//! Constructive solid geometry on top of deep traces.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector};

use crate::tracer::{undeepify_trace, Tracer};

/// `base` with everything inside `subtrahend` carved out.
pub struct DifferenceTracer {
    base: Arc<dyn Tracer>,
    subtrahend: Arc<dyn Tracer>,
}

impl DifferenceTracer {
    pub fn new(base: Arc<dyn Tracer>, subtrahend: Arc<dyn Tracer>) -> Self {
        Self { base, subtrahend }
    }
}

impl Tracer for DifferenceTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        undeepify_trace(self, x, y, ray)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        let base = self.base.trace_deep(x, y, ray)?;
        let Some(subtrahend) = self.subtrahend.trace_deep(x, y, ray) else {
            return Some(base);
        };
        let rest = base.difference(&subtrahend);
        (!rest.is_empty()).then_some(rest)
    }

    fn bounds(&self) -> Bounds {
        self.base.bounds()
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        let base = self.base.clone().pruned(rp)?;
        match self.subtrahend.clone().pruned(rp) {
            Some(subtrahend) => Some(Arc::new(DifferenceTracer::new(base, subtrahend))),
            // nothing left to carve out inside rp
            None => Some(base),
        }
    }
}

/// Only what lies inside both `base` and `other`.
pub struct IntersectionTracer {
    base: Arc<dyn Tracer>,
    other: Arc<dyn Tracer>,
    bounds: Bounds,
}

impl IntersectionTracer {
    pub fn new(base: Arc<dyn Tracer>, other: Arc<dyn Tracer>) -> Self {
        let bounds = base.bounds().intersect(&other.bounds());
        Self {
            base,
            other,
            bounds,
        }
    }
}

impl Tracer for IntersectionTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        undeepify_trace(self, x, y, ray)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        let base = self.base.trace_deep(x, y, ray)?;
        let other = self.other.trace_deep(x, y, ray)?;
        let common = base.intersect(&other);
        (!common.is_empty()).then_some(common)
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        if !rp.contains(&self.bounds) {
            return None;
        }
        let base = self.base.clone().pruned(rp)?;
        let other = self.other.clone().pruned(rp)?;
        Some(Arc::new(IntersectionTracer::new(base, other)))
    }
}
