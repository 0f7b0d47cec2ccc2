//! Screen-space scaling and translation of a whole tracer tree.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceInterval, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector, WorldView};

use crate::tracer::Tracer;

/// Magnifies its source on screen by `scale`: position `(x, y)` shows what
/// the source has at `(x / scale, y / scale)`.
pub struct ScalingTracer {
    source: Arc<dyn Tracer>,
    scale: f64,
    view: WorldView,
    bounds: Bounds,
}

impl ScalingTracer {
    pub fn new(view: &WorldView, source: Arc<dyn Tracer>, scale: f64) -> Self {
        let bounds = source.bounds().scaled_xy(scale);
        Self {
            source,
            scale,
            view: *view,
            bounds,
        }
    }

    fn scale_hit(&self, hit: TraceResult) -> TraceResult {
        TraceResult {
            z: hit.z * self.scale,
            ..hit
        }
    }
}

impl Tracer for ScalingTracer {
    fn trace(&self, x: f64, y: f64, _ray: Vector) -> Option<TraceResult> {
        let (sx, sy) = (x / self.scale, y / self.scale);
        let hit = self.source.trace(sx, sy, self.view.ray(sx, sy))?;
        Some(self.scale_hit(hit))
    }

    fn trace_deep(&self, x: f64, y: f64, _ray: Vector) -> Option<TraceIntervals> {
        let (sx, sy) = (x / self.scale, y / self.scale);
        let intervals = self.source.trace_deep(sx, sy, self.view.ray(sx, sy))?;
        let scaled = intervals
            .iter()
            .map(|i| TraceInterval::new(self.scale_hit(i.start), self.scale_hit(i.end)))
            .collect();
        Some(TraceIntervals::from_sorted(scaled))
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        let source = self.source.clone().pruned(&rp.scaled(self.scale))?;
        Some(Arc::new(ScalingTracer::new(&self.view, source, self.scale)))
    }
}

/// Shifts its source on screen by `(dx, dy)`.
pub struct TranslatingTracer {
    source: Arc<dyn Tracer>,
    dx: f64,
    dy: f64,
    view: WorldView,
    bounds: Bounds,
}

impl TranslatingTracer {
    pub fn new(view: &WorldView, source: Arc<dyn Tracer>, dx: f64, dy: f64) -> Self {
        let bounds = source.bounds().translated(dx, dy);
        Self {
            source,
            dx,
            dy,
            view: *view,
            bounds,
        }
    }
}

impl Tracer for TranslatingTracer {
    fn trace(&self, x: f64, y: f64, _ray: Vector) -> Option<TraceResult> {
        let (sx, sy) = (x - self.dx, y - self.dy);
        self.source.trace(sx, sy, self.view.ray(sx, sy))
    }

    fn trace_deep(&self, x: f64, y: f64, _ray: Vector) -> Option<TraceIntervals> {
        let (sx, sy) = (x - self.dx, y - self.dy);
        self.source.trace_deep(sx, sy, self.view.ray(sx, sy))
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        let source = self.source.clone().pruned(&rp.translated(self.dx, self.dy))?;
        Some(Arc::new(TranslatingTracer::new(
            &self.view, source, self.dx, self.dy,
        )))
    }
}
