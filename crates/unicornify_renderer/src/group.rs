//! Group of tracers, traced as their union.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector};

use crate::facet::{FacetTracer, FACET_COUNT_ROOT};
use crate::tracer::Tracer;

/// An ordered list of tracers.
///
/// Once sorted by nearest depth, a surface trace can stop at the first
/// member that starts behind the best hit so far.
pub struct GroupTracer {
    tracers: Vec<Arc<dyn Tracer>>,
    bounds: Bounds,
    sorted: bool,
}

impl GroupTracer {
    pub fn new() -> Self {
        Self {
            tracers: Vec::new(),
            bounds: Bounds::EMPTY,
            sorted: false,
        }
    }

    pub fn add(&mut self, tracer: Arc<dyn Tracer>) {
        self.bounds = self.bounds.union(&tracer.bounds());
        self.tracers.push(tracer);
        self.sorted = false;
    }

    pub fn len(&self) -> usize {
        self.tracers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracers.is_empty()
    }

    /// Stable sort by ascending `bounds().z.min`.
    pub fn sort(&mut self) {
        self.tracers
            .sort_by(|a, b| a.bounds().z.min.total_cmp(&b.bounds().z.min));
        self.sorted = true;
    }

    fn flatten_into(&self, rp: &RenderingParameters, facets: &mut FacetTracer) {
        if !rp.contains(&self.bounds) {
            return;
        }
        for tracer in &self.tracers {
            tracer.clone().prune_into(rp, facets);
        }
    }
}

impl Default for GroupTracer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracer for GroupTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        let mut best: Option<TraceResult> = None;
        for tracer in &self.tracers {
            let bounds = tracer.bounds();
            if !bounds.contains_xy(x, y) || bounds.z.max <= 0.0 {
                continue;
            }
            if let Some(current) = best {
                if !bounds.contains_points_in_front_of(current.z) {
                    if self.sorted {
                        break;
                    }
                    continue;
                }
            }
            if let Some(hit) = tracer.trace(x, y, ray) {
                if hit.z > 0.0 && best.map_or(true, |b| hit.z < b.z) {
                    best = Some(hit);
                }
            }
        }
        best
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        let mut result: Option<TraceIntervals> = None;
        for tracer in &self.tracers {
            let bounds = tracer.bounds();
            if !bounds.contains_xy(x, y) || bounds.z.max <= 0.0 {
                continue;
            }
            let Some(intervals) = tracer.trace_deep(x, y, ray) else {
                continue;
            };
            if intervals.first().map_or(true, |i| i.start.z <= 0.0) {
                continue;
            }
            result = Some(match result {
                Some(acc) => acc.union(&intervals),
                None => intervals,
            });
        }
        result
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Flatten every pruned member into a facet grid over `rp` (or over the
    /// group's own extent when `rp` is unbounded).
    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        if !rp.contains(&self.bounds) {
            return None;
        }
        let grid_bounds = if rp.is_unbounded() {
            self.bounds
        } else {
            rp.to_bounds(self.bounds.z)
        };
        let mut facets = FacetTracer::new(grid_bounds, FACET_COUNT_ROOT);
        self.flatten_into(rp, &mut facets);
        if facets.is_empty() {
            return None;
        }
        facets.sort();
        Some(Arc::new(facets))
    }

    fn prune_into(self: Arc<Self>, rp: &RenderingParameters, facets: &mut FacetTracer) {
        self.flatten_into(rp, facets);
    }
}
