//! Screen-space grid of groups, the result of pruning a group.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector};

use crate::tracer::{simply_pruned, Tracer};
use crate::GroupTracer;

/// Cells per side of the grid built when a group is pruned.
pub const FACET_COUNT_ROOT: usize = 16;

/// Splits its bounds into `count_root × count_root` cells; every cell holds
/// the tracers whose bounds touch it. Tracing a position only visits the
/// tracers of its cell.
pub struct FacetTracer {
    count_root: usize,
    cells: Vec<Option<GroupTracer>>,
    bounds: Bounds,
    empty: bool,
}

impl FacetTracer {
    pub fn new(bounds: Bounds, count_root: usize) -> Self {
        let count_root = count_root.max(1);
        Self {
            count_root,
            cells: (0..count_root * count_root).map(|_| None).collect(),
            bounds,
            empty: true,
        }
    }

    /// True until the first tracer is added.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// Add a tracer to every cell its bounds overlap. Bounds reaching past
    /// the grid land in the border cells.
    pub fn add(&mut self, tracer: Arc<dyn Tracer>) {
        self.empty = false;
        let bounds = tracer.bounds();
        let (min_x, min_y) = self.cell_coords(bounds.x.min, bounds.y.min);
        let (max_x, max_y) = self.cell_coords(bounds.x.max, bounds.y.max);
        for cy in min_y..=max_y {
            for cx in min_x..=max_x {
                self.cells[cy * self.count_root + cx]
                    .get_or_insert_with(GroupTracer::new)
                    .add(tracer.clone());
            }
        }
    }

    /// Sort every cell by nearest depth.
    pub fn sort(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            cell.sort();
        }
    }

    fn cell_coords(&self, x: f64, y: f64) -> (usize, usize) {
        let n = self.count_root as f64;
        // NaN (zero-size bounds) and out-of-grid positions clamp to the border
        let fx = (n * (x - self.bounds.x.min) / self.bounds.dx())
            .max(0.0)
            .min(n - 1.0);
        let fy = (n * (y - self.bounds.y.min) / self.bounds.dy())
            .max(0.0)
            .min(n - 1.0);
        (fx as usize, fy as usize)
    }

    fn cell(&self, x: f64, y: f64) -> Option<&GroupTracer> {
        let (cx, cy) = self.cell_coords(x, y);
        self.cells[cy * self.count_root + cx].as_ref()
    }
}

impl Tracer for FacetTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        self.cell(x, y)?.trace(x, y, ray)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        self.cell(x, y)?.trace_deep(x, y, ray)
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
    use crate::BallTracer;
    use unicornify_core::{Ball, Color};
    use unicornify_math::{Interval, WorldView};

    fn grid() -> FacetTracer {
        FacetTracer::new(
            Bounds::new(
                Interval::new(0.0, 160.0),
                Interval::new(0.0, 160.0),
                Interval::new(0.0, 1000.0),
            ),
            FACET_COUNT_ROOT,
        )
    }

    #[test]
    fn test_cell_coords_clamp() {
        let facets = grid();
        assert_eq!(facets.cell_coords(0.0, 0.0), (0, 0));
        assert_eq!(facets.cell_coords(15.0, 25.0), (1, 2));
        assert_eq!(facets.cell_coords(160.0, 159.9), (15, 15));
        assert_eq!(facets.cell_coords(-50.0, 1e9), (0, 15));
    }

    #[test]
    fn test_zero_size_bounds_use_first_cell() {
        let flat = FacetTracer::new(
            Bounds::new(
                Interval::new(5.0, 5.0),
                Interval::new(5.0, 5.0),
                Interval::new(0.0, 1.0),
            ),
            4,
        );
        assert_eq!(flat.cell_coords(5.0, 5.0), (0, 0));
    }

    #[test]
    fn test_add_spans_cells() {
        let view = WorldView::new(Vector::new(0.0, 0.0, -500.0), Vector::ZERO, 500.0);
        let mut facets = grid();
        assert!(facets.is_empty());
        // projects to (80, 80) with a radius of about 20 pixels
        let ball = Arc::new(BallTracer::new(
            &view,
            &Ball::new(Vector::new(80.0, 80.0, 0.0), 20.0, Color::WHITE),
        ));
        facets.add(ball.clone());
        facets.sort();
        assert!(!facets.is_empty());

        let filled = facets.cells.iter().filter(|c| c.is_some()).count();
        assert!(filled >= 9);
        assert!(filled < 64);
        let ray = view.ray(80.0, 80.0);
        assert_eq!(facets.trace(80.0, 80.0, ray), ball.trace(80.0, 80.0, ray));
        assert!(facets.trace(150.0, 150.0, view.ray(150.0, 150.0)).is_none());
    }
}
