//! Ball primitive and the projected-ball helpers every primitive builds on.

use std::sync::Arc;

use unicornify_core::{Ball, RenderingParameters, TraceInterval, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Interval, SphereProjection, Vector, WorldView};

use crate::tracer::{simply_pruned, undeepify_trace, Tracer};

/// A ball together with its projection into one view.
#[derive(Debug, Clone, Copy)]
pub struct BallProjection {
    pub projection: SphereProjection,
    pub ball: Ball,
}

impl BallProjection {
    pub fn new(view: &WorldView, ball: &Ball) -> Self {
        Self {
            projection: view.project_sphere(ball.center, ball.radius),
            ball: *ball,
        }
    }

    pub fn center_cs(&self) -> Vector {
        self.projection.center_cs
    }
}

/// Screen and depth extent covering all the given balls.
///
/// Balls behind the camera use their camera-space x/y, which keeps the
/// box conservative where the projection would mirror them.
pub fn rendering_bounds_for_balls(projections: &[BallProjection]) -> Bounds {
    projections.iter().fold(Bounds::EMPTY, |acc, bp| {
        let p = &bp.projection;
        let (x, y) = if p.center_cs.z < 0.0 {
            (p.center_cs.x, p.center_cs.y)
        } else {
            (p.x(), p.y())
        };
        let r = p.projected_radius;
        let bounds = Bounds::new(
            Interval::new(x - r, x + r),
            Interval::new(y - r, y + r),
            Interval::new(p.center_cs.z - bp.ball.radius, p.z() + bp.ball.radius),
        );
        acc.union(&bounds)
    })
}

/// A single sphere.
pub struct BallTracer {
    projection: BallProjection,
    bounds: Bounds,
}

impl BallTracer {
    pub fn new(view: &WorldView, ball: &Ball) -> Self {
        let projection = BallProjection::new(view, ball);
        Self {
            bounds: rendering_bounds_for_balls(&[projection]),
            projection,
        }
    }
}

impl Tracer for BallTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        undeepify_trace(self, x, y, ray)
    }

    fn trace_deep(&self, _x: f64, _y: f64, ray: Vector) -> Option<TraceIntervals> {
        let center = self.projection.center_cs();
        let radius = self.projection.ball.radius;

        // |t*ray - center|^2 = r^2 with a unit ray
        let h = ray.dot(center);
        let c = center.length_squared() - radius * radius;
        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();
        let color = self.projection.ball.color;
        let hit = |z: f64| TraceResult::new(z, ray * z - center, color);

        let interval = TraceInterval::new(hit(h - sqrtd), hit(h + sqrtd));
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
