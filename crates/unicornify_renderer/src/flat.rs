//! Flat primitive: a triangle or parallelogram spanned by three points.

use std::sync::Arc;

use unicornify_core::{Ball, Color, PlaneHit, RenderingParameters, TraceIntervals, TraceResult};
use unicornify_math::{intersection_of_plane_and_line, Bounds, Vector, WorldView};

use crate::ball::{rendering_bounds_for_balls, BallProjection};
use crate::tracer::{deepify_trace, simply_pruned, Tracer};

/// Planar surface through three ball centers (radii are ignored).
///
/// The corners are `p1`, `p1 + w1`, `p1 + w2` and, with four corners,
/// `p1 + w1 + w2`. Colors are interpolated across the surface.
pub struct FlatTracer {
    p1: BallProjection,
    p2: BallProjection,
    p3: BallProjection,
    w1: Vector,
    w2: Vector,
    direction: Vector,
    four_corners: bool,
    fourth_color: Color,
    bounds: Bounds,
}

impl FlatTracer {
    /// `rough_direction` (world space) picks which of the two plane normals
    /// is reported as the surface direction.
    pub fn new(
        view: &WorldView,
        b1: &Ball,
        b2: &Ball,
        b3: &Ball,
        four_corners: bool,
        fourth_color: Color,
        rough_direction: Vector,
    ) -> Self {
        let p1 = BallProjection::new(view, b1);
        let p2 = BallProjection::new(view, b2);
        let p3 = BallProjection::new(view, b3);
        let w1 = p2.center_cs() - p1.center_cs();
        let w2 = p3.center_cs() - p1.center_cs();

        let mut direction = w1.cross(w2);
        let rough_cs = view.camera_space_direction(view.look_at(), rough_direction);
        if direction.dot(rough_cs) < 0.0 {
            direction = -direction;
        }

        let mut bounds = rendering_bounds_for_balls(&[p1, p2, p3]);
        if four_corners {
            let corner = Ball::new(b2.center + b3.center - b1.center, 0.0, fourth_color);
            bounds = bounds.union(&rendering_bounds_for_balls(&[BallProjection::new(
                view, &corner,
            )]));
        }

        Self {
            p1,
            p2,
            p3,
            w1,
            w2,
            direction,
            four_corners,
            fourth_color,
            bounds,
        }
    }

    /// Where the ray meets the (unbounded) plane of this flat, in the plane
    /// coordinates along `w1` and `w2`. `None` if the ray is parallel to the
    /// plane or meets it behind the camera.
    pub fn trace_to_intersection(&self, ray: Vector) -> Option<PlaneHit> {
        let inter =
            intersection_of_plane_and_line(self.p1.center_cs(), self.w1, self.w2, Vector::ZERO, ray)?;
        if inter.z < 0.0 {
            return None;
        }
        Some(PlaneHit {
            u: inter.x,
            v: inter.y,
            z: inter.z,
        })
    }

    fn color_at(&self, u: f64, v: f64) -> Color {
        let c1 = self.p1.ball.color;
        let c2 = self.p2.ball.color;
        let c3 = self.p3.ball.color;
        if self.four_corners {
            c1.mix(c2, u).mix(c3.mix(self.fourth_color, u), v)
        } else {
            let f = if v < 1.0 { u / (1.0 - v) } else { 1.0 };
            c1.mix(c2, f).mix(c3, v)
        }
    }
}

impl Tracer for FlatTracer {
    fn trace(&self, _x: f64, _y: f64, ray: Vector) -> Option<TraceResult> {
        let hit = self.trace_to_intersection(ray)?;
        let (u, v) = (hit.u, hit.v);
        if !(0.0..=1.0).contains(&u) || !(0.0..=1.0).contains(&v) {
            return None;
        }
        if !self.four_corners && u + v > 1.0 {
            return None;
        }
        Some(TraceResult::new(hit.z, self.direction, self.color_at(u, v)))
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        deepify_trace(self, x, y, ray)
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        simply_pruned(self, rp)
    }
}
