//! Bone primitive: the surface swept by a ball moving (and growing or
//! shrinking) from one end ball to the other.

use std::sync::Arc;

use unicornify_core::{
    Ball, BoneCurve, Color, RenderingParameters, TraceInterval, TraceIntervals, TraceResult,
};
use unicornify_math::{cross_axes, Bounds, Vector, WorldView};

use crate::ball::{rendering_bounds_for_balls, BallProjection};
use crate::tracer::{simply_pruned, Tracer};
use crate::GroupTracer;

/// Consecutive segments of a curved bone closer than one degree to
/// collinear are merged.
const COLLINEAR_COSINE: f64 = 0.999848;

/// Tapered capsule between two projected balls.
///
/// A point of the bone is on the sphere with center `a + f*w` and radius
/// `ra + f*dr` for some `f` in `[0, 1]`. Solving for the ray depth gives a
/// quadratic in `z` whose coefficients only depend on the ray direction
/// through `c3` and `c5`; the rest is precomputed here.
pub struct BoneTracer {
    a: Vector,
    w: Vector,
    ra: f64,
    dr: f64,
    c2: f64,
    c4: f64,
    c6: f64,
    c8: f64,
    c9: f64,
    c14: f64,
    color1: Color,
    color2: Color,
    bounds: Bounds,
}

impl BoneTracer {
    pub fn new(b1: BallProjection, b2: BallProjection) -> Self {
        let a = b1.center_cs();
        let w = b2.center_cs() - a;
        let ra = b1.ball.radius;
        let dr = b2.ball.radius - ra;

        let c2 = w.length_squared() - dr * dr;
        let c4 = 2.0 * (a.dot(w) - ra * dr);
        let c6 = a.length_squared() - ra * ra;
        let (c8, c9, c14) = if c2 == 0.0 {
            (0.0, 0.0, 0.0)
        } else {
            let c8 = c4 / c2;
            (c8, 1.0 / c2, c8 * c8 / 4.0 - c6 / c2)
        };

        Self {
            a,
            w,
            ra,
            dr,
            c2,
            c4,
            c6,
            c8,
            c9,
            c14,
            color1: b1.ball.color,
            color2: b2.ball.color,
            bounds: rendering_bounds_for_balls(&[b1, b2]),
        }
    }

    /// Depth and sweep fraction of the ball sphere at `f`, front or back.
    fn cap(&self, c3: f64, c5: f64, f: f64, backside: bool) -> Option<f64> {
        let pz = c3 * f + c5;
        let qz = self.c2 * f * f + self.c4 * f + self.c6;
        let discriminant = pz * pz / 4.0 - qz;
        if discriminant < 0.0 {
            return None;
        }
        let root = discriminant.sqrt();
        Some(if backside { -pz / 2.0 + root } else { -pz / 2.0 - root })
    }

    fn trace_side(&self, ray: Vector, backside: bool) -> Option<TraceResult> {
        let c3 = -2.0 * ray.dot(self.w);
        let c5 = -2.0 * ray.dot(self.a);
        // the end where the radius is larger
        let big_end = if self.dr > 0.0 { 1.0 } else { 0.0 };

        let (mut z, mut f) = (0.0, big_end);
        if self.c2 != 0.0 {
            let c7 = c3 / self.c2;
            let c10 = c5 / self.c2;
            let c12 = c7 * c7 / 4.0 - self.c9;
            if c12 == 0.0 {
                return None;
            }
            let c13 = c7 * self.c8 / 2.0 - c10;
            let pz = c13 / c12;
            let qz = self.c14 / c12;
            let discriminant = pz * pz / 4.0 - qz;
            if discriminant.is_nan() || discriminant < 0.0 {
                return None;
            }

            let root = discriminant.sqrt();
            let (mut z1, mut z2) = (-pz / 2.0 + root, -pz / 2.0 - root);
            let mut f1 = -(c3 * z1 + self.c4) / (2.0 * self.c2);
            let mut f2 = -(c3 * z2 + self.c4) / (2.0 * self.c2);

            // a root with negative sweep radius belongs to the mirrored cone
            let g1 = self.ra + f1 * self.dr >= 0.0;
            let g2 = self.ra + f2 * self.dr >= 0.0;
            if !g1 {
                (z1, f1) = (z2, f2);
                f2 = big_end;
            }
            if !g2 {
                (z2, f2) = (z1, f1);
                f1 = big_end;
            }
            (z, f) = if backside { (z1, f1) } else { (z2, f2) };
        }

        if f <= 0.0 || f >= 1.0 {
            f = f.clamp(0.0, 1.0);
            z = match self.cap(c3, c5, f, backside) {
                Some(z) => z,
                None => {
                    f = 1.0 - f;
                    self.cap(c3, c5, f, backside)?
                }
            };
        }
        if !z.is_finite() || !f.is_finite() {
            return None;
        }

        let m = self.a + self.w * f;
        Some(TraceResult::new(
            z,
            ray * z - m,
            self.color1.mix(self.color2, f),
        ))
    }
}

impl Tracer for BoneTracer {
    fn trace(&self, _x: f64, _y: f64, ray: Vector) -> Option<TraceResult> {
        self.trace_side(ray, false)
    }

    fn trace_deep(&self, _x: f64, _y: f64, ray: Vector) -> Option<TraceIntervals> {
        let front = self.trace_side(ray, false)?;
        // the back can go missing through rounding at the silhouette
        let back = self.trace_side(ray, true)?;
        let interval = TraceInterval::new(front, back);
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

/// Approximate a curved bone by a chain of straight bones.
///
/// The curves displace the sweep center along the two axes perpendicular
/// to the bone: at fraction `t` the offset is `(curve(t) - t) * length`.
pub fn curved_bone_tracer(
    view: &WorldView,
    b1: &Ball,
    b2: &Ball,
    x_curve: Option<BoneCurve>,
    y_curve: Option<BoneCurve>,
    segments: usize,
) -> GroupTracer {
    let span = b2.center - b1.center;
    let length = span.length();
    let (vx, vy) = cross_axes(span / length);

    let ball_at = |t: f64| {
        let fx = x_curve.map_or(t, |c| c.apply(t));
        let fy = y_curve.map_or(t, |c| c.apply(t));
        let center = b1.center + span * t + vx * ((fx - t) * length) + vy * ((fy - t) * length);
        let radius = b1.radius + (b2.radius - b1.radius) * t;
        BallProjection::new(view, &Ball::new(center, radius, b1.color.mix(b2.color, t)))
    };

    let segments = segments.max(1);
    let mut group = GroupTracer::new();
    let mut prev = BallProjection::new(view, b1);
    let mut next = ball_at(1.0 / segments as f64);
    for i in 1..=segments {
        let current = next;
        if i < segments {
            next = ball_at((i + 1) as f64 / segments as f64);
            let seg1 = current.ball.center - prev.ball.center;
            let seg2 = next.ball.center - current.ball.center;
            if seg1.dot(seg2) / (seg1.length() * seg2.length()) > COLLINEAR_COSINE {
                continue;
            }
        }
        group.add(Arc::new(BoneTracer::new(prev, current)));
        prev = current;
    }
    group
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BallTracer;

    fn front_view() -> WorldView {
        WorldView::new(Vector::new(0.0, 0.0, -500.0), Vector::ZERO, 100.0)
    }

    fn bone(view: &WorldView, r1: f64, r2: f64) -> BoneTracer {
        let b1 = Ball::new(Vector::new(-100.0, 0.0, 0.0), r1, Color::BLACK);
        let b2 = Ball::new(Vector::new(100.0, 0.0, 0.0), r2, Color::WHITE);
        BoneTracer::new(BallProjection::new(view, &b1), BallProjection::new(view, &b2))
    }

    #[test]
    fn test_equal_radius_bone_is_cylinder() {
        let view = front_view();
        let tracer = bone(&view, 20.0, 20.0);

        let hit = tracer.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((hit.z - 480.0).abs() < 1e-6);
        assert_eq!(hit.color, Color::BLACK.mix(Color::WHITE, 0.5));

        // the cylinder's front line sits 480 deep, so an oblique ray is longer
        let hit = tracer.trace(10.0, 0.0, view.ray(10.0, 0.0)).unwrap();
        assert!((hit.z - 480.0 * 1.01f64.sqrt()).abs() < 1e-6);

        let deep = tracer.trace_deep(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((deep.as_slice()[0].end.z - 520.0).abs() < 1e-6);
    }

    #[test]
    fn test_bone_cap_matches_end_ball() {
        let view = front_view();
        let tracer = bone(&view, 20.0, 20.0);
        let end = BallTracer::new(
            &view,
            &Ball::new(Vector::new(100.0, 0.0, 0.0), 20.0, Color::WHITE),
        );
        let ray = view.ray(22.0, 0.0);
        let from_bone = tracer.trace(22.0, 0.0, ray).unwrap();
        let from_ball = end.trace(22.0, 0.0, ray).unwrap();
        assert!((from_bone.z - from_ball.z).abs() < 1e-6);
        assert_eq!(from_bone.color, Color::WHITE);
    }

    #[test]
    fn test_tapered_bone_miss_outside() {
        let view = front_view();
        let tracer = bone(&view, 30.0, 5.0);
        assert!(tracer.trace(0.0, 30.0, view.ray(0.0, 30.0)).is_none());
        assert!(tracer.trace_deep(0.0, 30.0, view.ray(0.0, 30.0)).is_none());
        // thicker at the first ball
        assert!(tracer.trace(-19.0, 4.0, view.ray(-19.0, 4.0)).is_some());
        assert!(tracer.trace(19.0, 4.0, view.ray(19.0, 4.0)).is_none());
    }

    #[test]
    fn test_degenerate_bone_is_ball() {
        let view = front_view();
        let b = Ball::new(Vector::ZERO, 50.0, Color::WHITE);
        let proj = BallProjection::new(&view, &b);
        let tracer = BoneTracer::new(proj, proj);
        let hit = tracer.trace(0.0, 0.0, view.ray(0.0, 0.0)).unwrap();
        assert!((hit.z - 450.0).abs() < 1e-9);
    }

    #[test]
    fn test_curved_bone_segments() {
        let view = front_view();
        let b1 = Ball::new(Vector::new(-100.0, 0.0, 0.0), 10.0, Color::BLACK);
        let b2 = Ball::new(Vector::new(100.0, 0.0, 0.0), 10.0, Color::WHITE);

        let straight = curved_bone_tracer(&view, &b1, &b2, Some(BoneCurve::gamma(1.0)), None, 255);
        assert_eq!(straight.len(), 1);

        let bent = curved_bone_tracer(&view, &b1, &b2, Some(BoneCurve::gamma(2.0)), None, 255);
        // a quarter turn overall, merged in steps of about a degree or two
        assert!(bent.len() > 5);
        assert!(bent.len() < 255);
    }
}
