//! Shading wrappers: directional light and cast shadows.

use std::sync::Arc;

use unicornify_core::{RenderingParameters, TraceIntervals, TraceResult};
use unicornify_math::{Bounds, Vector, WorldView};

use crate::tracer::{deepify_trace, Tracer};

/// Lightens surfaces facing against the light direction and darkens those
/// facing along it, in proportion to the cosine.
pub struct DirectionalLightTracer {
    source: Arc<dyn Tracer>,
    light_direction: Vector,
    lighten: f64,
    darken: f64,
}

impl DirectionalLightTracer {
    /// `light_direction` is the direction the light travels, in camera
    /// space; it gets normalized.
    pub fn new(source: Arc<dyn Tracer>, light_direction: Vector, lighten: f64, darken: f64) -> Self {
        Self {
            source,
            light_direction: light_direction.normalize_or_zero(),
            lighten,
            darken,
        }
    }
}

impl Tracer for DirectionalLightTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        let mut hit = self.source.trace(x, y, ray)?;
        let Some(unit) = hit.direction.try_normalize() else {
            return Some(hit);
        };
        let sp = unit.dot(self.light_direction);
        hit.color = if sp >= 0.0 {
            hit.color.darken((sp * self.darken) as u8)
        } else {
            hit.color.lighten((-sp * self.lighten) as u8)
        };
        Some(hit)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        deepify_trace(self, x, y, ray)
    }

    fn bounds(&self) -> Bounds {
        self.source.bounds()
    }

    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        let source = self.source.clone().pruned(rp)?;
        Some(Arc::new(DirectionalLightTracer {
            source,
            light_direction: self.light_direction,
            lighten: self.lighten,
            darken: self.darken,
        }))
    }
}

/// Darkens points of its source that the light cannot see, and shades the
/// lit ones by the angle between the light ray and the surface.
///
/// Visibility is decided by tracing the shadow caster from the light's
/// position: a point is lit if the nearest thing the light hits on its way
/// is (within a small tolerance) the point itself.
pub struct ShadowCastingTracer {
    source: Arc<dyn Tracer>,
    light_tracer: Option<Arc<dyn Tracer>>,
    view: WorldView,
    light_view: WorldView,
    lighten: f64,
    darken: f64,
}

/// Slack on the light-to-point distance before a point counts as occluded.
const SELF_SHADOW_TOLERANCE: f64 = 0.01;

impl ShadowCastingTracer {
    /// `light_tracer` must trace the shadow caster as seen from
    /// `light_view`.
    pub fn new(
        source: Arc<dyn Tracer>,
        view: &WorldView,
        light_view: &WorldView,
        light_tracer: Arc<dyn Tracer>,
        lighten: f64,
        darken: f64,
    ) -> Self {
        Self {
            source,
            light_tracer: Some(light_tracer),
            view: *view,
            light_view: *light_view,
            lighten,
            darken,
        }
    }
}

impl Tracer for ShadowCastingTracer {
    fn trace(&self, x: f64, y: f64, ray: Vector) -> Option<TraceResult> {
        let mut hit = self.source.trace(x, y, ray)?;
        let point = self.view.un_project(Vector::new(x, y, hit.z));
        let lp = self.light_view.project_sphere(point, 0.0);
        let (lx, ly) = (lp.x(), lp.y());
        let light_ray = self.light_view.ray(lx, ly);

        let Some(light_hit) = self
            .light_tracer
            .as_ref()
            .and_then(|t| t.trace(lx, ly, light_ray))
        else {
            // the light reaches nothing at all along this line
            return Some(hit);
        };

        let distance = (point - self.light_view.position()).length();
        if light_hit.z < distance - SELF_SHADOW_TOLERANCE {
            hit.color = hit.color.darken(self.darken as u8);
            return Some(hit);
        }

        let sp = light_hit
            .direction
            .try_normalize()
            .map_or(0.0, |unit| unit.dot(light_ray));
        if sp > 0.0 {
            hit.color = hit.color.darken(((1.0 - sp) * self.darken) as u8);
        } else if sp < 0.0 {
            let facing = -sp;
            hit.color = if facing < 0.5 {
                hit.color.darken(((0.5 - facing) * self.darken * 2.0) as u8)
            } else {
                hit.color.lighten(((facing - 0.5) * self.lighten * 2.0) as u8)
            };
        }
        Some(hit)
    }

    fn trace_deep(&self, x: f64, y: f64, ray: Vector) -> Option<TraceIntervals> {
        deepify_trace(self, x, y, ray)
    }

    fn bounds(&self) -> Bounds {
        self.source.bounds()
    }

    /// The source is pruned to `rp`; the light tracer only to the light
    /// view's own screen, since shadows come from anywhere.
    fn pruned(self: Arc<Self>, rp: &RenderingParameters) -> Option<Arc<dyn Tracer>> {
        let source = self.source.clone().pruned(rp)?;
        let light_tracer = self
            .light_tracer
            .clone()
            .and_then(|t| t.pruned(&RenderingParameters::unbounded()));
        Some(Arc::new(ShadowCastingTracer {
            source,
            light_tracer,
            view: self.view,
            light_view: self.light_view,
            lighten: self.lighten,
            darken: self.darken,
        }))
    }
}
