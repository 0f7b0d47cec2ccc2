//! Unicornify Renderer - deterministic CPU ray tracing of ball scenes
//!
//! Every primitive is built from balls seen through one [`WorldView`]:
//! spheres, tapered bones between two balls, flat triangles and quads,
//! extruded steaks and sandwiches. Tracers compose through groups, CSG
//! wrappers, screen transforms and light/shadow shading, and are pruned
//! per tile before tracing.
//!
//! [`WorldView`]: unicornify_math::WorldView

mod tracer;
mod ball;
mod bone;
mod flat;
mod steak;
mod sandwich;
mod group;
mod facet;
mod csg;
mod transform;
mod lighting;
mod thing_tracer;
mod bucket;
mod renderer;

pub use tracer::{deepify_trace, simply_pruned, undeepify_trace, Tracer};
pub use ball::{rendering_bounds_for_balls, BallProjection, BallTracer};
pub use bone::{curved_bone_tracer, BoneTracer};
pub use flat::FlatTracer;
pub use steak::{steak_tracer, SteakTracer};
pub use sandwich::SandwichTracer;
pub use group::GroupTracer;
pub use facet::{FacetTracer, FACET_COUNT_ROOT};
pub use csg::{DifferenceTracer, IntersectionTracer};
pub use transform::{ScalingTracer, TranslatingTracer};
pub use lighting::{DirectionalLightTracer, ShadowCastingTracer};
pub use thing_tracer::{shadow_casting_tracer, tracer_for, TracerSettings};
pub use bucket::{generate_buckets, render_bucket, tiles_per_side, Bucket, BucketResult};
pub use renderer::{draw_tracer, draw_tracer_parallel, render, Progress, Raster, RenderConfig};
