//! Turning a seed into a finished picture.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use unicornify_core::{Ball, BallId, Color, Figure, Flat, Sandwich, Skeleton, Thing};
use unicornify_math::{Axis, Vector, VectorExt, WorldView, DEGREE};
use unicornify_renderer::{
    render, shadow_casting_tracer, tracer_for, DirectionalLightTracer, Progress,
    Raster, RenderConfig, ScalingTracer, Tracer, TracerSettings, TranslatingTracer,
};

use crate::data::{BackgroundData, GrassData, UnicornData};
use crate::grass::GrassFill;
use crate::seed::{SeedError, SeedRandom};
use crate::unicorn::Unicorn;

/// Errors from [`make_avatar`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AvatarError {
    #[error("Invalid seed: {0}")]
    InvalidSeed(#[from] SeedError),

    #[error("Image size must be positive")]
    ZeroSize,

    #[error("Image size {0} is too large")]
    TooLarge(u32),
}

/// What to draw and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarOptions {
    /// Paint sky, rainbow and clouds; otherwise the picture is white
    /// behind the unicorn.
    pub background: bool,
    /// Light the surfaces from one direction.
    pub shading: bool,
    /// Let the unicorn cast a shadow onto itself and the ground.
    pub shadow: bool,
    /// Grow grass on the ground.
    pub grass: bool,
    /// Use the tile-parallel driver.
    pub parallel: bool,
    /// Always show the whole unicorn.
    pub zoom_out: bool,
    /// Render at twice the size and box-filter down.
    pub supersample: bool,
}

impl Default for AvatarOptions {
    fn default() -> Self {
        Self {
            background: true,
            shading: false,
            shadow: false,
            grass: false,
            parallel: true,
            zoom_out: false,
            supersample: true,
        }
    }
}

/// Everything a seed decides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AvatarParameters {
    pub unicorn: UnicornData,
    pub background: BackgroundData,
    pub grass: GrassData,
    /// 0.5 shows the whole unicorn, 3.0 is a head shot.
    pub scale_factor: f64,
    /// Camera elevation in radians.
    pub x_angle: f64,
    /// Camera azimuth in radians; 90° looks the unicorn in the face.
    pub y_angle: f64,
}

impl AvatarParameters {
    /// Draw all parameters from the seed, in their fixed order.
    pub fn generate(seed: &str) -> Result<Self, SeedError> {
        let mut rand = SeedRandom::from_hex(seed)?;
        let mut unicorn = UnicornData::default();
        let mut background = BackgroundData::default();
        let mut grass = GrassData::default();

        unicorn.randomize1(&mut rand);
        background.randomize1(&mut rand);

        let scale_factor = 0.5 + rand.random().powi(2) * 2.5;
        let sign = (rand.choice(2) * 2) as i32 - 1;
        let abs = rand.rand_int(10, 75);
        let y_angle = f64::from(90 + sign * abs) * DEGREE;
        let x_angle = f64::from(rand.rand_int(-20, 20)) * DEGREE;

        unicorn.randomize2(&mut rand);
        background.randomize2(&mut rand);
        unicorn.randomize3(&mut rand);
        grass.randomize(&mut rand);
        unicorn.randomize4(&mut rand);

        if (y_angle - 90.0 * DEGREE) * unicorn.neck_tilt > 0.0 {
            // the unicorn should look at the camera
            unicorn.neck_tilt = -unicorn.neck_tilt;
            unicorn.face_tilt = -unicorn.face_tilt;
        }

        grass.color1 = background.land.color(background.land_light + 10);
        grass.color2 = background.land.color(background.land_light + 25);

        Ok(Self {
            unicorn,
            background,
            grass,
            scale_factor,
            x_angle,
            y_angle,
        })
    }
}

/// Distance of the camera from the point it looks at, and its focal
/// length, relative to the image size. Equal values put the look-at depth
/// at a 1:1 scale.
const CAMERA_DISTANCE: f64 = 3.0;

/// Half the side of the ground square, relative to the image size.
const GROUND_EXTENT: f64 = 1.5;

/// Blade height relative to the image size.
const GRASS_HEIGHT: f64 = 0.04;

const SHADING_LIGHTEN: f64 = 24.0;
const SHADING_DARKEN: f64 = 64.0;
const SHADOW_LIGHTEN: f64 = 24.0;
const SHADOW_DARKEN: f64 = 48.0;

/// The posed, scaled unicorn with its camera and optional ground.
pub struct AvatarScene {
    pub skeleton: Skeleton,
    pub unicorn: Unicorn,
    pub ground: Option<Thing>,
    pub view: WorldView,
    /// Screen offset that frames the unicorn in the image.
    pub shift: (f64, f64),
    pub light_position: Vector,
}

impl AvatarScene {
    pub fn new(params: &AvatarParameters, size: u32, options: &AvatarOptions) -> Self {
        let fsize = f64::from(size);
        let scale_factor = if options.zoom_out {
            0.5
        } else {
            params.scale_factor
        };

        let mut skeleton = Skeleton::new();
        let unicorn = Unicorn::new(&params.unicorn, &mut skeleton);
        skeleton.scale(&unicorn.figure.ball_ids(), scale_factor * fsize / 400.0);

        let head = skeleton.ball(unicorn.head).center;
        let shoulder = skeleton.ball(unicorn.shoulder).center;
        let look_at = head.between(shoulder, 0.5);
        let distance = CAMERA_DISTANCE * fsize;
        let camera = look_at
            + Vector::new(0.0, 0.0, -distance)
                .rotated_around(Vector::ZERO, -params.x_angle, Axis::X)
                .rotated_around(Vector::ZERO, -params.y_angle, Axis::Y);
        let view = WorldView::new(camera, look_at, distance);

        // head at (1/2, 1/3) for close-ups, shoulder centered when zoomed out
        let head_p = view.project_sphere(head, 0.0);
        let shoulder_p = view.project_sphere(shoulder, 0.0);
        let head_shift = (fsize / 2.0 - head_p.x(), fsize / 3.0 - head_p.y());
        let shoulder_shift = (fsize / 2.0 - shoulder_p.x(), fsize / 2.0 - shoulder_p.y());
        let factor = ((scale_factor - 0.5) / 2.5).sqrt();
        let shift = (
            shoulder_shift.0 + (head_shift.0 - shoulder_shift.0) * factor,
            shoulder_shift.1 + (head_shift.1 - shoulder_shift.1) * factor,
        );

        let light_position =
            look_at + Vector::new(-1.0, -3.0, -1.0).normalize() * (10.0 * fsize);

        let mut scene = Self {
            skeleton,
            unicorn,
            ground: None,
            view,
            shift,
            light_position,
        };
        if options.grass || options.shadow {
            scene.ground = scene.make_ground(params, fsize, options.grass);
        }
        scene
    }

    /// A square of ground under the hooves, or a lawn on it. `None` when
    /// the camera is below the ground.
    fn make_ground(&mut self, params: &AvatarParameters, fsize: f64, grass: bool) -> Option<Thing> {
        let ground_y = self
            .unicorn
            .legs
            .iter()
            .map(|leg| {
                let hoof = self.skeleton.ball(leg.hoof);
                hoof.center.y + hoof.radius
            })
            .fold(f64::NEG_INFINITY, f64::max);
        if self.view.position().y >= ground_y {
            log::debug!("Camera is below the ground, leaving it out");
            return None;
        }

        let center = self.view.look_at();
        let extent = GROUND_EXTENT * fsize;
        let color = params.background.land_color();
        let mut corner = |dx: f64, dz: f64| -> BallId {
            self.skeleton.add(Ball::new(
                Vector::new(center.x + dx, ground_y, center.z + dz),
                0.0,
                color,
            ))
        };
        let balls = [
            corner(-extent, -extent),
            corner(extent, -extent),
            corner(-extent, extent),
        ];

        Some(if grass {
            Thing::Sandwich(Sandwich {
                balls,
                extrusion: Vector::new(0.0, -GRASS_HEIGHT * fsize, 0.0),
                fill: Arc::new(GrassFill::new(params.grass, color)),
            })
        } else {
            Thing::Flat(Flat {
                balls,
                four_corners: true,
                fourth_color: color,
                // y points down, so up is -y
                rough_direction: Vector::new(0.0, -1.0, 0.0),
            })
        })
    }

    /// Tracer for the framed scene, in image pixel coordinates.
    pub fn tracer(&self, options: &AvatarOptions, settings: &TracerSettings) -> Arc<dyn Tracer> {
        let creature = Thing::Figure(self.unicorn.figure.clone());
        let mut scene = Figure::new();
        scene.add(creature.clone());
        if let Some(ground) = &self.ground {
            scene.add(ground.clone());
        }

        let mut tracer = tracer_for(&scene.into(), &self.skeleton, &self.view, settings);

        if options.shading {
            let travel = self.view.look_at() - self.light_position;
            let direction = self
                .view
                .camera_space_direction(self.view.look_at(), travel.normalize());
            tracer = Arc::new(DirectionalLightTracer::new(
                tracer,
                direction,
                SHADING_LIGHTEN,
                SHADING_DARKEN,
            ));
        }
        if options.shadow {
            tracer = Arc::new(shadow_casting_tracer(
                tracer,
                &self.view,
                &creature,
                &self.skeleton,
                settings,
                self.light_position,
                self.view.look_at(),
                SHADOW_LIGHTEN,
                SHADOW_DARKEN,
            ));
        }
        Arc::new(TranslatingTracer::new(
            &self.view,
            tracer,
            self.shift.0,
            self.shift.1,
        ))
    }
}

/// Render the unicorn for `seed` into a `size × size` raster.
///
/// `progress` receives finished rows out of the render height, which is
/// `2 * size` when supersampling.
pub fn make_avatar(
    seed: &str,
    size: u32,
    options: &AvatarOptions,
    progress: Option<Progress>,
) -> Result<Raster, AvatarError> {
    let params = AvatarParameters::generate(seed)?;
    render_avatar(&params, size, options, progress)
}

/// Render already generated parameters.
pub fn render_avatar(
    params: &AvatarParameters,
    size: u32,
    options: &AvatarOptions,
    progress: Option<Progress>,
) -> Result<Raster, AvatarError> {
    if size == 0 {
        return Err(AvatarError::ZeroSize);
    }
    let render_size = if options.supersample {
        size.checked_mul(2).ok_or(AvatarError::TooLarge(size))?
    } else {
        size
    };

    let start = Instant::now();
    let scene = AvatarScene::new(params, size, options);
    let settings = TracerSettings::default();
    let mut tracer = scene.tracer(options, &settings);

    if options.supersample {
        tracer = Arc::new(ScalingTracer::new(&scene.view, tracer, 2.0));
    }

    let mut raster = Raster::new(render_size, render_size, Color::WHITE);
    if options.background {
        params.background.paint(&mut raster);
    }
    log::debug!(
        "Scene built: {} balls, {} things, ground: {}",
        scene.skeleton.len(),
        scene.unicorn.figure.len(),
        scene.ground.is_some()
    );

    let config = RenderConfig {
        parallel: options.parallel,
        ..RenderConfig::default()
    };
    render(&tracer, &scene.view, &mut raster, &config, progress);

    if options.supersample {
        raster = raster.downscaled(2);
    }
    log::info!("Rendered {size}x{size} avatar in {:.2?}", start.elapsed());
    Ok(raster)
}
