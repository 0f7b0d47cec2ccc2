//! Drawing tracers into a raster, serially or tile-parallel.

use std::sync::mpsc;
use std::sync::Arc;

use rayon::prelude::*;
use unicornify_core::{Color, RenderingParameters};
use unicornify_math::{PixelRect, WorldView};

use crate::bucket::{generate_buckets, render_bucket, tiles_per_side, BucketResult};
use crate::tracer::Tracer;

/// How to drive a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Render tiles on the rayon pool instead of row by row.
    pub parallel: bool,
    /// Grid size per side; `None` picks one from the image size.
    pub tiles_per_side: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            tiles_per_side: None,
        }
    }
}

/// Progress callback; receives the number of rows (or row equivalents)
/// finished so far, out of the raster height.
pub type Progress<'a> = &'a dyn Fn(u32);

/// Simple 8-bit RGB raster in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Raster {
    /// Create a raster filled with one color.
    pub fn new(width: u32, height: u32, fill: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    /// Create a raster by evaluating `f` for every pixel.
    pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> Color) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Full-raster pixel rectangle.
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(0, 0, i64::from(self.width) - 1, i64::from(self.height) - 1)
    }

    /// Copy the hit pixels of a finished bucket into the raster.
    pub fn blit(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, pixel) in result.pixels.iter().enumerate() {
            if let Some(color) = pixel {
                let x = bucket.x + i as u32 % bucket.width;
                let y = bucket.y + i as u32 / bucket.width;
                self.set(x, y, *color);
            }
        }
    }

    /// Box-filter down by an integer factor; every output pixel is the
    /// rounded mean of a `factor × factor` block. Partial blocks at the
    /// right and bottom edges are dropped.
    pub fn downscaled(&self, factor: u32) -> Raster {
        let factor = factor.max(1);
        let samples = factor * factor;
        Raster::from_fn(self.width / factor, self.height / factor, |x, y| {
            let (mut r, mut g, mut b) = (0u32, 0u32, 0u32);
            for dy in 0..factor {
                for dx in 0..factor {
                    let c = self.get(x * factor + dx, y * factor + dy);
                    r += u32::from(c.r);
                    g += u32::from(c.g);
                    b += u32::from(c.b);
                }
            }
            let mean = |sum: u32| ((sum + samples / 2) / samples) as u8;
            Color::new(mean(r), mean(g), mean(b))
        })
    }

    /// Packed RGB bytes, row by row.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|c| c.to_array()).collect()
    }

    /// Convert to an `image` buffer for encoding.
    pub fn to_image(&self) -> image::RgbImage {
        image::RgbImage::from_fn(self.width, self.height, |x, y| self.get(x, y).into())
    }
}

/// Draw the tracer row by row on the calling thread. Pixels that hit
/// nothing keep their current color.
pub fn draw_tracer(
    tracer: &Arc<dyn Tracer>,
    view: &WorldView,
    raster: &mut Raster,
    progress: Option<Progress>,
) {
    let full = raster.rect();
    let rp = RenderingParameters::new(
        full.x_min as f64,
        full.x_max as f64,
        full.y_min as f64,
        full.y_max as f64,
    )
    .padded(1.0);
    let pruned = tracer.clone().pruned(&rp);
    let rect = pruned
        .as_ref()
        .map_or(PixelRect::EMPTY, |t| full.intersect(&t.bounds().to_pixel_rect()));

    for y in 0..raster.height() {
        let row = i64::from(y);
        if let Some(pruned) = pruned.as_ref().filter(|_| row >= rect.y_min && row <= rect.y_max) {
            for x in rect.x_min..=rect.x_max {
                let (fx, fy) = (x as f64, row as f64);
                if let Some(hit) = pruned.trace(fx, fy, view.ray(fx, fy)) {
                    raster.set(x as u32, y, hit.color);
                }
            }
        }
        if let Some(progress) = progress {
            progress(y + 1);
        }
    }
}

/// Draw the tracer as a grid of independently pruned tiles on the rayon
/// pool. Results are written by the calling thread as they arrive, so the
/// output is identical to [`draw_tracer`].
pub fn draw_tracer_parallel(
    tracer: &Arc<dyn Tracer>,
    view: &WorldView,
    raster: &mut Raster,
    tiles: u32,
    progress: Option<Progress>,
) {
    let buckets = generate_buckets(raster.width(), raster.height(), tiles);
    let count = buckets.len() as u64;
    let height = u64::from(raster.height());
    let (tx, rx) = mpsc::channel::<BucketResult>();

    std::thread::scope(|scope| {
        scope.spawn(move || {
            buckets.into_par_iter().for_each_with(tx, |tx, bucket| {
                let pixels = render_bucket(&bucket, tracer, view);
                // the receiver lives until every bucket is in
                let _ = tx.send(BucketResult::new(bucket, pixels));
            });
        });

        for (done, result) in rx.iter().enumerate() {
            raster.blit(&result);
            if let Some(progress) = progress {
                progress((height * (done as u64 + 1) / count) as u32);
            }
        }
    });
}

/// Draw with the driver `config` selects.
pub fn render(
    tracer: &Arc<dyn Tracer>,
    view: &WorldView,
    raster: &mut Raster,
    config: &RenderConfig,
    progress: Option<Progress>,
) {
    if config.parallel {
        let tiles = config
            .tiles_per_side
            .unwrap_or_else(|| tiles_per_side(raster.width(), raster.height()));
        log::debug!(
            "Rendering {}x{} in {}x{} tiles on {} threads",
            raster.width(),
            raster.height(),
            tiles,
            tiles,
            rayon::current_num_threads()
        );
        draw_tracer_parallel(tracer, view, raster, tiles, progress);
    } else {
        log::debug!("Rendering {}x{} serially", raster.width(), raster.height());
        draw_tracer(tracer, view, raster, progress);
    }
}
