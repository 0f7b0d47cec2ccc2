//! Tile ("bucket") splitting for the parallel driver.
//!
//! The image is cut into a fixed grid of buckets. Each bucket prunes the
//! tracer tree to its own rectangle and is rendered independently; results
//! are sent back to the thread that owns the raster.

use std::sync::Arc;

use unicornify_core::{Color, RenderingParameters};
use unicornify_math::{PixelRect, WorldView};

use crate::tracer::Tracer;

/// One tile of the raster, traced with its own pruned tracer tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// First raster column of the tile.
    pub x: u32,
    /// First raster row of the tile.
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the spiral order tiles are handed to rayon.
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Inclusive pixel rectangle covered by this bucket.
    pub fn rect(&self) -> PixelRect {
        PixelRect::new(
            i64::from(self.x),
            i64::from(self.y),
            i64::from(self.x + self.width) - 1,
            i64::from(self.y + self.height) - 1,
        )
    }

    /// Screen rectangle to prune against, one pixel wider on every side.
    pub fn rendering_parameters(&self) -> RenderingParameters {
        let rect = self.rect();
        RenderingParameters::new(
            rect.x_min as f64,
            rect.x_max as f64,
            rect.y_min as f64,
            rect.y_max as f64,
        )
        .padded(1.0)
    }
}

/// Smallest grid the parallel driver uses per side.
pub const MIN_TILES_PER_SIDE: u32 = 8;

/// Rough edge length of a tile on large images.
pub const TARGET_TILE_SIZE: u32 = 64;

/// Grid size for an image: at least 8×8 tiles, more for large images so
/// that tiles stay around 64 pixels wide.
pub fn tiles_per_side(width: u32, height: u32) -> u32 {
    MIN_TILES_PER_SIDE.max(width.max(height).div_ceil(TARGET_TILE_SIZE))
}

/// Split the image into a `tiles × tiles` grid, sorted in spiral order
/// from the center. Tiles that would be empty (images smaller than the
/// grid) are left out.
pub fn generate_buckets(width: u32, height: u32, tiles: u32) -> Vec<Bucket> {
    let tiles = tiles.max(1);
    let mut buckets = Vec::new();
    for ty in 0..tiles {
        for tx in 0..tiles {
            let x0 = width * tx / tiles;
            let x1 = width * (tx + 1) / tiles;
            let y0 = height * ty / tiles;
            let y1 = height * (ty + 1) / tiles;
            if x1 > x0 && y1 > y0 {
                buckets.push(Bucket::new(x0, y0, x1 - x0, y1 - y0, buckets.len()));
            }
        }
    }

    sort_spiral(&mut buckets, width, height);
    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }
    buckets
}

/// Sort buckets by distance from image center, so the middle of the
/// picture (where the figure usually is) arrives first.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = f64::from(width) / 2.0;
    let center_y = f64::from(height) / 2.0;
    let distance = |b: &Bucket| {
        let bx = f64::from(b.x) + f64::from(b.width) / 2.0;
        let by = f64::from(b.y) + f64::from(b.height) / 2.0;
        (bx - center_x).powi(2) + (by - center_y).powi(2)
    };
    buckets.sort_by(|a, b| distance(a).total_cmp(&distance(b)));
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket; `None` where
/// nothing was hit.
pub fn render_bucket(
    bucket: &Bucket,
    tracer: &Arc<dyn Tracer>,
    view: &WorldView,
) -> Vec<Option<Color>> {
    let mut pixels = vec![None; bucket.pixel_count() as usize];
    let Some(pruned) = tracer.clone().pruned(&bucket.rendering_parameters()) else {
        return pixels;
    };
    let rect = bucket.rect().intersect(&pruned.bounds().to_pixel_rect());
    if rect.is_empty() {
        return pixels;
    }

    for y in rect.y_min..=rect.y_max {
        for x in rect.x_min..=rect.x_max {
            let (fx, fy) = (x as f64, y as f64);
            if let Some(hit) = pruned.trace(fx, fy, view.ray(fx, fy)) {
                let local = (y - i64::from(bucket.y)) * i64::from(bucket.width)
                    + (x - i64::from(bucket.x));
                pixels[local as usize] = Some(hit.color);
            }
        }
    }
    pixels
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Option<Color>>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Option<Color>>) -> Self {
        Self { bucket, pixels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 8);
        assert_eq!(buckets.len(), 64);
        assert!(buckets.iter().all(|b| b.width == 16 && b.height == 16));
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 8);
        assert_eq!(buckets.len(), 64);
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);
    }

    #[test]
    fn test_tiny_image_skips_empty_buckets() {
        let buckets = generate_buckets(3, 3, 8);
        assert_eq!(buckets.len(), 9);
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 9);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 3);
        assert_eq!(buckets.len(), 9);
        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        assert!(buckets.iter().enumerate().all(|(i, b)| b.index == i));
    }

    #[test]
    fn test_tiles_per_side() {
        assert_eq!(tiles_per_side(32, 32), 8);
        assert_eq!(tiles_per_side(512, 256), 8);
        assert_eq!(tiles_per_side(513, 100), 9);
        assert_eq!(tiles_per_side(1024, 1024), 16);
    }

    #[test]
    fn test_bucket_rect_and_padding() {
        let bucket = Bucket::new(16, 32, 16, 8, 0);
        assert_eq!(bucket.rect(), PixelRect::new(16, 32, 31, 39));
        assert_eq!(
            bucket.rendering_parameters(),
            RenderingParameters::new(15.0, 32.0, 31.0, 40.0)
        );
    }
}
