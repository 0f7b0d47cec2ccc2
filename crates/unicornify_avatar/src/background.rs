//! Painted backdrop: sky and land gradients, a rainbow and clouds.

use unicornify_core::Color;
use unicornify_renderer::Raster;

use crate::data::{BackgroundData, Cloud};

impl BackgroundData {
    /// Paint the whole raster. Everything is laid out relative to the
    /// raster width, which is expected to equal its height.
    pub fn paint(&self, raster: &mut Raster) {
        let size = raster.width();
        let fsize = f64::from(size.max(2) - 1);
        let horizon = (f64::from(size) * self.horizon) as u32;

        let sky_top = self.sky.color(60);
        let sky_bottom = self.sky.color(10);
        let land_left = self.land_color();
        let land_right = self.land.color(self.land_light / 2);

        let rainbow = Rainbow::new(self, fsize, f64::from(horizon));
        let clouds: Vec<CloudShape> = self
            .clouds
            .iter()
            .map(|cloud| CloudShape::new(cloud, fsize, self.sky.color(cloud.lightness)))
            .collect();

        for y in 0..raster.height() {
            for x in 0..size {
                let (fx, fy) = (f64::from(x), f64::from(y));
                let mut color = if y < horizon {
                    sky_top.mix(sky_bottom, fy / fsize)
                } else {
                    land_left.mix(land_right, fx / fsize)
                };
                if let Some(band) = rainbow.band_at(fx, fy) {
                    color = band;
                }
                for cloud in &clouds {
                    if cloud.contains(fx, fy) {
                        color = cloud.color;
                    }
                }
                raster.set(x, y, color);
            }
        }
    }
}

/// Seven concentric half rings standing on the horizon.
struct Rainbow {
    center_x: f64,
    center_y: f64,
    /// (radius, half stroke width, color), outermost first.
    bands: Vec<(f64, f64, Color)>,
}

impl Rainbow {
    const BANDS: i32 = 7;

    fn new(data: &BackgroundData, fsize: f64, horizon: f64) -> Self {
        let band_width = data.rainbow_band_width * fsize;
        let outer_radius = data.rainbow_height * fsize;
        // all but the innermost band overlap their neighbour a little so no
        // gap shows between them
        let overlap = band_width.min(2.0);
        let bands = (0..Self::BANDS)
            .map(|band| {
                let overlap = if band == Self::BANDS - 1 { 0.0 } else { overlap };
                let radius = outer_radius - f64::from(band) * band_width - overlap / 2.0;
                let half_width = (band_width + overlap) / 2.0;
                (radius, half_width, Color::from_hsl(band * 45, 100, 50))
            })
            .collect();
        Self {
            center_x: fsize * (data.rainbow_foot + data.rainbow_dir * data.rainbow_height),
            center_y: horizon,
            bands,
        }
    }

    fn band_at(&self, x: f64, y: f64) -> Option<Color> {
        if y > self.center_y {
            return None;
        }
        let distance = (x - self.center_x).hypot(y - self.center_y);
        self.bands
            .iter()
            .rev()
            .find(|(radius, half_width, _)| (distance - radius).abs() <= *half_width)
            .map(|&(_, _, color)| color)
    }
}

/// Two round puffs, a taller half-round middle and a flat bottom.
struct CloudShape {
    x: f64,
    y: f64,
    size: f64,
    middle: f64,
    color: Color,
}

impl CloudShape {
    fn new(cloud: &Cloud, fsize: f64, color: Color) -> Self {
        Self {
            x: fsize * cloud.x,
            y: fsize * cloud.y,
            size: fsize * cloud.size,
            middle: fsize * cloud.size * cloud.aspect,
            color,
        }
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        let s = self.size;
        let base = self.y - s;
        let in_circle = |cx: f64, cy: f64, r: f64| (x - cx).hypot(y - cy) <= r;

        in_circle(self.x - 2.0 * s, base, s)
            || in_circle(self.x + 2.0 * s, base, s)
            || (y <= base && in_circle(self.x, base, self.middle))
            || ((self.x - 2.0 * s..=self.x + 2.0 * s).contains(&x)
                && (base - 1.0..=self.y).contains(&y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unicornify_core::HueSat;

    fn data() -> BackgroundData {
        BackgroundData {
            sky: HueSat::new(200, 60),
            land: HueSat::new(100, 40),
            horizon: 0.6,
            rainbow_foot: 0.0,
            rainbow_dir: 1.0,
            rainbow_height: 0.5,
            rainbow_band_width: 0.02,
            land_light: 30,
            clouds: Vec::new(),
        }
    }

    #[test]
    fn test_sky_and_land() {
        let bg = data();
        let mut raster = Raster::new(100, 100, Color::BLACK);
        bg.paint(&mut raster);
        assert_eq!(raster.get(0, 0), bg.sky.color(60));
        assert_eq!(raster.get(0, 99), bg.land_color());
        assert_eq!(raster.get(99, 99), bg.land.color(15));
    }

    #[test]
    fn test_rainbow_band() {
        let bg = data();
        let mut raster = Raster::new(100, 100, Color::BLACK);
        bg.paint(&mut raster);
        let bands: Vec<Color> = (0..7).map(|b| Color::from_hsl(b * 45, 100, 50)).collect();
        // straight above the center, on the outer ring
        assert!(bands.contains(&raster.get(50, 12)));
        // well inside the innermost ring
        assert!(!bands.contains(&raster.get(50, 50)));
        // nothing below the horizon
        assert!(!bands.contains(&raster.get(50, 70)));
    }

    #[test]
    fn test_cloud() {
        let mut bg = data();
        bg.clouds.push(Cloud {
            x: 0.7,
            y: 0.3,
            size: 0.05,
            aspect: 1.5,
            lightness: 85,
        });
        let mut raster = Raster::new(100, 100, Color::BLACK);
        bg.paint(&mut raster);
        let cloud = bg.sky.color(85);
        assert_eq!(raster.get(69, 28), cloud);
        assert_ne!(raster.get(69, 5), cloud);
    }
}
