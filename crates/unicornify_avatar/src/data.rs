//! Seeded parameter sets for the unicorn, the background and the grass.
//!
//! Draws are split into numbered stages that `make_avatar` interleaves in
//! a fixed order. New draws only ever go into a new stage at the end, so
//! existing seeds keep producing the same pictures.

use serde::Serialize;
use unicornify_core::{Color, HueSat};
use unicornify_math::DEGREE;

use crate::pose::Pose;
use crate::seed::SeedRandom;

/// One strand of the mane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Hair {
    /// Root position along the neck, in percent from head to shoulder.
    pub start: f64,
    pub gamma: f64,
    pub length: f64,
    /// Upward angle in radians.
    pub angle: f64,
    /// Sideways offset of the tip.
    pub straightness: f64,
    pub tip_lightness: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnicornData {
    pub body: HueSat,
    pub horn: HueSat,
    pub hair: HueSat,
    pub head_size: f64,
    pub snout_size: f64,
    pub snout_length: f64,
    pub shoulder_size: f64,
    pub butt_size: f64,
    pub horn_onset_size: f64,
    pub horn_tip_size: f64,
    pub horn_length: f64,
    /// 0 is straight ahead, positive is upwards.
    pub horn_angle: f64,
    pub eye_size: f64,
    pub pupil_size: f64,
    pub hairs: Vec<Hair>,
    pub tail_start_size: f64,
    pub tail_end_size: f64,
    pub tail_length: f64,
    pub tail_angle: f64,
    pub tail_gamma: f64,
    pub brow_size: f64,
    pub brow_length: f64,
    /// From -1 (angry) to 1 (astonished).
    pub brow_mood: f64,
    pub ear_length: f64,
    pub pose: Pose,
    pub pose_phase: f64,
    pub neck_tilt: f64,
    pub face_tilt: f64,
}

impl Default for UnicornData {
    fn default() -> Self {
        Self {
            body: HueSat::new(0, 0),
            horn: HueSat::new(0, 0),
            hair: HueSat::new(0, 0),
            head_size: 30.0,
            snout_size: 15.0,
            snout_length: 90.0,
            shoulder_size: 50.0,
            butt_size: 45.0,
            horn_onset_size: 9.0,
            horn_tip_size: 4.0,
            horn_length: 75.0,
            horn_angle: 30.0 * DEGREE,
            eye_size: 10.0,
            pupil_size: 3.0,
            hairs: Vec::new(),
            tail_start_size: 7.0,
            tail_end_size: 15.0,
            tail_length: 125.0,
            tail_angle: 10.0 * DEGREE,
            tail_gamma: 2.0,
            brow_size: 3.0,
            brow_length: 3.0,
            brow_mood: 0.0,
            ear_length: 30.0,
            pose: Pose::RotatoryGallop,
            pose_phase: 0.0,
            neck_tilt: 0.0,
            face_tilt: 0.0,
        }
    }
}

impl UnicornData {
    /// Colors, body proportions and the hair count; roots and shapes of
    /// the first half of the mane.
    pub fn randomize1(&mut self, rand: &mut SeedRandom) {
        let body_hue = rand.rand_int(0, 359);
        self.body = HueSat::new(body_hue, rand.rand_int(50, 100));
        self.horn = HueSat::new(
            (body_hue + rand.rand_int(60, 300)) % 360,
            rand.rand_int(50, 100),
        );
        self.snout_size = f64::from(rand.rand_int(8, 30));
        self.snout_length = f64::from(rand.rand_int(70, 110));
        self.head_size = f64::from(rand.rand_int(25, 40));
        self.shoulder_size = f64::from(rand.rand_int(40, 60));
        self.butt_size = f64::from(rand.rand_int(30, 60));
        self.horn_onset_size = f64::from(rand.rand_int(6, 12));
        self.horn_tip_size = f64::from(rand.rand_int(3, 6));
        self.horn_length = f64::from(rand.rand_int(50, 100));
        self.horn_angle = f64::from(rand.rand_int(10, 60)) * DEGREE;
        self.eye_size = f64::from(rand.rand_int(8, 12));
        self.pupil_size = f64::from(rand.rand_int(2, 5));
        self.hair = HueSat::new(
            (body_hue + rand.rand_int(60, 300)) % 360,
            rand.rand_int(60, 100),
        );

        let hair_count = rand.rand_int(12, 30) as usize * 2;
        self.hairs = vec![Hair::default(); hair_count];
        self.make_hair_shapes(rand, 0, hair_count / 2);
    }

    /// Looks of the first half of the mane, tail, brows and head tilts.
    pub fn randomize2(&mut self, rand: &mut SeedRandom) {
        let half = self.hairs.len() / 2;
        self.make_hair_looks(rand, 0, half);

        self.tail_start_size = f64::from(rand.rand_int(4, 10));
        self.tail_end_size = f64::from(rand.rand_int(10, 20));
        self.tail_length = f64::from(rand.rand_int(100, 150));
        self.tail_angle = f64::from(rand.rand_int(-20, 45)) * DEGREE;
        self.tail_gamma = 0.1 + rand.random() * 6.0;
        self.brow_size = f64::from(rand.rand_int(2, 4));
        self.brow_length = 2.0 + rand.random() * 3.0;
        self.brow_mood = 2.0 * rand.random() - 1.0;

        let neck_tilt = rand.rand_int(-30, 30);
        self.neck_tilt = f64::from(neck_tilt) * DEGREE;
        let (a, b) = (neck_tilt / 3, neck_tilt / 4);
        self.face_tilt = f64::from(rand.rand_int(a.min(b), a.max(b))) * DEGREE;
    }

    pub fn randomize3(&mut self, rand: &mut SeedRandom) {
        self.pose = Pose::ALL[rand.choice(Pose::ALL.len())];
        self.pose_phase = rand.random();
    }

    /// Second half of the mane and the ears.
    pub fn randomize4(&mut self, rand: &mut SeedRandom) {
        let half = self.hairs.len() / 2;
        self.make_hair_shapes(rand, half, half);
        self.make_hair_looks(rand, half, half);
        self.ear_length = f64::from(rand.rand_int(20, 40));
    }

    fn make_hair_shapes(&mut self, rand: &mut SeedRandom, start: usize, count: usize) {
        let hairs = &mut self.hairs[start..start + count];
        for hair in hairs.iter_mut() {
            hair.start = f64::from(rand.rand_int(-20, 100));
        }
        for hair in hairs.iter_mut() {
            hair.gamma = 0.3 + rand.random() * 3.0;
        }
        for hair in hairs.iter_mut() {
            hair.length = f64::from(rand.rand_int(80, 150));
        }
        for hair in hairs.iter_mut() {
            hair.angle = f64::from(rand.rand_int(0, 60)) * DEGREE;
        }
    }

    fn make_hair_looks(&mut self, rand: &mut SeedRandom, start: usize, count: usize) {
        let hairs = &mut self.hairs[start..start + count];
        for hair in hairs.iter_mut() {
            hair.tip_lightness = rand.rand_int(40, 85);
        }
        for hair in hairs.iter_mut() {
            hair.straightness = f64::from(rand.rand_int(-40, 40));
        }
    }
}

/// A cloud: position and size relative to the image, lightness of its
/// sky-colored fill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cloud {
    pub x: f64,
    pub y: f64,
    /// Radius of the two side puffs.
    pub size: f64,
    /// Radius of the middle puff relative to `size`.
    pub aspect: f64,
    pub lightness: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackgroundData {
    pub sky: HueSat,
    pub land: HueSat,
    /// Fraction of the image height covered by sky.
    pub horizon: f64,
    pub rainbow_foot: f64,
    /// +1 or -1.
    pub rainbow_dir: f64,
    pub rainbow_height: f64,
    pub rainbow_band_width: f64,
    pub land_light: i32,
    pub clouds: Vec<Cloud>,
}

impl Default for BackgroundData {
    fn default() -> Self {
        Self {
            sky: HueSat::new(200, 50),
            land: HueSat::new(100, 40),
            horizon: 0.6,
            rainbow_foot: 0.5,
            rainbow_dir: 1.0,
            rainbow_height: 1.0,
            rainbow_band_width: 0.02,
            land_light: 35,
            clouds: Vec::new(),
        }
    }
}

impl BackgroundData {
    pub fn randomize1(&mut self, rand: &mut SeedRandom) {
        self.sky = HueSat::new(rand.rand_int(0, 359), rand.rand_int(30, 70));
        self.land = HueSat::new(rand.rand_int(0, 359), rand.rand_int(20, 60));
        self.horizon = 0.5 + rand.random() * 0.2;
        self.rainbow_foot = 0.2 + rand.random() * 0.6;
        self.rainbow_dir = (rand.choice(2) * 2) as f64 - 1.0;
        self.rainbow_height = 0.5 + rand.random() * 1.5;
        self.rainbow_band_width = 0.01 + rand.random() * 0.02;
        self.land_light = rand.rand_int(20, 50);
    }

    pub fn randomize2(&mut self, rand: &mut SeedRandom) {
        let count = rand.rand_int(1, 3) as usize;
        let positions: Vec<(f64, f64)> = (0..count)
            .map(|_| (rand.random(), (0.3 + rand.random() * 0.6) * self.horizon))
            .collect();
        let sizes: Vec<(f64, f64)> = (0..count)
            .map(|_| (rand.random() * 0.04 + 0.02, rand.random() * 0.7 + 1.3))
            .collect();
        self.clouds = positions
            .into_iter()
            .zip(sizes)
            .map(|((x, y), (size, aspect))| Cloud {
                x,
                y,
                size,
                aspect,
                lightness: rand.rand_int(75, 90),
            })
            .collect();
    }

    pub fn land_color(&self) -> Color {
        self.land.color(self.land_light)
    }
}

/// Per-seed grass parameters. Blade cells are hashed from `seed` and
/// `row_seed_add`, so the same seed always grows the same lawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GrassData {
    pub seed: u32,
    pub row_seed_add: u32,
    /// Sideways lean of the blades, -0.8 to 0.8.
    pub wind: f64,
    pub color1: Color,
    pub color2: Color,
    /// Blade cells along each edge of the lawn.
    pub cells: u32,
}

impl Default for GrassData {
    fn default() -> Self {
        Self {
            seed: 0,
            row_seed_add: 0,
            wind: 0.0,
            color1: Color::new(40, 120, 40),
            color2: Color::new(80, 160, 60),
            cells: 400,
        }
    }
}

impl GrassData {
    pub fn randomize(&mut self, rand: &mut SeedRandom) {
        self.seed = rand.bits();
        self.row_seed_add = rand.bits();
        self.wind = 1.6 * rand.random() - 0.8;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_unicorn(seed: &str) -> UnicornData {
        let mut rand = SeedRandom::from_hex(seed).unwrap();
        let mut data = UnicornData::default();
        data.randomize1(&mut rand);
        data.randomize2(&mut rand);
        data.randomize3(&mut rand);
        data.randomize4(&mut rand);
        data
    }

    #[test]
    fn test_unicorn_ranges() {
        let data = full_unicorn("deadbeef");
        assert!((25.0..=40.0).contains(&data.head_size));
        assert!(data.hairs.len() % 2 == 0 && (24..=60).contains(&data.hairs.len()));
        assert!(data.hairs.iter().all(|h| h.length >= 80.0 && h.tip_lightness >= 40));
        assert_ne!(data.horn.hue, data.body.hue);
        assert!(data.face_tilt.abs() <= data.neck_tilt.abs() + 1e-12);
        assert!((20.0..=40.0).contains(&data.ear_length));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(full_unicorn("0123abcd"), full_unicorn("0123ABCD"));
        assert_ne!(full_unicorn("0123abcd"), full_unicorn("0123abce"));
    }

    #[test]
    fn test_background_clouds() {
        let mut rand = SeedRandom::from_hex("42").unwrap();
        let mut bg = BackgroundData::default();
        bg.randomize1(&mut rand);
        bg.randomize2(&mut rand);
        assert!((1..=3).contains(&bg.clouds.len()));
        assert!(bg.clouds.iter().all(|c| c.y < bg.horizon));
        assert!(bg.rainbow_dir == 1.0 || bg.rainbow_dir == -1.0);
    }

    #[test]
    fn test_serializes() {
        let json = serde_json::to_value(full_unicorn("ff")).unwrap();
        assert!(json["hairs"].is_array());
        assert!(json["pose"].is_string());
    }
}
