use crate::{Interval, Vector};

/// Screen-space bounding box of a tracer: x and y in pixels, z as depth
/// (distance from the camera).
///
/// A box is empty as soon as one of its axes is; every empty box behaves
/// like [`Bounds::EMPTY`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Bounds {
    /// The empty box. Neutral for [`Bounds::union`], absorbing for
    /// [`Bounds::intersect`].
    pub const EMPTY: Bounds = Bounds {
        x: Interval::EMPTY,
        y: Interval::EMPTY,
        z: Interval::EMPTY,
    };

    /// Create a box from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        Self { x, y, z }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty() || self.y.is_empty() || self.z.is_empty()
    }

    /// Smallest box containing both. Empty operands are ignored.
    pub fn union(&self, other: &Bounds) -> Bounds {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        Bounds {
            x: Interval::surrounding(&self.x, &other.x),
            y: Interval::surrounding(&self.y, &other.y),
            z: Interval::surrounding(&self.z, &other.z),
        }
    }

    /// Common part of both boxes, or [`Bounds::EMPTY`] if they are disjoint.
    pub fn intersect(&self, other: &Bounds) -> Bounds {
        if self.is_empty() || other.is_empty() {
            return Bounds::EMPTY;
        }
        let result = Bounds {
            x: Interval::intersection(&self.x, &other.x),
            y: Interval::intersection(&self.y, &other.y),
            z: Interval::intersection(&self.z, &other.z),
        };
        if result.is_empty() {
            Bounds::EMPTY
        } else {
            result
        }
    }

    /// True if the screen position lies within the x/y extent.
    pub fn contains_xy(&self, x: f64, y: f64) -> bool {
        !self.is_empty() && self.x.contains(x) && self.y.contains(y)
    }

    /// True if something inside the box could be closer than depth `z`.
    pub fn contains_points_in_front_of(&self, z: f64) -> bool {
        !self.is_empty() && z > self.z.min
    }

    pub fn dx(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.x.size()
        }
    }

    pub fn dy(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.y.size()
        }
    }

    /// Center of the box, or the origin for an empty box.
    pub fn mid_point(&self) -> Vector {
        if self.is_empty() {
            return Vector::ZERO;
        }
        Vector::new(
            (self.x.min + self.x.max) / 2.0,
            (self.y.min + self.y.max) / 2.0,
            (self.z.min + self.z.max) / 2.0,
        )
    }

    /// Shift the screen extent, keeping depth.
    pub fn translated(&self, dx: f64, dy: f64) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds {
            x: self.x.add_scalar(dx),
            y: self.y.add_scalar(dy),
            z: self.z,
        }
    }

    /// Scale the screen extent by a positive factor, keeping depth.
    pub fn scaled_xy(&self, factor: f64) -> Bounds {
        if self.is_empty() {
            return *self;
        }
        Bounds {
            x: self.x.scaled(factor),
            y: self.y.scaled(factor),
            z: self.z,
        }
    }

    /// Smallest pixel rectangle covering the screen extent.
    pub fn to_pixel_rect(&self) -> PixelRect {
        if self.is_empty() {
            return PixelRect::EMPTY;
        }
        PixelRect::new(
            round_down(self.x.min),
            round_down(self.y.min),
            round_up(self.x.max),
            round_up(self.y.max),
        )
    }
}

fn round_down(v: f64) -> i64 {
    v.floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64
}

fn round_up(v: f64) -> i64 {
    v.ceil().clamp(i64::MIN as f64, i64::MAX as f64) as i64
}

/// Inclusive integer pixel rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PixelRect {
    pub x_min: i64,
    pub y_min: i64,
    pub x_max: i64,
    pub y_max: i64,
}

impl PixelRect {
    pub const EMPTY: PixelRect = PixelRect {
        x_min: 0,
        y_min: 0,
        x_max: -1,
        y_max: -1,
    };

    pub fn new(x_min: i64, y_min: i64, x_max: i64, y_max: i64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x_min > self.x_max || self.y_min > self.y_max
    }

    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let result = PixelRect::new(
            self.x_min.max(other.x_min),
            self.y_min.max(other.y_min),
            self.x_max.min(other.x_max),
            self.y_max.min(other.y_max),
        );
        if result.is_empty() {
            PixelRect::EMPTY
        } else {
            result
        }
    }

    pub fn width(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.x_max - self.x_min + 1) as u64
        }
    }

    pub fn height(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.y_max - self.y_min + 1) as u64
        }
    }
}
