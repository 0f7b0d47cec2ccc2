//! Screen rectangle a tracer tree gets pruned to.

use unicornify_math::{Bounds, Interval};

/// A screen-space rectangle; depth is implicitly the full range in front of
/// the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderingParameters {
    pub x: Interval,
    pub y: Interval,
}

impl RenderingParameters {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x: Interval::new(x_min, x_max),
            y: Interval::new(y_min, y_max),
        }
    }

    /// The whole screen plane. Pruning against it only drops things behind
    /// the camera.
    pub fn unbounded() -> Self {
        Self {
            x: Interval::UNIVERSE,
            y: Interval::UNIVERSE,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.x.min.is_infinite()
            || self.x.max.is_infinite()
            || self.y.min.is_infinite()
            || self.y.max.is_infinite()
    }

    /// The rectangle as seen by a source that gets magnified by `scale`.
    pub fn scaled(&self, scale: f64) -> Self {
        Self {
            x: self.x.scaled(1.0 / scale),
            y: self.y.scaled(1.0 / scale),
        }
    }

    /// The rectangle as seen by a source that gets shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x.add_scalar(-dx),
            y: self.y.add_scalar(-dy),
        }
    }

    pub fn padded(&self, margin: f64) -> Self {
        Self {
            x: self.x.padded(margin),
            y: self.y.padded(margin),
        }
    }

    /// True if the bounds overlap the rectangle and reach in front of the
    /// camera.
    pub fn contains(&self, bounds: &Bounds) -> bool {
        !bounds.is_empty()
            && bounds.x.overlaps(&self.x)
            && bounds.y.overlaps(&self.y)
            && bounds.z.max > 0.0
    }

    /// The rectangle as a bounds box spanning the given depth range.
    pub fn to_bounds(&self, z: Interval) -> Bounds {
        Bounds::new(self.x, self.y, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(x0: f64, x1: f64, y0: f64, y1: f64, z0: f64, z1: f64) -> Bounds {
        Bounds::new(
            Interval::new(x0, x1),
            Interval::new(y0, y1),
            Interval::new(z0, z1),
        )
    }

    #[test]
    fn test_contains_requires_overlap_and_positive_depth() {
        let rp = RenderingParameters::new(0.0, 10.0, 0.0, 10.0);
        assert!(rp.contains(&boxed(5.0, 15.0, -5.0, 0.0, 1.0, 2.0)));
        assert!(!rp.contains(&boxed(10.5, 15.0, 0.0, 5.0, 1.0, 2.0)));
        assert!(!rp.contains(&boxed(0.0, 5.0, 0.0, 5.0, -3.0, 0.0)));
        assert!(!rp.contains(&Bounds::EMPTY));
    }

    #[test]
    fn test_scaled_and_translated() {
        let rp = RenderingParameters::new(0.0, 100.0, 20.0, 40.0);
        assert_eq!(rp.scaled(2.0), RenderingParameters::new(0.0, 50.0, 10.0, 20.0));
        assert_eq!(
            rp.translated(5.0, -5.0),
            RenderingParameters::new(-5.0, 95.0, 25.0, 45.0)
        );
    }

    #[test]
    fn test_unbounded() {
        let rp = RenderingParameters::unbounded();
        assert!(rp.is_unbounded());
        assert!(rp.contains(&boxed(-1e9, -1e9 + 1.0, 1e9, 1e9 + 1.0, 0.0, 1.0)));
        assert!(!RenderingParameters::new(0.0, 1.0, 0.0, 1.0).is_unbounded());
    }
}
