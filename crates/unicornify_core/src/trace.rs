//! Trace results and the depth-interval algebra behind CSG.
//!
//! A deep trace reports every depth range along a ray where the ray is
//! inside a solid. Difference and intersection of solids then reduce to
//! operations on sorted interval lists.

use unicornify_math::Vector;

use crate::Color;

/// Direction of a hit that carries no surface orientation.
pub const NO_DIRECTION: Vector = Vector::ZERO;

/// A single surface hit: depth along the ray, outward surface direction
/// (not necessarily normalized, may be zero) and surface color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceResult {
    pub z: f64,
    pub direction: Vector,
    pub color: Color,
}

impl TraceResult {
    pub fn new(z: f64, direction: Vector, color: Color) -> Self {
        Self {
            z,
            direction,
            color,
        }
    }

    /// Same hit seen from the other side.
    pub fn flipped(self) -> Self {
        Self {
            direction: -self.direction,
            ..self
        }
    }
}

/// Depth range where a ray is inside a solid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceInterval {
    pub start: TraceResult,
    pub end: TraceResult,
}

impl TraceInterval {
    pub fn new(start: TraceResult, end: TraceResult) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start.z >= self.end.z
    }

    /// Later entry and earlier exit of the two; `None` if nothing is left.
    pub fn intersect(&self, other: &TraceInterval) -> Option<TraceInterval> {
        let start = if other.start.z > self.start.z {
            other.start
        } else {
            self.start
        };
        let end = if other.end.z < self.end.z {
            other.end
        } else {
            self.end
        };
        let result = TraceInterval { start, end };
        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }
}

/// Sorted list of disjoint intervals along one ray.
///
/// Every operation keeps the list ascending by entry depth with no empty,
/// overlapping or touching neighbours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TraceIntervals(Vec<TraceInterval>);

impl TraceIntervals {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn single(interval: TraceInterval) -> Self {
        Self(vec![interval])
    }

    /// Wrap intervals that are already sorted and disjoint.
    pub fn from_sorted(intervals: Vec<TraceInterval>) -> Self {
        debug_assert!(intervals
            .windows(2)
            .all(|w| w[0].end.z <= w[1].start.z));
        Self(intervals)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn first(&self) -> Option<&TraceInterval> {
        self.0.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TraceInterval> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TraceInterval] {
        &self.0
    }

    /// Depth ranges covered by both lists.
    pub fn intersect(&self, other: &TraceIntervals) -> TraceIntervals {
        let (first, second) = (&self.0, &other.0);
        let mut result = Vec::new();
        let (mut i1, mut i2) = (0, 0);
        while i1 < first.len() && i2 < second.len() {
            if let Some(common) = first[i1].intersect(&second[i2]) {
                result.push(common);
            }
            // the interval that ends first cannot overlap anything further
            if first[i1].end.z < second[i2].end.z {
                i1 += 1;
            } else {
                i2 += 1;
            }
        }
        TraceIntervals(result)
    }

    /// Complement over the whole depth axis. Surface directions at every
    /// finite boundary are flipped, since inside and outside swap.
    pub fn invert(&self) -> TraceIntervals {
        let Some(first) = self.0.first() else {
            return TraceIntervals(vec![TraceInterval::new(
                TraceResult::new(f64::NEG_INFINITY, NO_DIRECTION, Color::BLACK),
                TraceResult::new(f64::INFINITY, NO_DIRECTION, Color::BLACK),
            )]);
        };

        let mut result = Vec::with_capacity(self.0.len() + 1);
        let mut prev = TraceResult::new(
            f64::NEG_INFINITY,
            first.start.direction,
            first.start.color,
        );
        for interval in &self.0 {
            let gap = TraceInterval::new(prev, interval.start.flipped());
            if !gap.is_empty() {
                result.push(gap);
            }
            prev = interval.end.flipped();
        }
        let tail = TraceInterval::new(
            prev,
            TraceResult::new(f64::INFINITY, -prev.direction, prev.color),
        );
        if !tail.is_empty() {
            result.push(tail);
        }
        TraceIntervals(result)
    }

    /// Depth ranges covered by `self` but not by `other`.
    pub fn difference(&self, other: &TraceIntervals) -> TraceIntervals {
        self.intersect(&other.invert())
    }

    /// Depth ranges covered by either list. Where both cover a range, the
    /// surfaces of `other` win.
    pub fn union(&self, other: &TraceIntervals) -> TraceIntervals {
        let rest = self.difference(other);
        let mut merged: Vec<TraceInterval> = Vec::with_capacity(rest.len() + other.len());
        let (mut i1, mut i2) = (0, 0);
        while i1 < rest.0.len() || i2 < other.0.len() {
            let take_rest = match (rest.0.get(i1), other.0.get(i2)) {
                (Some(a), Some(b)) => a.start.z <= b.start.z,
                (Some(_), None) => true,
                _ => false,
            };
            let next = if take_rest {
                i1 += 1;
                rest.0[i1 - 1]
            } else {
                i2 += 1;
                other.0[i2 - 1]
            };
            match merged.last_mut() {
                Some(last) if last.end.z >= next.start.z => {
                    if next.end.z > last.end.z {
                        last.end = next.end;
                    }
                }
                _ => merged.push(next),
            }
        }
        TraceIntervals(merged)
    }
}

impl From<TraceInterval> for TraceIntervals {
    fn from(interval: TraceInterval) -> Self {
        TraceIntervals::single(interval)
    }
}

impl<'a> IntoIterator for &'a TraceIntervals {
    type Item = &'a TraceInterval;
    type IntoIter = std::slice::Iter<'a, TraceInterval>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
