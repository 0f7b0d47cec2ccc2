//! Procedural lawn: a sandwich fill that grows one blade per cell.
//!
//! The lawn is a slab between the ground plane (height 0) and a parallel
//! plane at blade height (height 1). Plane coordinates `(u, v)` in `[0, 1]`
//! are split into `cells × cells` cells; each cell's blade is derived from
//! a hash of the cell position, so no per-blade state is stored.

use unicornify_core::{
    Color, PlaneHit, SandwichFill, TraceInterval, TraceIntervals, TraceResult, NO_DIRECTION,
};

use crate::data::GrassData;

/// One blade, in cell units relative to the cell's corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blade {
    pub x: f64,
    pub y: f64,
    /// Fraction of the slab height.
    pub height: f64,
    /// Half width at the root; blades taper to a point.
    pub half_width: f64,
    /// Sideways drift of the tip, per unit of height.
    pub lean: f64,
    pub color: Color,
}

#[derive(Debug, Clone)]
pub struct GrassFill {
    data: GrassData,
    ground: Color,
}

impl GrassFill {
    /// `ground` shows wherever a ray reaches the bottom plane without
    /// touching a blade.
    pub fn new(data: GrassData, ground: Color) -> Self {
        Self { data, ground }
    }

    /// The blade growing in cell `(i, j)`.
    pub fn blade(&self, i: u32, j: u32) -> Blade {
        let mut state = self
            .data
            .seed
            .wrapping_add(j.wrapping_mul(self.data.row_seed_add))
            ^ i.wrapping_mul(0x9e37_79b9);
        let mut next = || {
            state = mix32(state);
            f64::from(state >> 8) / f64::from(1u32 << 24)
        };
        Blade {
            x: 0.3 + next() * 0.4,
            y: 0.3 + next() * 0.4,
            height: 0.6 + next() * 0.4,
            half_width: 0.08 + next() * 0.08,
            lean: self.data.wind * 0.3 + next() * 0.06 - 0.03,
            color: self.data.color1.mix(self.data.color2, next()),
        }
    }

    fn cells(&self) -> f64 {
        f64::from(self.data.cells.max(1))
    }
}

/// Avalanche step of a 32-bit integer hash.
fn mix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Ray segment through the slab in cell units, parameterized by `s` from
/// the top plane (`s = 0`, height 1) to the bottom plane (`s = 1`,
/// height 0).
#[derive(Debug, Clone, Copy)]
struct Segment {
    u0: f64,
    du: f64,
    v0: f64,
    dv: f64,
}

impl Segment {
    fn new(top: &PlaneHit, bottom: &PlaneHit, cells: f64) -> Self {
        Self {
            u0: top.u * cells,
            du: (bottom.u - top.u) * cells,
            v0: top.v * cells,
            dv: (bottom.v - top.v) * cells,
        }
    }

    fn at(&self, s: f64) -> (f64, f64) {
        (self.u0 + self.du * s, self.v0 + self.dv * s)
    }
}

/// Narrows `[lo, hi]` to the `s` satisfying `c + d * s <= 0`.
fn clip(range: (f64, f64), c: f64, d: f64) -> (f64, f64) {
    let (lo, hi) = range;
    if d.abs() < 1e-12 {
        return if c > 0.0 { (1.0, 0.0) } else { range };
    }
    let root = -c / d;
    if d > 0.0 {
        (lo, hi.min(root))
    } else {
        (lo.max(root), hi)
    }
}

impl GrassFill {
    /// Nearest `s` in `range` where the segment is inside the blade of cell
    /// `(i, j)`. Height, offsets and the tapered half width are all linear
    /// in `s`, so every side of the blade is one linear inequality.
    fn hit_blade(&self, seg: &Segment, i: u32, j: u32, range: (f64, f64)) -> Option<(f64, Blade)> {
        let blade = self.blade(i, j);
        let (fi, fj) = (f64::from(i), f64::from(j));

        // height h = 1 - s must not exceed the blade
        let mut range = clip(range, 1.0 - blade.height, -1.0);
        // half width w(s) = hw * (1 - (1 - s) / bh) = w0 + w1 * s
        let w1 = blade.half_width / blade.height;
        let w0 = blade.half_width - w1;
        // du(s) = u(s) - i - x - lean * (1 - s)
        let a0 = seg.u0 - fi - blade.x - blade.lean;
        let a1 = seg.du + blade.lean;
        let b0 = seg.v0 - fj - blade.y;
        let b1 = seg.dv;

        range = clip(range, a0 - w0, a1 - w1);
        range = clip(range, -a0 - w0, -a1 - w1);
        range = clip(range, b0 - w0, b1 - w1);
        range = clip(range, -b0 - w0, -b1 - w1);
        (range.0 <= range.1).then_some((range.0, blade))
    }

    /// Walk the cells the segment crosses in order and return the first
    /// blade hit.
    fn first_blade(&self, seg: &Segment) -> Option<(f64, Blade)> {
        let cells = self.cells();
        let last = self.data.cells.max(1) - 1;

        // part of the segment above the lawn
        let mut range = (0.0, 1.0);
        range = clip(range, -seg.u0, -seg.du);
        range = clip(range, seg.u0 - cells, seg.du);
        range = clip(range, -seg.v0, -seg.dv);
        range = clip(range, seg.v0 - cells, seg.dv);
        let (mut s, end) = range;
        if s > end {
            return None;
        }

        let (u, v) = seg.at(s);
        let mut i = (u.floor().max(0.0) as u32).min(last);
        let mut j = (v.floor().max(0.0) as u32).min(last);
        let step_u = if seg.du > 0.0 { 1 } else { -1 };
        let step_v = if seg.dv > 0.0 { 1 } else { -1 };

        loop {
            let exit = |cell: u32, origin: f64, delta: f64| {
                if delta > 0.0 {
                    (f64::from(cell) + 1.0 - origin) / delta
                } else if delta < 0.0 {
                    (f64::from(cell) - origin) / delta
                } else {
                    f64::INFINITY
                }
            };
            let exit_u = exit(i, seg.u0, seg.du);
            let exit_v = exit(j, seg.v0, seg.dv);
            let next = exit_u.min(exit_v).min(end);

            if let Some(hit) = self.hit_blade(seg, i, j, (s, next)) {
                return Some(hit);
            }
            if next >= end {
                return None;
            }
            if exit_u <= exit_v {
                i = i.checked_add_signed(step_u).filter(|&i| i <= last)?;
            }
            if exit_v <= exit_u {
                j = j.checked_add_signed(step_v).filter(|&j| j <= last)?;
            }
            s = next;
        }
    }
}

impl SandwichFill for GrassFill {
    fn fill(
        &self,
        _x: f64,
        _y: f64,
        bottom: Option<PlaneHit>,
        top: Option<PlaneHit>,
    ) -> Option<TraceIntervals> {
        let (bottom, top) = (bottom?, top?);
        let segment = Segment::new(&top, &bottom, self.cells());

        if let Some((s, blade)) = self.first_blade(&segment) {
            let z = top.z + (bottom.z - top.z) * s;
            let height = 1.0 - s;
            // tips catch more light than roots
            let color = blade.color.lighten((height / blade.height * 40.0) as u8);
            return Some(TraceIntervals::single(TraceInterval::new(
                TraceResult::new(z, NO_DIRECTION, color),
                TraceResult::new(bottom.z.max(z), NO_DIRECTION, color),
            )));
        }

        let inside = (0.0..=1.0).contains(&bottom.u) && (0.0..=1.0).contains(&bottom.v);
        if !inside {
            return None;
        }
        Some(TraceIntervals::single(TraceInterval::new(
            TraceResult::new(bottom.z, NO_DIRECTION, self.ground),
            TraceResult::new(f64::INFINITY, NO_DIRECTION, self.ground),
        )))
    }
}
