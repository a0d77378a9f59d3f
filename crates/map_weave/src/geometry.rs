//! Rectangles, adjacency rules, distance measures, and line drawing.
//!
//! These are the spatial primitives the generation steps build on. Positions
//! are [`glam::IVec2`] grid coordinates throughout.
use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Cardinal neighbor deltas: up, down, left, right.
pub const CARDINALS: [IVec2; 4] = [
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
];

/// Diagonal neighbor deltas.
pub const DIAGONALS: [IVec2; 4] = [
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

/// All eight neighbor deltas, cardinals first.
pub const EIGHT_WAY: [IVec2; 8] = [
    IVec2::new(0, -1),
    IVec2::new(0, 1),
    IVec2::new(-1, 0),
    IVec2::new(1, 0),
    IVec2::new(-1, -1),
    IVec2::new(1, -1),
    IVec2::new(-1, 1),
    IVec2::new(1, 1),
];

/// Neighborhood rule used by flood fills and neighbor scans.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjacency {
    /// 4-way: up/down/left/right.
    Cardinal,
    /// 8-way: cardinals plus diagonals.
    Eight,
}

impl Adjacency {
    /// Neighbor deltas for this rule.
    pub fn deltas(self) -> &'static [IVec2] {
        match self {
            Adjacency::Cardinal => &CARDINALS,
            Adjacency::Eight => &EIGHT_WAY,
        }
    }

    /// Positions adjacent to `pos` under this rule.
    pub fn neighbors(self, pos: IVec2) -> impl Iterator<Item = IVec2> {
        self.deltas().iter().map(move |d| pos + *d)
    }
}

/// Distance measure between two grid positions.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Distance {
    Manhattan,
    Chebyshev,
    Euclidean,
}

impl Distance {
    pub fn measure(self, a: IVec2, b: IVec2) -> f64 {
        let dx = (a.x - b.x).abs() as f64;
        let dy = (a.y - b.y).abs() as f64;
        match self {
            Distance::Manhattan => dx + dy,
            Distance::Chebyshev => dx.max(dy),
            Distance::Euclidean => (dx * dx + dy * dy).sqrt(),
        }
    }
}

/// An axis-aligned rectangle of grid cells.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top-left corner.
    pub fn min(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    /// Bottom-right corner, inclusive. Equals `min` for 1x1 rectangles.
    pub fn max(&self) -> IVec2 {
        IVec2::new(
            self.x + self.width as i32 - 1,
            self.y + self.height as i32 - 1,
        )
    }

    /// Center cell, rounded toward the top-left.
    pub fn center(&self) -> IVec2 {
        IVec2::new(
            self.x + (self.width as i32 - 1) / 2,
            self.y + (self.height as i32 - 1) / 2,
        )
    }

    pub fn area(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        !self.is_empty()
            && pos.x >= self.x
            && pos.y >= self.y
            && pos.x <= self.max().x
            && pos.y <= self.max().y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x <= other.max().x
            && other.x <= self.max().x
            && self.y <= other.max().y
            && other.y <= self.max().y
    }

    /// Grow by `amount` cells on every side. Negative amounts shrink; the
    /// result collapses to empty rather than inverting.
    pub fn expanded(&self, amount: i32) -> Rect {
        let new_w = self.width as i64 + 2 * amount as i64;
        let new_h = self.height as i64 + 2 * amount as i64;
        if new_w <= 0 || new_h <= 0 {
            return Rect::new(self.x, self.y, 0, 0);
        }
        Rect::new(
            self.x - amount,
            self.y - amount,
            new_w as u32,
            new_h as u32,
        )
    }

    /// The rectangle shrunk by one cell on every side.
    pub fn interior(&self) -> Rect {
        self.expanded(-1)
    }

    /// All cell positions, row by row.
    pub fn positions(&self) -> impl Iterator<Item = IVec2> {
        let rect = *self;
        (rect.y..rect.y + rect.height as i32).flat_map(move |y| {
            (rect.x..rect.x + rect.width as i32).map(move |x| IVec2::new(x, y))
        })
    }

    /// Positions along the outer edge.
    pub fn perimeter_positions(&self) -> impl Iterator<Item = IVec2> {
        let rect = *self;
        rect.positions().filter(move |p| {
            p.x == rect.x || p.y == rect.y || p.x == rect.max().x || p.y == rect.max().y
        })
    }
}

/// An orthogonal line between two positions: every step moves one cell in a
/// cardinal direction, so the result is walkable under 4-way adjacency.
pub fn orthogonal_line(a: IVec2, b: IVec2) -> Vec<IVec2> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    let sx = (b.x - a.x).signum();
    let sy = (b.y - a.y).signum();

    let mut out = Vec::with_capacity((dx + dy + 1) as usize);
    let mut pos = a;
    out.push(pos);

    let (mut ix, mut iy) = (0, 0);
    while ix < dx || iy < dy {
        // Advance the axis whose progress fraction is behind.
        if (1 + 2 * ix) * dy < (1 + 2 * iy) * dx {
            pos.x += sx;
            ix += 1;
        } else {
            pos.y += sy;
            iy += 1;
        }
        out.push(pos);
    }
    out
}
