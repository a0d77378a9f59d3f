//! Region abstraction: a set of grid positions with a bounding rectangle.
use std::collections::HashSet;

use glam::IVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// A set of grid positions treated as one region (a room, a tunnel, a
/// detected connected component). Positions keep insertion order; duplicates
/// are ignored. The bounding rectangle is maintained incrementally.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct Area {
    positions: Vec<IVec2>,
    lookup: HashSet<IVec2>,
    extent: Option<(IVec2, IVec2)>,
}

impl Area {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: impl IntoIterator<Item = IVec2>) -> Self {
        let mut area = Self::new();
        for pos in positions {
            area.add(pos);
        }
        area
    }

    /// Add a position. Returns false if it was already present.
    pub fn add(&mut self, pos: IVec2) -> bool {
        if !self.lookup.insert(pos) {
            return false;
        }
        self.positions.push(pos);
        self.extent = Some(match self.extent {
            None => (pos, pos),
            Some((min, max)) => (min.min(pos), max.max(pos)),
        });
        true
    }

    /// Remove a position. Returns false if it was not present. Recomputes the
    /// bounding rectangle from the remaining positions.
    pub fn remove(&mut self, pos: IVec2) -> bool {
        if !self.lookup.remove(&pos) {
            return false;
        }
        self.positions.retain(|p| *p != pos);
        self.extent = self
            .positions
            .iter()
            .fold(None, |acc: Option<(IVec2, IVec2)>, p| match acc {
                None => Some((*p, *p)),
                Some((min, max)) => Some((min.min(*p), max.max(*p))),
            });
        true
    }

    /// Absorb every position of `other`.
    pub fn merge(&mut self, other: &Area) {
        for pos in other.iter() {
            self.add(pos);
        }
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        self.lookup.contains(&pos)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.positions.iter().copied()
    }

    /// Bounding rectangle, or `None` for an empty area.
    pub fn bounds(&self) -> Option<Rect> {
        self.extent.map(|(min, max)| {
            Rect::new(
                min.x,
                min.y,
                (max.x - min.x + 1) as u32,
                (max.y - min.y + 1) as u32,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_ignores_duplicates() {
        let mut area = Area::new();
        assert!(area.add(IVec2::new(1, 1)));
        assert!(!area.add(IVec2::new(1, 1)));
        assert_eq!(area.len(), 1);
    }

    #[test]
    fn bounds_track_extremes() {
        let area = Area::from_positions([
            IVec2::new(3, 4),
            IVec2::new(1, 7),
            IVec2::new(5, 2),
        ]);
        let bounds = area.bounds().unwrap();
        assert_eq!(bounds, Rect::new(1, 2, 5, 6));
    }

    #[test]
    fn empty_area_has_no_bounds() {
        assert!(Area::new().bounds().is_none());
    }

    #[test]
    fn remove_recomputes_bounds() {
        let mut area = Area::from_positions([IVec2::new(0, 0), IVec2::new(9, 9)]);
        assert!(area.remove(IVec2::new(9, 9)));
        assert_eq!(area.bounds().unwrap(), Rect::new(0, 0, 1, 1));
        assert!(!area.remove(IVec2::new(9, 9)));
    }

    #[test]
    fn merge_unions_positions() {
        let mut a = Area::from_positions([IVec2::new(0, 0), IVec2::new(1, 0)]);
        let b = Area::from_positions([IVec2::new(1, 0), IVec2::new(2, 0)]);
        a.merge(&b);
        assert_eq!(a.len(), 3);
        assert!(a.contains(IVec2::new(2, 0)));
    }
}
