//! Generation context: map dimensions plus the shared component store.
pub mod items;
pub mod store;

use crate::geometry::Rect;
use crate::grid::{grid_caster, Grid, GridViewMut};
use store::ComponentStore;

/// Shared mutable state passed through a generation run. Width and height are
/// fixed at creation; every component added is expected to apply to a grid of
/// that size (steps are responsible for keeping this consistent).
pub struct GenerationContext {
    width: u32,
    height: u32,
    /// The component blackboard steps read from and write to.
    pub components: ComponentStore,
}

impl GenerationContext {
    pub fn new(width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "context dimensions must be > 0");
        Self {
            width,
            height,
            components: ComponentStore::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The full map rectangle at origin (0, 0).
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    /// The boolean passability grid under `tag`, created as an all-wall
    /// [`Grid`] of the context's size if absent. Carving steps call this
    /// instead of requiring the grid, so they compose in any order.
    pub fn wall_floor_or_new(&mut self, tag: &str) -> &mut dyn GridViewMut<bool> {
        let (width, height) = (self.width, self.height);
        self.components.view_or_new::<Grid<bool>, dyn GridViewMut<bool>>(
            Some(tag),
            move || Grid::new(width, height),
            grid_caster::<bool>(),
        )
    }
}

#[cfg(test)]
mod tests {
    use glam::IVec2;

    use super::*;
    use crate::grid::GridView;

    #[test]
    fn dimensions_are_fixed_at_creation() {
        let ctx = GenerationContext::new(40, 30);
        assert_eq!(ctx.width(), 40);
        assert_eq!(ctx.height(), 30);
        assert_eq!(ctx.bounds(), Rect::new(0, 0, 40, 30));
    }

    #[test]
    fn wall_floor_or_new_creates_all_wall_grid_once() {
        let mut ctx = GenerationContext::new(10, 10);
        {
            let grid = ctx.wall_floor_or_new("WallFloor");
            assert_eq!(grid.width(), 10);
            assert!(!grid.get(IVec2::new(5, 5)));
            grid.set(IVec2::new(5, 5), true);
        }
        let grid = ctx.wall_floor_or_new("WallFloor");
        assert!(grid.get(IVec2::new(5, 5)));
        assert_eq!(ctx.components.len(), 1);
    }
}
