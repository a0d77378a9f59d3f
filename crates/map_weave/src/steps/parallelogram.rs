//! Sheared rectangle carving.
use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::grid::{GridView, GridViewMut};
use crate::steps::tags;

/// Carves a parallelogram with horizontal top and bottom edges and sides
/// slanted one cell per row, recording the carved cells as an [`Area`] under
/// the areas tag. Runs in a single stage.
///
/// Cells outside the grid are clipped and not recorded.
pub struct ParallelogramCarve {
    pub name: String,
    pub wall_floor_tag: String,
    pub areas_tag: String,
    /// Top-left corner of the top edge.
    pub position: IVec2,
    /// Length of the horizontal edges.
    pub width: u32,
    /// Number of rows; each row shifts one cell to the right.
    pub height: u32,
}

impl Default for ParallelogramCarve {
    fn default() -> Self {
        Self {
            name: "ParallelogramCarve".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            areas_tag: tags::AREAS.into(),
            position: IVec2::new(1, 1),
            width: 5,
            height: 5,
        }
    }
}

impl ParallelogramCarve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, position: IVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: impl Into<String>) -> Self {
        self.wall_floor_tag = tag.into();
        self
    }

    pub fn with_areas_tag(mut self, tag: impl Into<String>) -> Self {
        self.areas_tag = tag.into();
        self
    }
}

impl GenerationStep for ParallelogramCarve {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "width",
                reason: "width and height must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        _rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let mut carved = Area::new();
        {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            for row in 0..self.height as i32 {
                let y = self.position.y + row;
                for column in 0..self.width as i32 {
                    let pos = IVec2::new(self.position.x + row + column, y);
                    if grid.contains(pos) {
                        grid.set(pos, true);
                        carved.add(pos);
                    }
                }
            }
        }
        ctx.components
            .get_first_or_new(Some(self.areas_tag.as_str()), ItemList::<Area>::new)
            .add(carved, &self.name);
        Ok(Progress::Complete)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generation::StepRunner;
    use crate::grid::{Grid, GridView};

    fn run(ctx: &mut GenerationContext, step: ParallelogramCarve) {
        let mut rng = StdRng::seed_from_u64(0);
        StepRunner::new(Box::new(step))
            .run_to_completion(ctx, &mut rng)
            .unwrap();
    }

    #[test]
    fn rows_shift_one_cell_per_line() {
        let mut ctx = GenerationContext::new(20, 20);
        run(
            &mut ctx,
            ParallelogramCarve::new()
                .with_position(IVec2::new(2, 3))
                .with_size(4, 3),
        );

        let grid = ctx
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert_eq!(grid.count(true), 12);
        assert!(grid.get(IVec2::new(2, 3)));
        assert!(grid.get(IVec2::new(5, 3)));
        assert!(!grid.get(IVec2::new(2, 4)));
        assert!(grid.get(IVec2::new(3, 4)));
        assert!(grid.get(IVec2::new(4, 5)));
        assert!(grid.get(IVec2::new(7, 5)));
    }

    #[test]
    fn records_only_in_bounds_cells() {
        let mut ctx = GenerationContext::new(8, 8);
        run(
            &mut ctx,
            ParallelogramCarve::new()
                .with_position(IVec2::new(5, 5))
                .with_size(4, 4),
        );
        let areas = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        let area = areas.get(0).unwrap();
        assert!(area.iter().all(|p| ctx.bounds().contains(p)));
        // Row 0 fits 3 cells, row 1 fits 2, row 2 fits 1, row 3 none.
        assert_eq!(area.len(), 6);
    }

    #[test]
    fn rejects_zero_size() {
        let mut ctx = GenerationContext::new(10, 10);
        let mut rng = StdRng::seed_from_u64(0);
        let mut runner =
            StepRunner::new(Box::new(ParallelogramCarve::new().with_size(0, 3)));
        let err = runner.advance(&mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }
}
