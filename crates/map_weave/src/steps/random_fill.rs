//! Random floor fill, typically the seed pass for cellular-automata caves.
use rand::RngCore;

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::grid::{GridView, GridViewMut};
use crate::rng;
use crate::steps::tags;

/// Sets each cell of the wall-floor grid to floor with a configured
/// probability. Runs in a single stage.
pub struct RandomFill {
    pub name: String,
    pub wall_floor_tag: String,
    /// Chance, out of 100, for each cell to become floor.
    pub fill_percent: u32,
    /// Leave the outer border untouched (wall) when set.
    pub exclude_perimeter: bool,
}

impl Default for RandomFill {
    fn default() -> Self {
        Self {
            name: "RandomFill".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            fill_percent: 40,
            exclude_perimeter: true,
        }
    }
}

impl RandomFill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_fill_percent(mut self, fill_percent: u32) -> Self {
        self.fill_percent = fill_percent;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: impl Into<String>) -> Self {
        self.wall_floor_tag = tag.into();
        self
    }

    pub fn with_exclude_perimeter(mut self, exclude: bool) -> Self {
        self.exclude_perimeter = exclude;
        self
    }
}

impl GenerationStep for RandomFill {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.fill_percent > 100 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "fill_percent",
                reason: format!("must be in [0, 100], got {}", self.fill_percent),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let exclude = self.exclude_perimeter;
        let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
        let (max_x, max_y) = (grid.width() as i32 - 1, grid.height() as i32 - 1);
        for pos in grid.positions() {
            if exclude && (pos.x == 0 || pos.y == 0 || pos.x == max_x || pos.y == max_y) {
                continue;
            }
            if rng::percent_check(rng_source, self.fill_percent) {
                grid.set(pos, true);
            }
        }
        Ok(Progress::Complete)
    }
}
