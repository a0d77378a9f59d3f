//! Cellular automata smoothing for cave-like maps.
use glam::IVec2;
use rand::RngCore;

use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::grid::{Grid, GridView, GridViewMut};
use crate::steps::tags;

/// Smooths a noisy wall-floor grid into organic caverns; one stage per
/// automaton iteration.
///
/// Each iteration recomputes every interior cell from a snapshot of the
/// previous grid. A cell becomes wall when at least five of the nine cells in
/// its 3x3 neighborhood (itself included) are wall. During the first
/// [`CellularAutomataSmooth::big_area_iterations`] iterations a cell also
/// becomes wall when its 5x5 neighborhood holds two or fewer walls, which
/// breaks up overly large open areas. Out-of-bounds cells count as wall; the
/// perimeter is left alone during the passes and forced to wall once the last
/// pass finishes.
///
/// Typically follows [`crate::steps::RandomFill`]; the result is usually
/// disconnected, so an area detection plus connection pass comes after.
pub struct CellularAutomataSmooth {
    pub name: String,
    pub wall_floor_tag: String,
    /// Total smoothing iterations.
    pub total_iterations: u32,
    /// How many of the leading iterations apply the 5x5 big-area rule.
    pub big_area_iterations: u32,
    iterations_run: u32,
}

impl Default for CellularAutomataSmooth {
    fn default() -> Self {
        Self {
            name: "CellularAutomataSmooth".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            total_iterations: 10,
            big_area_iterations: 4,
            iterations_run: 0,
        }
    }
}

impl CellularAutomataSmooth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: impl Into<String>) -> Self {
        self.wall_floor_tag = tag.into();
        self
    }

    pub fn with_total_iterations(mut self, iterations: u32) -> Self {
        self.total_iterations = iterations;
        self
    }

    pub fn with_big_area_iterations(mut self, iterations: u32) -> Self {
        self.big_area_iterations = iterations;
        self
    }
}

fn count_walls(snapshot: &Grid<bool>, center: IVec2, radius: i32) -> u32 {
    let mut walls = 0;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let pos = center + IVec2::new(dx, dy);
            if !snapshot.contains(pos) || !snapshot.get(pos) {
                walls += 1;
            }
        }
    }
    walls
}

impl GenerationStep for CellularAutomataSmooth {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.total_iterations == 0 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "total_iterations",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        _rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let big_area = self.iterations_run < self.big_area_iterations;
        let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
        let snapshot = Grid::from_view(grid);
        let (max_x, max_y) = (grid.width() as i32 - 1, grid.height() as i32 - 1);
        for pos in snapshot.positions() {
            if pos.x == 0 || pos.y == 0 || pos.x == max_x || pos.y == max_y {
                continue;
            }
            let wall = if big_area {
                count_walls(&snapshot, pos, 1) >= 5 || count_walls(&snapshot, pos, 2) <= 2
            } else {
                count_walls(&snapshot, pos, 1) >= 5
            };
            grid.set(pos, !wall);
        }

        self.iterations_run += 1;
        if self.iterations_run >= self.total_iterations {
            let bounds = ctx.bounds();
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            for pos in bounds.perimeter_positions() {
                grid.set(pos, false);
            }
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Yielded)
        }
    }
}
