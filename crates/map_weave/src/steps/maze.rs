//! Maze carving via backtracking crawlers on the odd lattice.
use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::geometry::{CARDINALS, EIGHT_WAY};
use crate::grid::{GridView, GridViewMut};
use crate::rng;
use crate::steps::tags;

/// Fills all unclaimed wall space with winding corridors.
///
/// Each stage runs one crawler: it starts on a fully walled-in odd-lattice
/// cell, tunnels in two-cell jumps so corridors keep one-cell walls between
/// them, and backtracks when boxed in. A crawler's preference for going
/// straight decays per move, so corridors wind more the longer they run. The
/// step completes once no walled-in odd cell remains; each crawler's corridor
/// is recorded as an [`Area`] under the tunnels tag.
///
/// Usually run after room placement and before dead end trimming.
pub struct MazeCarve {
    pub name: String,
    pub wall_floor_tag: String,
    pub tunnels_tag: String,
    /// Percent added to the direction-change chance on each crawler move.
    pub change_direction_improvement: u32,
}

impl Default for MazeCarve {
    fn default() -> Self {
        Self {
            name: "MazeCarve".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            tunnels_tag: tags::TUNNELS.into(),
            change_direction_improvement: 10,
        }
    }
}

impl MazeCarve {
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

    pub fn with_tunnels_tag(mut self, tag: impl Into<String>) -> Self {
        self.tunnels_tag = tag.into();
        self
    }

    pub fn with_change_direction_improvement(mut self, percent: u32) -> Self {
        self.change_direction_improvement = percent;
        self
    }
}

/// A cell qualifies as a crawler start when it sits on the odd lattice, off
/// the map edge, and it plus all eight neighbors are wall.
fn find_start(grid: &dyn GridViewMut<bool>, rng_source: &mut dyn RngCore) -> Option<IVec2> {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let mut candidates = Vec::new();
    let mut y = 1;
    while y < height - 1 {
        let mut x = 1;
        while x < width - 1 {
            let pos = IVec2::new(x, y);
            let walled_in = !grid.get(pos)
                && EIGHT_WAY.iter().all(|d| {
                    let n = pos + *d;
                    !grid.contains(n) || !grid.get(n)
                });
            if walled_in {
                candidates.push(pos);
            }
            x += 2;
        }
        y += 2;
    }
    if candidates.is_empty() {
        None
    } else {
        Some(candidates[rng::index(rng_source, candidates.len())])
    }
}

fn crawl(
    grid: &mut dyn GridViewMut<bool>,
    start: IVec2,
    improvement: u32,
    rng_source: &mut dyn RngCore,
) -> Area {
    let (width, height) = (grid.width() as i32, grid.height() as i32);
    let in_interior =
        |pos: IVec2| pos.x >= 1 && pos.y >= 1 && pos.x <= width - 2 && pos.y <= height - 2;

    let mut tunnel = Area::new();
    let mut path = vec![start];
    grid.set(start, true);
    tunnel.add(start);

    let mut last_direction: Option<IVec2> = None;
    let mut change_chance: u32 = 0;

    while let Some(&current) = path.last() {
        let candidates: Vec<IVec2> = CARDINALS
            .iter()
            .copied()
            .filter(|d| {
                let jump = current + *d * 2;
                in_interior(jump) && !grid.get(jump) && !grid.get(current + *d)
            })
            .collect();
        if candidates.is_empty() {
            path.pop();
            continue;
        }

        let direction = match last_direction {
            Some(d) if candidates.contains(&d) && !rng::percent_check(rng_source, change_chance) => {
                d
            }
            _ => {
                change_chance = 0;
                candidates[rng::index(rng_source, candidates.len())]
            }
        };
        change_chance = (change_chance + improvement).min(100);
        last_direction = Some(direction);

        let between = current + direction;
        let jump = current + direction * 2;
        grid.set(between, true);
        grid.set(jump, true);
        tunnel.add(between);
        tunnel.add(jump);
        path.push(jump);
    }
    tunnel
}

impl GenerationStep for MazeCarve {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.change_direction_improvement > 100 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "change_direction_improvement",
                reason: format!(
                    "must be in [0, 100], got {}",
                    self.change_direction_improvement
                ),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let tunnel = {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            match find_start(grid, rng_source) {
                Some(start) => crawl(grid, start, self.change_direction_improvement, rng_source),
                None => return Ok(Progress::Complete),
            }
        };
        ctx.components
            .get_first_or_new(Some(self.tunnels_tag.as_str()), ItemList::<Area>::new)
            .add(tunnel, &self.name);
        Ok(Progress::Yielded)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generation::StepRunner;
    use crate::geometry::Adjacency;
    use crate::grid::{Grid, GridView};

    fn run_maze(width: u32, height: u32, seed: u64) -> GenerationContext {
        let mut ctx = GenerationContext::new(width, height);
        let mut rng = StdRng::seed_from_u64(seed);
        StepRunner::new(Box::new(MazeCarve::new()))
            .run_to_completion(&mut ctx, &mut rng)
            .unwrap();
        ctx
    }

    #[test]
    fn carves_corridors_on_an_empty_map() {
        let ctx = run_maze(31, 31, 8);
        let grid = ctx
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert!(grid.count(true) > 100);

        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert!(!tunnels.is_empty());
    }

    #[test]
    fn corridors_never_touch_the_map_edge() {
        let ctx = run_maze(25, 25, 4);
        let grid = ctx
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        for pos in ctx.bounds().perimeter_positions() {
            assert!(!grid.get(pos), "floor on edge at {pos}");
        }
    }

    #[test]
    fn corridors_are_cardinally_connected_per_crawler() {
        let ctx = run_maze(31, 31, 19);
        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        for tunnel in tunnels.items() {
            let positions: HashSet<_> = tunnel.iter().collect();
            for pos in tunnel.iter() {
                if positions.len() == 1 {
                    break;
                }
                let connected = Adjacency::Cardinal
                    .neighbors(pos)
                    .any(|n| positions.contains(&n));
                assert!(connected, "corridor cell {pos} is isolated");
            }
        }
    }

    #[test]
    fn respects_existing_floor_and_its_walls() {
        let mut ctx = GenerationContext::new(31, 31);
        let room = crate::geometry::Rect::new(11, 11, 9, 9);
        {
            let grid = ctx.wall_floor_or_new(tags::WALL_FLOOR);
            for p in room.positions() {
                grid.set(p, true);
            }
        }
        let mut rng = StdRng::seed_from_u64(77);
        StepRunner::new(Box::new(MazeCarve::new()))
            .run_to_completion(&mut ctx, &mut rng)
            .unwrap();

        // No corridor cell may be cardinally adjacent to the pre-existing
        // room interior; the two-cell jump preserves the separating wall.
        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        for tunnel in tunnels.items() {
            for pos in tunnel.iter() {
                assert!(!room.contains(pos), "corridor carved into room at {pos}");
            }
        }
    }

    #[test]
    fn deterministic_for_a_seed() {
        let a = run_maze(31, 31, 5);
        let b = run_maze(31, 31, 5);
        let grid_a = a
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        let grid_b = b
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert_eq!(grid_a, grid_b);
    }

    #[test]
    fn rejects_improvement_above_100() {
        let mut ctx = GenerationContext::new(15, 15);
        let mut rng = StdRng::seed_from_u64(1);
        let mut runner = StepRunner::new(Box::new(
            MazeCarve::new().with_change_direction_improvement(150),
        ));
        let err = runner.advance(&mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }
}
