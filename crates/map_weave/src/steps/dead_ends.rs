//! Dead end trimming for carved tunnels.
use std::collections::HashSet;

use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{ComponentRequirement, GenerationStep, Progress};
use crate::geometry::EIGHT_WAY;
use crate::grid::{GridView, GridViewMut};
use crate::rng;
use crate::steps::tags;

/// Trim until no dead end remains.
pub const INFINITE_TRIM_ITERATIONS: u32 = u32::MAX;

/// Erodes the dead ends of the tunnels recorded under the tunnels tag; one
/// stage per tunnel.
///
/// A dead end is a tunnel cell with exactly one floor cell among its eight
/// neighbors, i.e. the tip of a one-wide corridor. Each trim iteration walls
/// every unprotected dead end back up and removes it from the tunnel's
/// [`Area`], exposing the next cell as the new tip; trimming stops at a
/// junction, at a saved dead end, or after
/// [`DeadEndTrim::max_trim_iterations`] rounds. With
/// [`DeadEndTrim::save_dead_end_chance`] above zero, some dead ends survive
/// permanently, which keeps a maze from collapsing into nothing but
/// through-paths.
pub struct DeadEndTrim {
    pub name: String,
    pub wall_floor_tag: String,
    pub tunnels_tag: String,
    /// Chance, out of 100, for a dead end to be kept forever.
    pub save_dead_end_chance: u32,
    /// Trim rounds per tunnel; [`INFINITE_TRIM_ITERATIONS`] to run until
    /// stable.
    pub max_trim_iterations: u32,
    next_tunnel: usize,
    saved: HashSet<IVec2>,
}

impl Default for DeadEndTrim {
    fn default() -> Self {
        Self {
            name: "DeadEndTrim".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            tunnels_tag: tags::TUNNELS.into(),
            save_dead_end_chance: 0,
            max_trim_iterations: INFINITE_TRIM_ITERATIONS,
            next_tunnel: 0,
            saved: HashSet::new(),
        }
    }
}

impl DeadEndTrim {
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

    pub fn with_save_dead_end_chance(mut self, percent: u32) -> Self {
        self.save_dead_end_chance = percent;
        self
    }

    pub fn with_max_trim_iterations(mut self, iterations: u32) -> Self {
        self.max_trim_iterations = iterations;
        self
    }

    fn trim(
        &mut self,
        grid: &mut dyn GridViewMut<bool>,
        tunnel: &mut Area,
        rng_source: &mut dyn RngCore,
    ) {
        let mut iterations = 0;
        loop {
            let dead_ends: Vec<IVec2> = tunnel
                .iter()
                .filter(|pos| {
                    let open = EIGHT_WAY
                        .iter()
                        .filter(|d| {
                            let n = *pos + **d;
                            grid.contains(n) && grid.get(n)
                        })
                        .count();
                    open == 1
                })
                .collect();

            let mut changed = false;
            for pos in dead_ends {
                if self.saved.contains(&pos) {
                    continue;
                }
                if rng::percent_check(rng_source, self.save_dead_end_chance) {
                    self.saved.insert(pos);
                    continue;
                }
                grid.set(pos, false);
                tunnel.remove(pos);
                changed = true;
            }

            iterations += 1;
            if !changed || iterations >= self.max_trim_iterations {
                return;
            }
        }
    }
}

impl GenerationStep for DeadEndTrim {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_components(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::of::<ItemList<Area>>(Some(
            self.tunnels_tag.as_str(),
        ))]
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.save_dead_end_chance > 100 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "save_dead_end_chance",
                reason: format!("must be in [0, 100], got {}", self.save_dead_end_chance),
            });
        }
        if self.max_trim_iterations == 0 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "max_trim_iterations",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let (mut tunnel, remaining) = {
            let tunnels = match ctx
                .components
                .get_first::<ItemList<Area>>(Some(self.tunnels_tag.as_str()))
            {
                Some(tunnels) => tunnels,
                None => return Ok(Progress::Complete),
            };
            match tunnels.get(self.next_tunnel) {
                Some(tunnel) => (tunnel.clone(), tunnels.len() - self.next_tunnel - 1),
                None => return Ok(Progress::Complete),
            }
        };

        {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            self.trim(grid, &mut tunnel, rng_source);
        }
        let tunnels = ctx
            .components
            .get_first_mut::<ItemList<Area>>(Some(self.tunnels_tag.as_str()))
            .ok_or_else(|| Error::MissingComponent {
                step: self.name.clone(),
                type_name: std::any::type_name::<ItemList<Area>>(),
                tag: Some(self.tunnels_tag.clone()),
            })?;
        if let Some(slot) = tunnels.get_mut(self.next_tunnel) {
            *slot = tunnel;
        }

        self.next_tunnel += 1;
        if remaining == 0 {
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Yielded)
        }
    }
}
