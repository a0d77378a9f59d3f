//! Connected-component detection over the wall-floor grid.
use std::collections::HashSet;

use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::generation::{GenerationStep, Progress};
use crate::geometry::Adjacency;
use crate::grid::{GridView, GridViewMut};
use crate::steps::tags;

/// Finds the connected floor components of the wall-floor grid and appends
/// each as an [`Area`] to the list under the areas tag, one stage per
/// component.
///
/// Appends rather than replaces, so running the step twice against the same
/// tag records every component twice; aim a re-run at a fresh tag instead
/// (e.g. to verify connectivity after a connection pass).
pub struct AreaDetection {
    pub name: String,
    pub wall_floor_tag: String,
    pub areas_tag: String,
    /// Which neighbors join two floor cells into one component.
    pub adjacency: Adjacency,
    visited: HashSet<IVec2>,
}

impl Default for AreaDetection {
    fn default() -> Self {
        Self {
            name: "AreaDetection".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            areas_tag: tags::AREAS.into(),
            adjacency: Adjacency::Cardinal,
            visited: HashSet::new(),
        }
    }
}

impl AreaDetection {
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

    pub fn with_areas_tag(mut self, tag: impl Into<String>) -> Self {
        self.areas_tag = tag.into();
        self
    }

    pub fn with_adjacency(mut self, adjacency: Adjacency) -> Self {
        self.adjacency = adjacency;
        self
    }
}

fn flood_fill(
    grid: &dyn GridViewMut<bool>,
    start: IVec2,
    adjacency: Adjacency,
    visited: &mut HashSet<IVec2>,
) -> Area {
    let mut area = Area::new();
    let mut pending = vec![start];
    visited.insert(start);
    while let Some(pos) = pending.pop() {
        area.add(pos);
        for neighbor in adjacency.neighbors(pos) {
            if grid.contains(neighbor) && grid.get(neighbor) && visited.insert(neighbor) {
                pending.push(neighbor);
            }
        }
    }
    area
}

impl GenerationStep for AreaDetection {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        _rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let area = {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            let start = grid
                .positions()
                .find(|pos| grid.get(*pos) && !self.visited.contains(pos));
            match start {
                Some(start) => flood_fill(grid, start, self.adjacency, &mut self.visited),
                None => return Ok(Progress::Complete),
            }
        };
        ctx.components
            .get_first_or_new(Some(self.areas_tag.as_str()), ItemList::<Area>::new)
            .add(area, &self.name);
        Ok(Progress::Yielded)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::generation::StepRunner;
    use crate::geometry::Rect;

    fn carve(ctx: &mut GenerationContext, rect: Rect) {
        let grid = ctx.wall_floor_or_new(tags::WALL_FLOOR);
        for p in rect.positions() {
            grid.set(p, true);
        }
    }

    fn detect(ctx: &mut GenerationContext, step: AreaDetection) {
        let mut rng = StdRng::seed_from_u64(0);
        StepRunner::new(Box::new(step))
            .run_to_completion(ctx, &mut rng)
            .unwrap();
    }

    #[test]
    fn finds_each_disconnected_region_once() {
        let mut ctx = GenerationContext::new(20, 20);
        carve(&mut ctx, Rect::new(1, 1, 3, 3));
        carve(&mut ctx, Rect::new(10, 10, 4, 2));
        carve(&mut ctx, Rect::new(1, 15, 2, 2));
        detect(&mut ctx, AreaDetection::new());

        let areas = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        assert_eq!(areas.len(), 3);
        let total: usize = areas.items().map(Area::len).sum();
        assert_eq!(total, 9 + 8 + 4);
    }

    #[test]
    fn diagonal_touch_is_separate_under_cardinal_adjacency() {
        let mut ctx = GenerationContext::new(10, 10);
        carve(&mut ctx, Rect::new(1, 1, 2, 2));
        carve(&mut ctx, Rect::new(3, 3, 2, 2));
        detect(&mut ctx, AreaDetection::new());
        let areas = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        assert_eq!(areas.len(), 2);
    }

    #[test]
    fn diagonal_touch_joins_under_eight_way_adjacency() {
        let mut ctx = GenerationContext::new(10, 10);
        carve(&mut ctx, Rect::new(1, 1, 2, 2));
        carve(&mut ctx, Rect::new(3, 3, 2, 2));
        detect(&mut ctx, AreaDetection::new().with_adjacency(Adjacency::Eight));
        let areas = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::AREAS))
            .unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(areas.get(0).unwrap().len(), 8);
    }

    #[test]
    fn empty_grid_yields_no_areas_and_completes() {
        let mut ctx = GenerationContext::new(10, 10);
        let mut rng = StdRng::seed_from_u64(0);
        let stages = StepRunner::new(Box::new(AreaDetection::new()))
            .run_to_completion(&mut ctx, &mut rng)
            .unwrap();
        assert_eq!(stages, 1);
        assert!(ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::AREAS))
            .is_none());
    }

    #[test]
    fn runs_one_stage_per_area_plus_final() {
        let mut ctx = GenerationContext::new(20, 20);
        carve(&mut ctx, Rect::new(1, 1, 2, 2));
        carve(&mut ctx, Rect::new(10, 10, 2, 2));
        let mut rng = StdRng::seed_from_u64(0);
        let stages = StepRunner::new(Box::new(AreaDetection::new()))
            .run_to_completion(&mut ctx, &mut rng)
            .unwrap();
        assert_eq!(stages, 3);
    }
}
