//! Connects disconnected floor areas until the map is one component.
use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::connection::{
    ClosestPositionsSelector, ConnectionPointSelector, HorizontalVerticalTunnel, TunnelCreator,
};
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::disjoint_set::DisjointSet;
use crate::error::{Error, Result};
use crate::generation::{ComponentRequirement, GenerationStep, Progress};
use crate::geometry::Distance;
use crate::steps::tags;

/// Joins the areas recorded under the areas tag until they form a single
/// connected component; one stage per tunnel carved.
///
/// Requires the area list to exist already, so an area detection step (or a
/// step recording areas directly) must run first. Each stage selects a
/// connection point pair for every pair of areas still in different sets via
/// the configured [`ConnectionPointSelector`], joins the pair whose points
/// lie closest under the configured metric, and carves a tunnel with the
/// configured [`TunnelCreator`]. When two sets merge, the absorbing set's
/// area swallows the absorbed set's positions, so later stages rank and
/// select against the merged shapes. Every tunnel is recorded under the
/// tunnels tag, including the cells that were already floor, so N areas
/// always produce exactly N - 1 tunnels.
pub struct ClosestAreaConnection {
    pub name: String,
    pub wall_floor_tag: String,
    pub areas_tag: String,
    pub tunnels_tag: String,
    /// Distance metric applied to the selector-chosen connection points when
    /// ranking candidate pairs.
    pub distance: Distance,
    point_selector: Box<dyn ConnectionPointSelector>,
    tunnel_creator: Box<dyn TunnelCreator>,
    // Per-set merged shapes, indexed by original area; only the entries at
    // disjoint-set roots are current.
    areas: Vec<Area>,
    sets: DisjointSet,
}

impl Default for ClosestAreaConnection {
    fn default() -> Self {
        Self {
            name: "ClosestAreaConnection".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            areas_tag: tags::AREAS.into(),
            tunnels_tag: tags::TUNNELS.into(),
            distance: Distance::Manhattan,
            point_selector: Box::new(ClosestPositionsSelector),
            tunnel_creator: Box::new(HorizontalVerticalTunnel),
            areas: Vec::new(),
            sets: DisjointSet::new(0),
        }
    }
}

impl ClosestAreaConnection {
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

    pub fn with_tunnels_tag(mut self, tag: impl Into<String>) -> Self {
        self.tunnels_tag = tag.into();
        self
    }

    pub fn with_distance(mut self, distance: Distance) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_point_selector(
        mut self,
        selector: impl ConnectionPointSelector + 'static,
    ) -> Self {
        self.point_selector = Box::new(selector);
        self
    }

    pub fn with_tunnel_creator(mut self, creator: impl TunnelCreator + 'static) -> Self {
        self.tunnel_creator = Box::new(creator);
        self
    }

    /// Closest pair of disjoint sets, ranked by the configured metric over
    /// the connection points the selector picks for their merged shapes.
    /// Returns the winning roots together with the selected points.
    fn closest_disjoint_pair(
        &mut self,
        rng_source: &mut dyn RngCore,
    ) -> Option<(usize, usize, IVec2, IVec2)> {
        let roots: Vec<usize> = (0..self.areas.len())
            .filter(|&i| self.sets.find(i) == i)
            .collect();
        let mut best: Option<(usize, usize, IVec2, IVec2)> = None;
        let mut best_distance = f64::INFINITY;
        for (n, &i) in roots.iter().enumerate() {
            for &j in &roots[(n + 1)..] {
                let (start, end) =
                    self.point_selector
                        .select(&self.areas[i], &self.areas[j], rng_source);
                let d = self.distance.measure(start, end);
                if d < best_distance {
                    best_distance = d;
                    best = Some((i, j, start, end));
                }
            }
        }
        best
    }
}

impl GenerationStep for ClosestAreaConnection {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_components(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::of::<ItemList<Area>>(Some(
            self.areas_tag.as_str(),
        ))]
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        if self.areas.is_empty() {
            let list = ctx
                .components
                .get_first::<ItemList<Area>>(Some(self.areas_tag.as_str()))
                .ok_or_else(|| Error::MissingComponent {
                    step: self.name.clone(),
                    type_name: std::any::type_name::<ItemList<Area>>(),
                    tag: Some(self.areas_tag.clone()),
                })?;
            self.areas = list.items().cloned().collect();
            self.sets = DisjointSet::new(self.areas.len());
        }

        let (i, j, start, end) = match self.closest_disjoint_pair(rng_source) {
            Some(pair) => pair,
            None => return Ok(Progress::Complete),
        };

        let tunnel = {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            self.tunnel_creator.create(grid, start, end, rng_source)
        };
        if let Some(union) = self.sets.union(i, j) {
            let absorbed = std::mem::take(&mut self.areas[union.absorbed]);
            self.areas[union.absorbing].merge(&absorbed);
        }
        ctx.components
            .get_first_or_new(Some(self.tunnels_tag.as_str()), ItemList::<Area>::new)
            .add(tunnel, &self.name);
        Ok(Progress::Yielded)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::connection::{CenterBoundsSelector, DirectLineTunnel};
    use crate::error::Error;
    use crate::generation::StepRunner;
    use crate::geometry::Rect;
    use crate::grid::{Grid, GridView};
    use crate::steps::AreaDetection;

    fn carve_rooms(ctx: &mut GenerationContext, rooms: &[Rect]) {
        let grid = ctx.wall_floor_or_new(tags::WALL_FLOOR);
        for room in rooms {
            for p in room.positions() {
                grid.set(p, true);
            }
        }
    }

    fn detect_then_connect(ctx: &mut GenerationContext, step: ClosestAreaConnection, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        StepRunner::new(Box::new(AreaDetection::new()))
            .run_to_completion(ctx, &mut rng)
            .unwrap();
        StepRunner::new(Box::new(step))
            .run_to_completion(ctx, &mut rng)
            .unwrap();
    }

    fn component_count(ctx: &mut GenerationContext, seed: u64) -> usize {
        let mut rng = StdRng::seed_from_u64(seed);
        StepRunner::new(Box::new(AreaDetection::new().with_areas_tag("Check")))
            .run_to_completion(ctx, &mut rng)
            .unwrap();
        ctx.components
            .get_first::<ItemList<Area>>(Some("Check"))
            .unwrap()
            .len()
    }

    #[test]
    fn connects_three_rooms_with_two_tunnels() {
        let mut ctx = GenerationContext::new(30, 30);
        carve_rooms(
            &mut ctx,
            &[
                Rect::new(1, 1, 4, 4),
                Rect::new(20, 2, 5, 5),
                Rect::new(10, 20, 4, 6),
            ],
        );
        detect_then_connect(&mut ctx, ClosestAreaConnection::new(), 7);

        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert_eq!(tunnels.len(), 2);
        assert_eq!(component_count(&mut ctx, 7), 1);
    }

    #[test]
    fn single_area_needs_no_tunnel() {
        let mut ctx = GenerationContext::new(20, 20);
        carve_rooms(&mut ctx, &[Rect::new(3, 3, 5, 5)]);
        detect_then_connect(&mut ctx, ClosestAreaConnection::new(), 1);
        assert!(ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .is_none());
    }

    #[test]
    fn fails_fast_without_a_detected_area_list() {
        let mut ctx = GenerationContext::new(20, 20);
        let mut rng = StdRng::seed_from_u64(1);
        let mut runner = StepRunner::new(Box::new(ClosestAreaConnection::new()));
        let err = runner.advance(&mut ctx, &mut rng).unwrap_err();
        assert!(matches!(err, Error::MissingComponent { .. }));
        assert!(ctx.components.is_empty());
    }

    #[test]
    fn alternate_strategies_still_produce_one_component() {
        let mut ctx = GenerationContext::new(30, 30);
        carve_rooms(&mut ctx, &[Rect::new(2, 2, 4, 4), Rect::new(22, 22, 4, 4)]);
        detect_then_connect(
            &mut ctx,
            ClosestAreaConnection::new()
                .with_point_selector(CenterBoundsSelector)
                .with_tunnel_creator(DirectLineTunnel)
                .with_distance(Distance::Euclidean),
            3,
        );
        assert_eq!(component_count(&mut ctx, 3), 1);
    }

    #[test]
    fn pair_ranking_follows_the_selected_points() {
        // A tall bar whose center sits far from its bottom edge, a
        // mid-distance block to the right, and a small block just below the
        // bar's bottom end.
        let layout = [
            Rect::new(2, 2, 2, 20),
            Rect::new(12, 10, 2, 2),
            Rect::new(2, 26, 2, 2),
        ];

        // Closest-position selection joins the bar to the block right below
        // it first: their nearest cells are 5 apart, while the right block is
        // 9 away. The first tunnel is a straight drop in the bar's column.
        let mut ctx = GenerationContext::new(40, 40);
        carve_rooms(&mut ctx, &layout);
        detect_then_connect(&mut ctx, ClosestAreaConnection::new(), 11);
        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert_eq!(tunnels.len(), 2);
        assert!(tunnels.get(0).unwrap().iter().all(|p| p.x <= 3));

        // Center selection ranks the right block closer than the lower one,
        // so the first tunnel heads right instead.
        let mut ctx = GenerationContext::new(40, 40);
        carve_rooms(&mut ctx, &layout);
        detect_then_connect(
            &mut ctx,
            ClosestAreaConnection::new().with_point_selector(CenterBoundsSelector),
            11,
        );
        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert!(tunnels.get(0).unwrap().iter().any(|p| p.x > 5));
    }

    #[test]
    fn later_stages_select_against_the_merged_shape() {
        // Three blocks in a row: left and middle join first, then the far
        // right block must be reached from the absorbed middle block rather
        // than from the left one.
        let mut ctx = GenerationContext::new(30, 10);
        carve_rooms(
            &mut ctx,
            &[
                Rect::new(2, 2, 3, 3),
                Rect::new(8, 2, 3, 3),
                Rect::new(20, 2, 3, 3),
            ],
        );
        detect_then_connect(&mut ctx, ClosestAreaConnection::new(), 13);

        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        assert_eq!(tunnels.len(), 2);
        assert!(tunnels.get(1).unwrap().iter().all(|p| p.x >= 10));
    }

    #[test]
    fn tunnels_record_cells_that_were_already_floor() {
        let mut ctx = GenerationContext::new(30, 10);
        // Two rooms on the same row; the tunnel endpoints sit inside them.
        carve_rooms(&mut ctx, &[Rect::new(1, 3, 4, 3), Rect::new(20, 3, 4, 3)]);
        detect_then_connect(&mut ctx, ClosestAreaConnection::new(), 5);

        let tunnels = ctx
            .components
            .get_first::<ItemList<Area>>(Some(tags::TUNNELS))
            .unwrap();
        let tunnel = tunnels.get(0).unwrap();
        let grid = ctx
            .components
            .get_first::<Grid<bool>>(Some(tags::WALL_FLOOR))
            .unwrap();
        assert!(tunnel.iter().all(|p| grid.get(p)));
        // Both endpoints were floor before the tunnel was carved.
        assert!(tunnel.len() >= 2);
    }
}
