//! Pluggable strategies for connecting areas: where to connect two areas,
//! and how to carve the tunnel between the chosen points.
use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::geometry::orthogonal_line;
use crate::grid::{GridView, GridViewMut};
use crate::rng;

/// Picks one connection point in each of two areas.
pub trait ConnectionPointSelector {
    fn select(&self, a: &Area, b: &Area, rng: &mut dyn RngCore) -> (IVec2, IVec2);
}

/// Connects at the centers of each area's bounding rectangle. The center may
/// itself be a wall cell; the tunnel creator carves through it regardless.
#[derive(Clone, Copy, Debug, Default)]
pub struct CenterBoundsSelector;

impl ConnectionPointSelector for CenterBoundsSelector {
    fn select(&self, a: &Area, b: &Area, _rng: &mut dyn RngCore) -> (IVec2, IVec2) {
        let center = |area: &Area| area.bounds().map(|b| b.center()).unwrap_or(IVec2::ZERO);
        (center(a), center(b))
    }
}

/// Connects at a random position of each area.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPositionSelector;

impl ConnectionPointSelector for RandomPositionSelector {
    fn select(&self, a: &Area, b: &Area, rng: &mut dyn RngCore) -> (IVec2, IVec2) {
        let pick = |area: &Area, rng: &mut dyn RngCore| {
            let positions: Vec<IVec2> = area.iter().collect();
            if positions.is_empty() {
                IVec2::ZERO
            } else {
                positions[rng::index(rng, positions.len())]
            }
        };
        (pick(a, rng), pick(b, rng))
    }
}

/// Connects at the true closest pair of positions (Manhattan distance) across
/// the two areas. Quadratic in the area sizes; intended for modest area
/// counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClosestPositionsSelector;

impl ConnectionPointSelector for ClosestPositionsSelector {
    fn select(&self, a: &Area, b: &Area, _rng: &mut dyn RngCore) -> (IVec2, IVec2) {
        let mut best = (IVec2::ZERO, IVec2::ZERO);
        let mut best_distance = i32::MAX;
        for pa in a.iter() {
            for pb in b.iter() {
                let d = (pa.x - pb.x).abs() + (pa.y - pb.y).abs();
                if d < best_distance {
                    best_distance = d;
                    best = (pa, pb);
                }
            }
        }
        best
    }
}

/// Carves a tunnel between two points, returning the full set of tunnel
/// positions (including cells that were already floor).
pub trait TunnelCreator {
    fn create(
        &self,
        grid: &mut dyn GridViewMut<bool>,
        start: IVec2,
        end: IVec2,
        rng: &mut dyn RngCore,
    ) -> Area;
}

fn carve(grid: &mut dyn GridViewMut<bool>, area: &mut Area, pos: IVec2) {
    if grid.contains(pos) {
        grid.set(pos, true);
        area.add(pos);
    }
}

/// Carves along an orthogonal line directly between the two points.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectLineTunnel;

impl TunnelCreator for DirectLineTunnel {
    fn create(
        &self,
        grid: &mut dyn GridViewMut<bool>,
        start: IVec2,
        end: IVec2,
        _rng: &mut dyn RngCore,
    ) -> Area {
        let mut area = Area::new();
        for pos in orthogonal_line(start, end) {
            carve(grid, &mut area, pos);
        }
        area
    }
}

/// Carves an L-shaped tunnel: one horizontal and one vertical segment, with
/// the leg order chosen randomly.
#[derive(Clone, Copy, Debug, Default)]
pub struct HorizontalVerticalTunnel;

impl TunnelCreator for HorizontalVerticalTunnel {
    fn create(
        &self,
        grid: &mut dyn GridViewMut<bool>,
        start: IVec2,
        end: IVec2,
        rng: &mut dyn RngCore,
    ) -> Area {
        let corner = if rng::percent_check(rng, 50) {
            IVec2::new(end.x, start.y)
        } else {
            IVec2::new(start.x, end.y)
        };
        let mut area = Area::new();
        for pos in orthogonal_line(start, corner) {
            carve(grid, &mut area, pos);
        }
        for pos in orthogonal_line(corner, end) {
            carve(grid, &mut area, pos);
        }
        area
    }
}
