//! Rectangular spiral carving.
use glam::IVec2;
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::geometry::Rect;
use crate::grid::{GridView, GridViewMut};
use crate::steps::tags;

/// Carves a rectangular spiral: concentric ring corridors working inward
/// from the base rectangle's perimeter, each ring joined to the next by a
/// connector corridor on a rotating side. The carved corridor is recorded as
/// one [`Area`] under the tunnels tag. Runs in a single stage and uses no
/// randomness.
pub struct SpiralCarve {
    pub name: String,
    pub wall_floor_tag: String,
    pub tunnels_tag: String,
    /// Outermost ring; the context bounds shrunk by one when `None`.
    pub rect: Option<Rect>,
    /// Wall cells between consecutive rings.
    pub gap: u32,
}

impl Default for SpiralCarve {
    fn default() -> Self {
        Self {
            name: "SpiralCarve".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            tunnels_tag: tags::TUNNELS.into(),
            rect: None,
            gap: 1,
        }
    }
}

impl SpiralCarve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.rect = Some(rect);
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
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
}

fn carve(grid: &mut dyn GridViewMut<bool>, area: &mut Area, pos: IVec2) {
    if grid.contains(pos) {
        grid.set(pos, true);
        area.add(pos);
    }
}

/// Cells strictly between an outer and inner ring on the given side,
/// centered on the inner ring's edge.
fn connector(outer: Rect, inner: Rect, side: usize) -> Vec<IVec2> {
    let center = inner.center();
    let (outer_max, inner_max) = (outer.max(), inner.max());
    match side % 4 {
        0 => (outer.y + 1..inner.y)
            .map(|y| IVec2::new(center.x, y))
            .collect(),
        1 => (inner_max.x + 1..outer_max.x)
            .map(|x| IVec2::new(x, center.y))
            .collect(),
        2 => (inner_max.y + 1..outer_max.y)
            .map(|y| IVec2::new(center.x, y))
            .collect(),
        _ => (outer.x + 1..inner.x)
            .map(|x| IVec2::new(x, center.y))
            .collect(),
    }
}

impl GenerationStep for SpiralCarve {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.gap == 0 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "gap",
                reason: "must be at least 1".into(),
            });
        }
        if let Some(rect) = self.rect {
            if rect.is_empty() {
                return Err(Error::InvalidConfiguration {
                    step: self.name.clone(),
                    parameter: "rect",
                    reason: "must not be empty".into(),
                });
            }
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        _rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let base = self.rect.unwrap_or_else(|| ctx.bounds().expanded(-1));
        let inward = self.gap as i32 + 1;
        let mut carved = Area::new();
        {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            let mut ring = base;
            let mut side = 0;
            while !ring.is_empty() {
                for pos in ring.perimeter_positions() {
                    carve(grid, &mut carved, pos);
                }
                let next = ring.expanded(-inward);
                if next.is_empty() {
                    break;
                }
                for pos in connector(ring, next, side) {
                    carve(grid, &mut carved, pos);
                }
                side += 1;
                ring = next;
            }
        }
        ctx.components
            .get_first_or_new(Some(self.tunnels_tag.as_str()), ItemList::<Area>::new)
            .add(carved, &self.name);
        Ok(Progress::Complete)
    }
}
