//! Fixed rectangle recording and carving.
use rand::RngCore;

use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::geometry::Rect;
use crate::grid::{GridView, GridViewMut};
use crate::steps::tags;

/// Records one rectangle under the rectangles tag and optionally carves its
/// interior as floor. Runs in a single stage.
///
/// With no explicit rectangle the context bounds are used, which together
/// with [`crate::steps::RectanglesToAreas`] yields the classic one-big-room
/// map: a floor interior inside a one-cell wall border.
pub struct RectangleCarve {
    pub name: String,
    pub wall_floor_tag: String,
    pub rectangles_tag: String,
    /// Rectangle to record; the context bounds when `None`.
    pub rect: Option<Rect>,
    /// Carve the rectangle's interior into the wall-floor grid.
    pub carve_floor: bool,
}

impl Default for RectangleCarve {
    fn default() -> Self {
        Self {
            name: "RectangleCarve".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            rectangles_tag: tags::RECTANGLES.into(),
            rect: None,
            carve_floor: true,
        }
    }
}

impl RectangleCarve {
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

    pub fn with_carve_floor(mut self, carve: bool) -> Self {
        self.carve_floor = carve;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: impl Into<String>) -> Self {
        self.wall_floor_tag = tag.into();
        self
    }

    pub fn with_rectangles_tag(mut self, tag: impl Into<String>) -> Self {
        self.rectangles_tag = tag.into();
        self
    }
}

impl GenerationStep for RectangleCarve {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
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
        let rect = self.rect.unwrap_or_else(|| ctx.bounds());
        if self.carve_floor {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            for pos in rect.interior().positions() {
                if grid.contains(pos) {
                    grid.set(pos, true);
                }
            }
        }
        ctx.components
            .get_first_or_new(Some(self.rectangles_tag.as_str()), ItemList::<Rect>::new)
            .add(rect, &self.name);
        Ok(Progress::Complete)
    }
}
