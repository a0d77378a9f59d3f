//! Rectangle-to-area translation.
use rand::RngCore;

use crate::area::Area;
use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::Result;
use crate::generation::{ComponentRequirement, GenerationStep, Progress};
use crate::geometry::Rect;
use crate::steps::tags;

/// Translates the rectangles recorded under the rectangles tag into areas:
/// one [`Area`] of interior positions per rectangle, appended under the areas
/// tag. Runs in a single stage and never touches the wall-floor grid.
///
/// Bridges rectangle-producing steps to area-consuming ones, e.g.
/// [`crate::steps::RectangleCarve`] into
/// [`crate::steps::ClosestAreaConnection`].
pub struct RectanglesToAreas {
    pub name: String,
    pub rectangles_tag: String,
    pub areas_tag: String,
    /// Remove the source rectangle list after translating.
    pub remove_source: bool,
}

impl Default for RectanglesToAreas {
    fn default() -> Self {
        Self {
            name: "RectanglesToAreas".into(),
            rectangles_tag: tags::RECTANGLES.into(),
            areas_tag: tags::AREAS.into(),
            remove_source: false,
        }
    }
}

impl RectanglesToAreas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_rectangles_tag(mut self, tag: impl Into<String>) -> Self {
        self.rectangles_tag = tag.into();
        self
    }

    pub fn with_areas_tag(mut self, tag: impl Into<String>) -> Self {
        self.areas_tag = tag.into();
        self
    }

    pub fn with_remove_source(mut self, remove: bool) -> Self {
        self.remove_source = remove;
        self
    }
}

impl GenerationStep for RectanglesToAreas {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_components(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::of::<ItemList<Rect>>(Some(
            self.rectangles_tag.as_str(),
        ))]
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        _rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let areas: Vec<Area> = ctx
            .components
            .get_first::<ItemList<Rect>>(Some(self.rectangles_tag.as_str()))
            .map(|rects| {
                rects
                    .items()
                    .map(|rect| Area::from_positions(rect.interior().positions()))
                    .collect()
            })
            .unwrap_or_default();

        let list = ctx
            .components
            .get_first_or_new(Some(self.areas_tag.as_str()), ItemList::<Area>::new);
        for area in areas {
            list.add(area, &self.name);
        }
        if self.remove_source {
            ctx.components
                .remove::<ItemList<Rect>>(Some(self.rectangles_tag.as_str()));
        }
        Ok(Progress::Complete)
    }
}
