//! Random rectangular room placement with bounded retries.
use rand::RngCore;
use tracing::warn;

use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{GenerationStep, Progress};
use crate::geometry::Rect;
use crate::grid::{GridView, GridViewMut};
use crate::rng;
use crate::steps::tags;

/// Carves randomly sized and positioned rooms into the wall-floor grid and
/// records their floor rectangles under the rooms tag. One stage per room
/// attempt.
///
/// Placement composes with earlier carving steps: a candidate rectangle is
/// rejected if any cell of its buffer-expanded bounding box is already floor,
/// whatever step carved it. Attempt budgets bound the retries, so a crowded
/// map degrades to fewer rooms than requested (reported via
/// [`RoomPlacement::rooms_placed`] and a warning) rather than failing.
///
/// Room origins and sizes are forced to odd parity so rooms stay aligned with
/// the odd lattice used by maze carving.
pub struct RoomPlacement {
    pub name: String,
    pub wall_floor_tag: String,
    pub rooms_tag: String,
    /// Inclusive range for the number of rooms to attempt.
    pub min_rooms: u32,
    pub max_rooms: u32,
    /// Inclusive range for the base room dimension, in floor cells.
    pub room_min_size: u32,
    pub room_max_size: u32,
    /// Width/height multipliers applied to the base dimension.
    pub size_ratio_x: f32,
    pub size_ratio_y: f32,
    /// How many sizes to try per room before giving up on it.
    pub max_creation_attempts: u32,
    /// How many positions to try per size.
    pub max_placement_attempts: u32,
    /// Clearance, in cells, kept between a room and any existing floor.
    pub placement_buffer: u32,
    goal: Option<u32>,
    attempted: u32,
    placed: u32,
}

impl Default for RoomPlacement {
    fn default() -> Self {
        Self {
            name: "RoomPlacement".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            rooms_tag: tags::ROOMS.into(),
            min_rooms: 4,
            max_rooms: 10,
            room_min_size: 3,
            room_max_size: 7,
            size_ratio_x: 1.0,
            size_ratio_y: 1.0,
            max_creation_attempts: 45,
            max_placement_attempts: 10,
            placement_buffer: 1,
            goal: None,
            attempted: 0,
            placed: 0,
        }
    }
}

impl RoomPlacement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_room_count(mut self, min: u32, max: u32) -> Self {
        self.min_rooms = min;
        self.max_rooms = max;
        self
    }

    pub fn with_room_size(mut self, min: u32, max: u32) -> Self {
        self.room_min_size = min;
        self.room_max_size = max;
        self
    }

    pub fn with_size_ratio(mut self, x: f32, y: f32) -> Self {
        self.size_ratio_x = x;
        self.size_ratio_y = y;
        self
    }

    pub fn with_wall_floor_tag(mut self, tag: impl Into<String>) -> Self {
        self.wall_floor_tag = tag.into();
        self
    }

    pub fn with_rooms_tag(mut self, tag: impl Into<String>) -> Self {
        self.rooms_tag = tag.into();
        self
    }

    pub fn with_placement_buffer(mut self, buffer: u32) -> Self {
        self.placement_buffer = buffer;
        self
    }

    /// Number of rooms this run decided to attempt. Valid after the first
    /// stage.
    pub fn rooms_requested(&self) -> u32 {
        self.goal.unwrap_or(0)
    }

    /// Number of rooms actually carved so far.
    pub fn rooms_placed(&self) -> u32 {
        self.placed
    }

    fn try_place(&self, grid: &mut dyn GridViewMut<bool>, rng_source: &mut dyn RngCore) -> Option<Rect> {
        for _ in 0..self.max_creation_attempts {
            let size = rng::range_inclusive(
                rng_source,
                self.room_min_size as i32,
                self.room_max_size as i32,
            );
            let mut width = ((size as f32) * self.size_ratio_x).round() as i32;
            let mut height = ((size as f32) * self.size_ratio_y).round() as i32;
            width = width.max(1);
            height = height.max(1);
            if width % 2 == 0 {
                width += 1;
            }
            if height % 2 == 0 {
                height += 1;
            }

            let max_x = grid.width() as i32 - width - 1;
            let max_y = grid.height() as i32 - height - 1;
            if max_x < 1 || max_y < 1 {
                // This size cannot fit with a wall ring; try another.
                continue;
            }

            for _ in 0..self.max_placement_attempts {
                let mut x = rng::range_inclusive(rng_source, 1, max_x);
                let mut y = rng::range_inclusive(rng_source, 1, max_y);
                if x % 2 == 0 {
                    x -= 1;
                }
                if y % 2 == 0 {
                    y -= 1;
                }
                let room = Rect::new(x, y, width as u32, height as u32);
                let check = room.expanded(self.placement_buffer as i32);
                let clear = check
                    .positions()
                    .all(|p| !grid.contains(p) || !grid.get(p));
                if clear {
                    for p in room.positions() {
                        grid.set(p, true);
                    }
                    return Some(room);
                }
            }
        }
        None
    }
}

impl GenerationStep for RoomPlacement {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_configuration(&self) -> Result<()> {
        let invalid = |parameter: &'static str, reason: String| Error::InvalidConfiguration {
            step: self.name.clone(),
            parameter,
            reason,
        };
        if self.min_rooms == 0 {
            return Err(invalid("min_rooms", "must be at least 1".into()));
        }
        if self.min_rooms > self.max_rooms {
            return Err(invalid(
                "min_rooms",
                format!("must be <= max_rooms ({} > {})", self.min_rooms, self.max_rooms),
            ));
        }
        if self.room_min_size == 0 {
            return Err(invalid("room_min_size", "must be at least 1".into()));
        }
        if self.room_min_size > self.room_max_size {
            return Err(invalid(
                "room_min_size",
                format!(
                    "must be <= room_max_size ({} > {})",
                    self.room_min_size, self.room_max_size
                ),
            ));
        }
        if self.size_ratio_x <= 0.0 {
            return Err(invalid("size_ratio_x", "must be > 0".into()));
        }
        if self.size_ratio_y <= 0.0 {
            return Err(invalid("size_ratio_y", "must be > 0".into()));
        }
        if self.max_creation_attempts == 0 || self.max_placement_attempts == 0 {
            return Err(invalid(
                "max_creation_attempts",
                "attempt budgets must be at least 1".into(),
            ));
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let goal = match self.goal {
            Some(goal) => goal,
            None => {
                let goal = rng::range_inclusive(
                    rng_source,
                    self.min_rooms as i32,
                    self.max_rooms as i32,
                ) as u32;
                self.goal = Some(goal);
                goal
            }
        };

        let room = {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            self.try_place(grid, rng_source)
        };
        if let Some(room) = room {
            ctx.components
                .get_first_or_new(Some(self.rooms_tag.as_str()), ItemList::<Rect>::new)
                .add(room, &self.name);
            self.placed += 1;
        }
        self.attempted += 1;

        if self.attempted >= goal {
            if self.placed < goal {
                warn!(
                    step = %self.name,
                    requested = goal,
                    placed = self.placed,
                    "room placement exhausted its attempt budget"
                );
            }
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Yielded)
        }
    }
}
