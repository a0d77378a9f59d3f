//! Door placement along room walls.
use glam::IVec2;
use rand::RngCore;

use crate::context::items::ItemList;
use crate::context::GenerationContext;
use crate::error::{Error, Result};
use crate::generation::{ComponentRequirement, GenerationStep, Progress};
use crate::geometry::{Rect, CARDINALS};
use crate::grid::{GridView, GridViewMut};
use crate::rng;
use crate::steps::tags;

/// Places doors in the walls of the rooms recorded under the rooms tag; one
/// stage per room.
///
/// A candidate is a wall cell on the line just outside a room side whose cell
/// one step further out is already floor, so the door opens onto a corridor
/// rather than solid rock. Per room, a random number of sides between
/// [`DoorPlacement::min_sides`] and [`DoorPlacement::max_sides`] is chosen;
/// on each chosen side the candidates are walked in shuffled order and placed
/// greedily, skipping any candidate adjacent to a door already placed for
/// this room. Before each placement a cancel check runs with
/// [`DoorPlacement::cancel_placement_chance`], and every placement raises
/// that chance by [`DoorPlacement::cancel_placement_chance_increase`], so
/// sides tend to get one or two doors rather than a row of them. A candidate
/// is only committed when at least two of its cardinal neighbors are open.
///
/// Committed doors are carved open and recorded under the doors tag.
/// Requires the room list, so it must run after room placement.
pub struct DoorPlacement {
    pub name: String,
    pub wall_floor_tag: String,
    pub rooms_tag: String,
    pub doors_tag: String,
    /// Minimum number of room sides considered for doors, 1 to 4.
    pub min_sides: u32,
    /// Maximum number of room sides considered for doors, 1 to 4.
    pub max_sides: u32,
    /// Percent chance to stop placing on a side, checked before each
    /// candidate.
    pub cancel_placement_chance: u32,
    /// Added to the cancel chance after every placed door.
    pub cancel_placement_chance_increase: u32,
    next_room: usize,
}

impl Default for DoorPlacement {
    fn default() -> Self {
        Self {
            name: "DoorPlacement".into(),
            wall_floor_tag: tags::WALL_FLOOR.into(),
            rooms_tag: tags::ROOMS.into(),
            doors_tag: tags::DOORS.into(),
            min_sides: 1,
            max_sides: 4,
            cancel_placement_chance: 70,
            cancel_placement_chance_increase: 10,
            next_room: 0,
        }
    }
}

impl DoorPlacement {
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

    pub fn with_rooms_tag(mut self, tag: impl Into<String>) -> Self {
        self.rooms_tag = tag.into();
        self
    }

    pub fn with_doors_tag(mut self, tag: impl Into<String>) -> Self {
        self.doors_tag = tag.into();
        self
    }

    pub fn with_sides(mut self, min_sides: u32, max_sides: u32) -> Self {
        self.min_sides = min_sides;
        self.max_sides = max_sides;
        self
    }

    pub fn with_cancel_placement_chance(mut self, percent: u32) -> Self {
        self.cancel_placement_chance = percent;
        self
    }

    pub fn with_cancel_placement_chance_increase(mut self, percent: u32) -> Self {
        self.cancel_placement_chance_increase = percent;
        self
    }

    fn place_for_room(
        &self,
        grid: &mut dyn GridViewMut<bool>,
        room: &Rect,
        rng_source: &mut dyn RngCore,
    ) -> Vec<IVec2> {
        let sides = wall_sides(room);
        let mut order: Vec<usize> = (0..sides.len()).collect();
        rng::shuffle(rng_source, &mut order);
        let side_count =
            rng::range_inclusive(rng_source, self.min_sides as i32, self.max_sides as i32);

        let mut doors = Vec::new();
        for &side in order.iter().take(side_count as usize) {
            let (line, outward) = &sides[side];
            let mut candidates: Vec<IVec2> = line
                .iter()
                .copied()
                .filter(|&pos| {
                    let beyond = pos + *outward;
                    grid.contains(pos)
                        && !grid.get(pos)
                        && grid.contains(beyond)
                        && grid.get(beyond)
                })
                .collect();
            rng::shuffle(rng_source, &mut candidates);

            let mut cancel_chance = self.cancel_placement_chance;
            for pos in candidates {
                if rng::percent_check(rng_source, cancel_chance) {
                    break;
                }
                let near_existing = doors.iter().any(|&door: &IVec2| {
                    let delta = (door - pos).abs();
                    delta.x.max(delta.y) <= 1
                });
                if near_existing {
                    continue;
                }
                let open_neighbors = CARDINALS
                    .iter()
                    .filter(|&&d| grid.contains(pos + d) && grid.get(pos + d))
                    .count();
                if open_neighbors < 2 {
                    continue;
                }
                grid.set(pos, true);
                doors.push(pos);
                cancel_chance = (cancel_chance + self.cancel_placement_chance_increase).min(100);
            }
        }
        doors
    }
}

/// The four wall lines just outside a room's floor rectangle, corners
/// excluded, each paired with its outward direction.
fn wall_sides(room: &Rect) -> [(Vec<IVec2>, IVec2); 4] {
    let max = room.max();
    let horizontal = |y: i32| (room.x..=max.x).map(|x| IVec2::new(x, y)).collect();
    let vertical = |x: i32| (room.y..=max.y).map(|y| IVec2::new(x, y)).collect();
    [
        (horizontal(room.y - 1), IVec2::new(0, -1)),
        (horizontal(max.y + 1), IVec2::new(0, 1)),
        (vertical(room.x - 1), IVec2::new(-1, 0)),
        (vertical(max.x + 1), IVec2::new(1, 0)),
    ]
}

impl GenerationStep for DoorPlacement {
    fn name(&self) -> &str {
        &self.name
    }

    fn required_components(&self) -> Vec<ComponentRequirement> {
        vec![ComponentRequirement::of::<ItemList<Rect>>(Some(
            self.rooms_tag.as_str(),
        ))]
    }

    fn validate_configuration(&self) -> Result<()> {
        if self.min_sides < 1 || self.max_sides > 4 || self.min_sides > self.max_sides {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "min_sides",
                reason: "side bounds must satisfy 1 <= min_sides <= max_sides <= 4".into(),
            });
        }
        if self.cancel_placement_chance > 100 {
            return Err(Error::InvalidConfiguration {
                step: self.name.clone(),
                parameter: "cancel_placement_chance",
                reason: "must be a percentage in [0, 100]".into(),
            });
        }
        Ok(())
    }

    fn advance(
        &mut self,
        ctx: &mut GenerationContext,
        rng_source: &mut dyn RngCore,
    ) -> Result<Progress> {
        let (room, remaining) = {
            let rooms = match ctx
                .components
                .get_first::<ItemList<Rect>>(Some(self.rooms_tag.as_str()))
            {
                Some(rooms) => rooms,
                None => return Ok(Progress::Complete),
            };
            match rooms.get(self.next_room) {
                Some(room) => (*room, rooms.len() - self.next_room - 1),
                None => return Ok(Progress::Complete),
            }
        };

        let doors = {
            let grid = ctx.wall_floor_or_new(&self.wall_floor_tag);
            self.place_for_room(grid, &room, rng_source)
        };
        let list = ctx
            .components
            .get_first_or_new(Some(self.doors_tag.as_str()), ItemList::<IVec2>::new);
        for door in doors {
            list.add(door, &self.name);
        }

        self.next_room += 1;
        if remaining == 0 {
            Ok(Progress::Complete)
        } else {
            Ok(Progress::Yielded)
        }
    }
}
