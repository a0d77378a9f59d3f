//! The concrete generation step library.
//!
//! All carving steps operate on a boolean grid (true = floor, false = wall)
//! conventionally tagged [`tags::WALL_FLOOR`], created on demand as an
//! all-wall grid of the context's size. Steps communicate through the
//! context's component store under the tag conventions in [`tags`]; every tag
//! is configurable per step for pipelines that need several parallel layers.
pub mod area_connection;
pub mod area_finder;
pub mod cellular_automata;
pub mod dead_ends;
pub mod doors;
pub mod maze;
pub mod parallelogram;
pub mod random_fill;
pub mod rectangle;
pub mod rooms;
pub mod spiral;
pub mod translate;

pub use area_connection::ClosestAreaConnection;
pub use area_finder::AreaDetection;
pub use cellular_automata::CellularAutomataSmooth;
pub use dead_ends::{DeadEndTrim, INFINITE_TRIM_ITERATIONS};
pub use doors::DoorPlacement;
pub use maze::MazeCarve;
pub use parallelogram::ParallelogramCarve;
pub use random_fill::RandomFill;
pub use rectangle::RectangleCarve;
pub use rooms::RoomPlacement;
pub use spiral::SpiralCarve;
pub use translate::RectanglesToAreas;

/// De-facto component tag conventions shared by the step library.
pub mod tags {
    /// Boolean passability grid (true = floor).
    pub const WALL_FLOOR: &str = "WallFloor";
    /// `ItemList<Rect>` of carved room floor rectangles.
    pub const ROOMS: &str = "Rooms";
    /// `ItemList<Area>` of detected or translated regions.
    pub const AREAS: &str = "Areas";
    /// `ItemList<Area>` of carved tunnels.
    pub const TUNNELS: &str = "Tunnels";
    /// `ItemList<IVec2>` of door positions.
    pub const DOORS: &str = "Doors";
    /// `ItemList<Rect>` of recorded rectangles.
    pub const RECTANGLES: &str = "Rectangles";
}
