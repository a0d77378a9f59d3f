#![forbid(unsafe_code)]
//! map_weave: composable, steppable map generation for grid-based games.
//!
//! Modules:
//! - context: generation context, typed component store, provenance item lists
//! - generation: the step contract and the generator driver
//! - steps: the concrete generation step library (rooms, mazes, caves, doors, ...)
//! - connection: pluggable area-connection strategies (point selectors, tunnel creators)
//! - grid/geometry/area/disjoint_set: the grid views and spatial primitives the steps build on
//!
//! For runnable demos, see the `map_weave_examples` crate.
pub mod area;
pub mod connection;
pub mod context;
pub mod disjoint_set;
pub mod error;
pub mod generation;
pub mod geometry;
pub mod grid;
pub mod rng;
pub mod steps;

/// Convenient re-exports for common types. Import with `use map_weave::prelude::*;`.
pub mod prelude {
    pub use crate::area::Area;
    pub use crate::connection::{
        CenterBoundsSelector, ClosestPositionsSelector, ConnectionPointSelector,
        DirectLineTunnel, HorizontalVerticalTunnel, RandomPositionSelector, TunnelCreator,
    };
    pub use crate::context::items::ItemList;
    pub use crate::context::store::{ComponentStore, ViewCaster};
    pub use crate::context::GenerationContext;
    pub use crate::disjoint_set::{DisjointSet, Union};
    pub use crate::error::{Error, Result};
    pub use crate::generation::generator::{Generator, GeneratorState, StageInfo, Stages};
    pub use crate::generation::{ComponentRequirement, GenerationStep, Progress, StepRunner};
    pub use crate::geometry::{Adjacency, Distance, Rect};
    pub use crate::grid::{grid_caster, Grid, GridView, GridViewMut};
    pub use crate::steps::{
        tags, AreaDetection, CellularAutomataSmooth, ClosestAreaConnection, DeadEndTrim,
        DoorPlacement, MazeCarve, ParallelogramCarve, RandomFill, RectangleCarve,
        RectanglesToAreas, RoomPlacement, SpiralCarve, INFINITE_TRIM_ITERATIONS,
    };
}
