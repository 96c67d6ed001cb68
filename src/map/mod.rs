//! Level maps: storage, difficulty ranges and procedural generation

pub mod difficulty;
pub mod generator;
pub mod grid;

pub use difficulty::{Tier, WallBudget};
pub use generator::{Direction, LevelType, MapGenerator, Segment, WallReport};
pub use grid::{DoorState, Grid, Tile, TileGrid, TilePlacement};
