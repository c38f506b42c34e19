//! `cq-map`: city grid, tile legend, and pathfinding.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                    |
//! |----------------|-------------------------------------------------------------|
//! | [`map`]        | `GridMap` (SoA walkability + surface cost), `GridMapBuilder`, `TileInfo` |
//! | [`pathfinder`] | `Pathfinder` trait, `GridPath`, `AStarPathfinder`           |
//! | [`loader`]     | `MapRecord`, `load_map_reader`, `load_map_json`             |
//! | [`error`]      | `MapError`, `MapResult<T>`                                  |
//!
//! The map is read-only once built.  Both couriers and the AI planner query
//! it through shared references.

pub mod error;
pub mod loader;
pub mod map;
pub mod pathfinder;


pub use error::{MapError, MapResult};
pub use loader::{LegendRecord, MapRecord, TileRow, load_map_json, load_map_reader};
pub use map::{BuildingBlock, GridMap, GridMapBuilder, TileInfo};
pub use pathfinder::{AStarPathfinder, GridPath, Pathfinder};
