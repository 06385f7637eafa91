//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only, threaded through explicitly
//! - Stable iteration order (insertion order within each stream)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod player;
pub mod state;
pub mod tick;
pub mod world;
pub mod yeti;

pub use player::{Player, Steer};
pub use state::{
    BoundaryWall, Coin, EventSink, GameEvent, GamePhase, NullSink, Obstacle, ObstacleKind,
    RunStats, Shrub, TerminationReason, TerrainMarker, WallSide,
};
pub use tick::{FrameSnapshot, GameState, TickInput, tick};
pub use world::{SpawnCursor, Stream, World, advance_stream};
pub use yeti::{Yeti, YetiPhase};
