//! Simulation data model
//!
//! Entities, run phases, run results and the typed lifecycle events the run
//! controller emits. Positions use `Vec2` with `x` = lateral offset from the
//! slope center and `y` = forward distance down the slope.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    Menu,
    /// Run in progress
    Playing,
    /// Run ended against a tree, rock or wall
    Crashed,
    /// Run ended in the yeti's arms
    Caught,
}

impl GamePhase {
    /// True for the two end-of-run phases
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Crashed | GamePhase::Caught)
    }
}

/// Spacing cue on the snow; no gameplay effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainMarker {
    pub pos: Vec2,
}

/// Visual variety for obstacles (rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    PineTree,
    SnowyTree,
    Rock,
}

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 3] = [
        ObstacleKind::PineTree,
        ObstacleKind::SnowyTree,
        ObstacleKind::Rock,
    ];
}

/// A run-ending obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub pos: Vec2,
}

/// A sats token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: u32,
    pub pos: Vec2,
}

/// A shrub; burns when hit fast, slows the skier when hit slow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shrub {
    pub id: u32,
    pub pos: Vec2,
    pub on_fire: bool,
    /// Set once a collision has been resolved against this shrub
    pub processed: bool,
}

/// Which slope edge a wall stands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// One half of a symmetric wall pair at the slope edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryWall {
    pub id: u32,
    pub side: WallSide,
    pub pos: Vec2,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminationReason {
    Obstacle,
    Yeti,
}

/// Immutable summary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    /// 1-based run counter within this session
    pub run: u32,
    pub distance: f32,
    /// Seconds spent in `Playing`
    #[serde(rename = "time")]
    pub elapsed: f32,
    pub sats: u32,
    pub reason: TerminationReason,
}

/// Discrete things that happened during a tick.
///
/// Audio, HUD and the sharing panel consume these; the simulation never
/// waits on whoever receives them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// A new run began at `start_distance`; `started_at` is the session clock (s)
    RunStarted {
        run: u32,
        started_at: f64,
        start_distance: f32,
    },
    /// `count` coins picked up this tick, `sats` is the new run total
    CoinsCollected { count: u32, sats: u32 },
    ShrubIgnited { id: u32 },
    /// Slow hit; `speed` is the player's speed after the slowdown
    ShrubThudded { id: u32, speed: f32 },
    YetiAppeared,
    YetiCaught,
    ObstacleCrash,
    RunEnded(RunStats),
}

/// Receiver for simulation events.
///
/// Emission is fire-and-forget: implementations must not fail back into the
/// simulation.
pub trait EventSink {
    fn emit(&mut self, event: GameEvent);
}

impl EventSink for Vec<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        self.push(event);
    }
}

impl EventSink for std::sync::mpsc::Sender<GameEvent> {
    fn emit(&mut self, event: GameEvent) {
        if self.send(event).is_err() {
            log::debug!("Event receiver dropped; discarding event");
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: GameEvent) {}
}
