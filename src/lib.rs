//! Ski Sats - An endless downhill skiing arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player, world streams, collisions, yeti, run state)
//! - `config`: Data-driven game balance
//! - `platform`: Browser/native platform abstraction (input)
//! - `hud`, `share`, `audio`: Presentation-side consumers of the simulation

pub mod audio;
pub mod config;
pub mod hud;
pub mod platform;
pub mod settings;
pub mod share;
pub mod sim;

pub use config::{GameConfig, ViewMode};
pub use settings::Settings;

/// Frame timing constants
pub mod consts {
    /// Largest frame delta fed into the simulation (seconds).
    ///
    /// A backgrounded tab can report multi-second gaps; one tick that long
    /// would teleport the player past whole obstacle rows.
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta used for the very first frame and by the headless runner
    pub const NOMINAL_DT: f32 = 1.0 / 60.0;
}

/// Make a tick delta safe for the simulation.
///
/// Negative or non-finite deltas become zero: a negative step would walk
/// spawn cursors backwards.
#[inline]
pub fn sanitize_dt(dt: f32) -> f32 {
    if !dt.is_finite() || dt <= 0.0 { 0.0 } else { dt }
}

/// Frame-driver delta: sanitized and capped at `MAX_FRAME_DT`
#[inline]
pub fn frame_dt(raw: f32) -> f32 {
    sanitize_dt(raw).min(consts::MAX_FRAME_DT)
}
