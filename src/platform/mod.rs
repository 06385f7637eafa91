//! Platform abstraction layer
//!
//! Browser event plumbing is kept thin: listeners in `main.rs` feed the
//! pure state here, which the frame loop turns into tick input.

pub mod input;

pub use input::{InputState, TouchSide};
