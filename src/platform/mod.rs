//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Frame scheduling and delta measurement
//! - Pointer input mapping
//! - Storage (LocalStorage on web)

pub mod frame;
pub mod input;

#[cfg(target_arch = "wasm32")]
pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use frame::{FrameClock, FrameRequest, FrameScheduler, GameLoop, LoopControl, ManualScheduler};
pub use input::pointer_to_playfield;
