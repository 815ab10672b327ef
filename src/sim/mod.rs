//! Pixel simulation module
//!
//! All behavior lives here, free of any host dependency:
//! - Randomness comes from the caller's `Rng`
//! - Time arrives as normalized frame deltas
//! - No rendering or platform code

pub mod color;
pub mod pointer;
pub mod state;
pub mod tick;

pub use color::{PALETTE, Rgb};
pub use pointer::{PointerEvent, Proximity, TouchGuard};
pub use state::{ColorTransition, ConnectionStatus, PixelState, PointerState, Viewport};
pub use tick::{FrameInput, frame_delta, tick};
