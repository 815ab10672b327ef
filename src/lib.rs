//! Conscious Pixel - a small dot that wanders around a web page
//!
//! Core modules:
//! - `sim`: Per-frame simulation (motion, pulsing, color, pointer reactions)
//! - `renderer`: Host rendering behind the `PixelRenderer` trait
//! - `probe`: Best-effort connectivity check
//! - `settings`: User preferences persisted in LocalStorage

pub mod probe;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use renderer::{PixelFrame, PixelRenderer};
pub use settings::Settings;

use glam::Vec2;

/// Tuning constants
pub mod consts {
    /// Milliseconds in one normalized frame (deltas are measured in these)
    pub const FRAME_MS: f64 = 16.0;
    /// Largest frame delta applied in one update (backgrounded tabs)
    pub const MAX_FRAME_DELTA: f32 = 4.0;

    /// Initial velocity spread per axis: (rand - 0.5) * spread
    pub const INITIAL_VELOCITY_SPREAD: f32 = 1.5;
    /// Base velocity cap (pixels per frame)
    pub const MAX_VELOCITY: f32 = 3.0;
    /// Per-frame relaxation toward the base cap when calm
    pub const VELOCITY_RELAX: f32 = 0.05;

    /// Edge bounce: reflected velocity is scaled by MIN + rand * SPREAD
    pub const BOUNCE_DAMP_MIN: f32 = 0.9;
    pub const BOUNCE_DAMP_SPREAD: f32 = 0.2;
    /// Sideways kick added to the other axis on a bounce
    pub const BOUNCE_KICK: f32 = 0.5;
    /// Distance kept from an edge after a bounce
    pub const EDGE_INSET: f32 = 1.0;

    /// Chance per frame of a random direction change
    pub const WANDER_CHANCE: f64 = 0.03;
    pub const WANDER_KICK: f32 = 0.8;

    /// Pulse bounds and speed
    pub const INITIAL_SIZE: f32 = 4.0;
    pub const PULSE_MIN_SIZE: f32 = 3.5;
    pub const PULSE_MAX_SIZE: f32 = 6.0;
    pub const PULSE_STEP: f32 = 0.03;
    /// Extra pulse speed at full excitement (multiplier - 1)
    pub const EXCITED_PULSE_GAIN: f32 = 2.0;

    /// Chance of a color change at each pulse peak
    pub const COLOR_CHANGE_CHANCE: f64 = 0.08;
    pub const CONNECTED_COLOR_CHANGE_CHANCE: f64 = 0.2;
    /// Color transition duration range (ms)
    pub const TRANSITION_MIN_MS: f32 = 400.0;
    pub const TRANSITION_MAX_MS: f32 = 1200.0;

    /// Pointer interaction radii (measured from the pixel center)
    pub const REPEL_RADIUS: f32 = 80.0;
    pub const ATTRACT_RADIUS: f32 = 250.0;
    pub const CLICK_RADIUS: f32 = 24.0;
    /// Pointer forces
    pub const REPEL_STRENGTH: f32 = 0.6;
    pub const ATTRACT_STRENGTH: f32 = 0.15;
    pub const ATTRACT_CHANCE: f64 = 0.05;
    pub const PRESSED_ATTRACT_CHANCE: f64 = 0.25;
    /// How long a held press keeps the higher attraction chance (ms)
    pub const PRESS_ATTRACT_WINDOW_MS: f64 = 1500.0;
    /// Mouse events this soon after a touch are the browser's emulation (ms)
    pub const TOUCH_MOUSE_SUPPRESS_MS: f64 = 800.0;
    /// Outward kick when the pixel itself is clicked
    pub const CLICK_KICK: f32 = 2.0;

    /// Excitement gained per frame while the pointer is very close
    pub const PROXIMITY_EXCITEMENT: f32 = 0.04;
    /// Excitement gained by a press away from the pixel
    pub const PRESS_EXCITEMENT: f32 = 0.3;
    /// Excitement lost per frame
    pub const EXCITEMENT_DECAY: f32 = 0.01;

    /// Default connectivity probe target
    pub const PROBE_URL: &str = "https://noesis.run";
}

/// Unit vector pointing from `from` to `to`, or a fallback when they coincide
#[inline]
pub fn direction_or(from: Vec2, to: Vec2, fallback: Vec2) -> Vec2 {
    (to - from).try_normalize().unwrap_or(fallback)
}

/// Unit vector at `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}
