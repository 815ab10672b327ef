//! Pixel state and core simulation types
//!
//! Everything the frame update reads or mutates lives in `PixelState`.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::color::{Rgb, random_color, random_color_except};
use crate::consts::*;

/// Visible area the pixel lives in (CSS pixels)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Negative or NaN dimensions collapse to zero
    pub fn new(width: f32, height: f32) -> Self {
        let sane = |v: f32| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            width: sane(width),
            height: sane(height),
        }
    }

    /// Largest top-left coordinate that keeps a square of `size` on screen
    pub fn max_corner(&self, size: f32) -> Vec2 {
        Vec2::new(
            (self.width - size).max(0.0),
            (self.height - size).max(0.0),
        )
    }
}

/// Result of the connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectionStatus {
    /// Probe still in flight
    #[default]
    Pending,
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        *self == ConnectionStatus::Connected
    }
}

/// An in-flight color change
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorTransition {
    pub from: Rgb,
    pub to: Rgb,
    pub elapsed_ms: f32,
    pub duration_ms: f32,
}

impl ColorTransition {
    pub fn new(from: Rgb, to: Rgb, duration_ms: f32) -> Self {
        Self {
            from,
            to,
            elapsed_ms: 0.0,
            duration_ms: duration_ms.max(1.0),
        }
    }

    /// Progress in [0, 1]
    pub fn progress(&self) -> f32 {
        (self.elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Color at the current progress
    pub fn current(&self) -> Rgb {
        self.from.lerp(self.to, self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_ms >= self.duration_ms
    }
}

/// Last known pointer state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerState {
    /// None until the pointer has moved over the page (or after it leaves)
    pub position: Option<Vec2>,
    pub pressed: bool,
    /// Host timestamp (ms) of the last press
    pub pressed_at_ms: Option<f64>,
}

/// Complete pixel state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PixelState {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per normalized frame
    pub vel: Vec2,
    pub size: f32,
    /// Displayed color
    pub color: Rgb,
    pub transition: Option<ColorTransition>,
    /// +1 growing, -1 shrinking
    pub pulse_direction: f32,
    pub pulse_step: f32,
    /// Timestamp of the previous frame (ms)
    pub last_timestamp: Option<f64>,
    pub connection: ConnectionStatus,
    pub pointer: PointerState,
    /// 0 = calm, 1 = fully excited
    pub excitement: f32,
}

impl PixelState {
    /// Random placement, heading and color inside `viewport`
    pub fn new<R: Rng>(viewport: Viewport, rng: &mut R) -> Self {
        let max = viewport.max_corner(INITIAL_SIZE);
        let pos = Vec2::new(rng.random::<f32>() * max.x, rng.random::<f32>() * max.y);
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * INITIAL_VELOCITY_SPREAD,
            (rng.random::<f32>() - 0.5) * INITIAL_VELOCITY_SPREAD,
        );

        Self {
            pos,
            vel,
            size: INITIAL_SIZE,
            color: random_color(rng),
            transition: None,
            pulse_direction: 1.0,
            pulse_step: PULSE_STEP,
            last_timestamp: None,
            connection: ConnectionStatus::Pending,
            pointer: PointerState::default(),
            excitement: 0.0,
        }
    }

    /// Center of the dot
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Pulse position: 0 at the smallest size, 1 at the largest
    pub fn pulse_phase(&self) -> f32 {
        ((self.size - PULSE_MIN_SIZE) / (PULSE_MAX_SIZE - PULSE_MIN_SIZE)).clamp(0.0, 1.0)
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        self.connection = status;
    }

    /// Raise excitement, keeping it in [0, 1]
    pub fn excite(&mut self, amount: f32) {
        self.excitement = (self.excitement + amount).clamp(0.0, 1.0);
    }

    /// Begin a transition to a new palette color.
    /// Returns false when one is already running.
    pub fn start_color_transition<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.transition.is_some() {
            return false;
        }
        let target = random_color_except(rng, self.color);
        let duration = rng.random_range(TRANSITION_MIN_MS..TRANSITION_MAX_MS);
        self.transition = Some(ColorTransition::new(self.color, target, duration));
        true
    }

    /// Advance the running transition; swaps to the target when done
    pub fn advance_color(&mut self, elapsed_ms: f32) {
        if let Some(mut transition) = self.transition {
            transition.elapsed_ms += elapsed_ms.max(0.0);
            if transition.is_finished() {
                self.color = transition.to;
                self.transition = None;
            } else {
                self.color = transition.current();
                self.transition = Some(transition);
            }
        }
    }

    /// Pull the pixel back on screen after a viewport change
    pub fn clamp_to(&mut self, viewport: Viewport) {
        let max = viewport.max_corner(self.size);
        self.pos = self.pos.clamp(Vec2::ZERO, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::color::PALETTE;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_viewport_sanitizes_dimensions() {
        let vp = Viewport::new(-10.0, f32::NAN);
        assert_eq!(vp.width, 0.0);
        assert_eq!(vp.height, 0.0);
        assert_eq!(vp.max_corner(4.0), Vec2::ZERO);
    }

    #[test]
    fn test_new_state_is_on_screen() {
        let mut rng = Pcg32::seed_from_u64(42);
        let vp = Viewport::new(800.0, 600.0);
        for _ in 0..100 {
            let state = PixelState::new(vp, &mut rng);
            assert!(state.pos.x >= 0.0 && state.pos.x <= 800.0 - INITIAL_SIZE);
            assert!(state.pos.y >= 0.0 && state.pos.y <= 600.0 - INITIAL_SIZE);
            assert!(state.vel.x.abs() <= INITIAL_VELOCITY_SPREAD / 2.0);
            assert!(state.vel.y.abs() <= INITIAL_VELOCITY_SPREAD / 2.0);
            assert!(PALETTE.contains(&state.color));
            assert_eq!(state.size, INITIAL_SIZE);
            assert_eq!(state.connection, ConnectionStatus::Pending);
        }
    }

    #[test]
    fn test_transition_completes_on_target() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = PixelState::new(Viewport::new(100.0, 100.0), &mut rng);
        let start = state.color;
        assert!(state.start_color_transition(&mut rng));
        let target = state.transition.map(|t| t.to).unwrap();
        assert_ne!(target, start);

        // A second request is ignored while the first runs
        assert!(!state.start_color_transition(&mut rng));

        state.advance_color(0.0);
        assert_eq!(state.color, start);

        state.advance_color(TRANSITION_MAX_MS);
        assert_eq!(state.color, target);
        assert!(state.transition.is_none());
    }

    #[test]
    fn test_transition_progress_is_linear() {
        let from = Rgb::new(0, 0, 0);
        let to = Rgb::new(100, 200, 250);
        let mut t = ColorTransition::new(from, to, 1000.0);
        assert_eq!(t.current(), from);
        t.elapsed_ms = 500.0;
        assert_eq!(t.progress(), 0.5);
        assert_eq!(t.current(), Rgb::new(50, 100, 125));
    }

    #[test]
    fn test_excite_clamps() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut state = PixelState::new(Viewport::new(10.0, 10.0), &mut rng);
        state.excite(5.0);
        assert_eq!(state.excitement, 1.0);
        state.excite(-9.0);
        assert_eq!(state.excitement, 0.0);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut state = PixelState::new(Viewport::new(1000.0, 1000.0), &mut rng);
        state.pos = Vec2::new(900.0, 950.0);
        state.clamp_to(Viewport::new(300.0, 200.0));
        assert_eq!(state.pos, Vec2::new(300.0 - state.size, 200.0 - state.size));
    }
}
