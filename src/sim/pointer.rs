//! Pointer interaction
//!
//! The pixel shies away from a pointer that gets too close, is mildly curious
//! about one at medium range, and ignores it when far away. Presses raise its
//! excitement, which then decays frame by frame.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{PixelState, PointerState};
use crate::consts::*;
use crate::{direction_or, unit_from_angle};

/// Pointer events gathered by the host between frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Moved(Vec2),
    Pressed(Vec2),
    Released,
    /// Pointer left the page
    Left,
}

/// How the pointer currently affects the pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Proximity {
    /// Within `REPEL_RADIUS`
    Near,
    /// Within `ATTRACT_RADIUS`
    Medium,
    Far,
}

impl Proximity {
    pub fn from_distance(distance: f32) -> Self {
        if distance < REPEL_RADIUS {
            Proximity::Near
        } else if distance < ATTRACT_RADIUS {
            Proximity::Medium
        } else {
            Proximity::Far
        }
    }
}

/// Apply one pointer event. `now_ms` is the host timestamp of the frame.
pub fn handle_event<R: Rng>(state: &mut PixelState, event: PointerEvent, now_ms: f64, rng: &mut R) {
    match event {
        PointerEvent::Moved(pos) => {
            state.pointer.position = Some(pos);
        }
        PointerEvent::Pressed(pos) => {
            state.pointer.position = Some(pos);
            state.pointer.pressed = true;
            state.pointer.pressed_at_ms = Some(now_ms);

            let center = state.center();
            if center.distance(pos) < CLICK_RADIUS {
                // Poked directly: dart off and flash a new color
                state.excitement = 1.0;
                let fallback = unit_from_angle(rng.random_range(0.0..std::f32::consts::TAU));
                state.vel += direction_or(pos, center, fallback) * CLICK_KICK;
                state.transition = None;
                state.start_color_transition(rng);
                log::debug!("Pixel poked at ({:.0}, {:.0})", pos.x, pos.y);
            } else {
                state.excite(PRESS_EXCITEMENT);
            }
        }
        PointerEvent::Released => {
            state.pointer.pressed = false;
        }
        PointerEvent::Left => {
            state.pointer.position = None;
            state.pointer.pressed = false;
        }
    }
}

/// Drops the mouse events a browser synthesizes right after a touch, so a
/// tap is handled once rather than as a touch and then again as a click.
#[derive(Debug, Clone, Copy, Default)]
pub struct TouchGuard {
    last_touch_ms: Option<f64>,
}

impl TouchGuard {
    /// Record a touch event at host time `now_ms`
    pub fn touched(&mut self, now_ms: f64) {
        self.last_touch_ms = Some(now_ms);
    }

    /// Whether a mouse event at `now_ms` comes from a real mouse
    pub fn accepts_mouse(&self, now_ms: f64) -> bool {
        match self.last_touch_ms {
            Some(at) => now_ms - at >= TOUCH_MOUSE_SUPPRESS_MS,
            None => true,
        }
    }
}

/// Per-frame chance of a nudge toward a pointer at medium range.
/// A press only makes the pixel eager while it is recent.
pub fn attract_chance(pointer: &PointerState, now_ms: f64) -> f64 {
    let fresh_press = pointer.pressed
        && pointer
            .pressed_at_ms
            .is_some_and(|at| now_ms - at < PRESS_ATTRACT_WINDOW_MS);
    if fresh_press {
        PRESSED_ATTRACT_CHANCE
    } else {
        ATTRACT_CHANCE
    }
}

/// Proximity forces for this frame
pub fn apply_proximity<R: Rng>(
    state: &mut PixelState,
    dt: f32,
    now_ms: f64,
    rng: &mut R,
) -> Option<Proximity> {
    let pointer = state.pointer.position?;
    let center = state.center();
    let distance = center.distance(pointer);
    let proximity = Proximity::from_distance(distance);

    match proximity {
        Proximity::Near => {
            let fallback = unit_from_angle(rng.random_range(0.0..std::f32::consts::TAU));
            let away = direction_or(pointer, center, fallback);
            let falloff = 1.0 - distance / REPEL_RADIUS;
            state.vel += away * REPEL_STRENGTH * falloff * dt;
            state.excite(PROXIMITY_EXCITEMENT * dt);
        }
        Proximity::Medium => {
            if rng.random_bool(attract_chance(&state.pointer, now_ms)) {
                let toward = direction_or(center, pointer, Vec2::ZERO);
                state.vel += toward * ATTRACT_STRENGTH * dt;
            }
        }
        Proximity::Far => {}
    }

    Some(proximity)
}

/// Let excitement fade
pub fn decay_excitement(state: &mut PixelState, dt: f32) {
    state.excite(-EXCITEMENT_DECAY * dt);
}
