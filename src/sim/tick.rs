//! Per-frame simulation update
//!
//! Advances the pixel by one display frame: pointer reactions, motion,
//! wandering, pulsing, edge bounces and color blending.

use glam::Vec2;
use rand::Rng;

use super::pointer::{self, PointerEvent};
use super::state::{ConnectionStatus, PixelState, Viewport};
use crate::consts::*;

/// Input gathered by the host since the previous frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Pointer events in arrival order
    pub events: Vec<PointerEvent>,
    /// Host timestamp of this frame (ms)
    pub now_ms: f64,
}

impl FrameInput {
    pub fn at(now_ms: f64) -> Self {
        Self {
            events: Vec::new(),
            now_ms,
        }
    }

    pub fn push(&mut self, event: PointerEvent) {
        self.events.push(event);
    }

    /// Drop consumed events, keep the buffer
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

/// Elapsed time since the previous frame, in normalized 16 ms frames.
///
/// The first frame counts as 1. Out-of-order or non-finite timestamps give 0,
/// and long gaps are capped at `MAX_FRAME_DELTA`.
pub fn frame_delta(state: &mut PixelState, timestamp_ms: f64) -> f32 {
    let delta = match state.last_timestamp {
        Some(last) => ((timestamp_ms - last) / FRAME_MS) as f32,
        None => 1.0,
    };
    if timestamp_ms.is_finite() {
        state.last_timestamp = Some(timestamp_ms);
    }
    if delta.is_finite() {
        delta.clamp(0.0, MAX_FRAME_DELTA)
    } else {
        0.0
    }
}

/// Advance the pixel by `dt` normalized frames
pub fn tick<R: Rng>(
    state: &mut PixelState,
    input: &FrameInput,
    viewport: Viewport,
    dt: f32,
    rng: &mut R,
) {
    let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DELTA) } else { 0.0 };

    for event in &input.events {
        pointer::handle_event(state, *event, input.now_ms, rng);
    }
    pointer::apply_proximity(state, dt, input.now_ms, rng);

    state.pos += state.vel * dt;

    // Occasionally change direction so the path never looks scripted
    if rng.random_bool(WANDER_CHANCE) {
        state.vel.x += (rng.random::<f32>() - 0.5) * WANDER_KICK;
        state.vel.y += (rng.random::<f32>() - 0.5) * WANDER_KICK;
    }

    pulse(state, dt, rng);
    bounce(state, viewport, rng);

    state.advance_color(dt * FRAME_MS as f32);
    pointer::decay_excitement(state, dt);

    // Last, so bounces and the excitement decay above cannot leave it over the cap
    limit_velocity(state, dt);
}

/// Chance that a pulse peak starts a color change
pub fn color_change_chance(connection: ConnectionStatus) -> f64 {
    if connection.is_connected() {
        CONNECTED_COLOR_CHANGE_CHANCE
    } else {
        COLOR_CHANGE_CHANCE
    }
}

/// Relax toward the base speed cap, then enforce the excitement-scaled cap
fn limit_velocity(state: &mut PixelState, dt: f32) {
    let speed = state.vel.length();
    if speed > MAX_VELOCITY {
        let relax = (VELOCITY_RELAX * (1.0 - state.excitement) * dt).clamp(0.0, 1.0);
        let target = speed + (MAX_VELOCITY - speed) * relax;
        state.vel *= target / speed;
    }

    let cap = MAX_VELOCITY * (1.0 + state.excitement);
    state.vel = state.vel.clamp_length_max(cap);
}

/// Grow and shrink between the pulse bounds; peaks may trigger a color change
fn pulse<R: Rng>(state: &mut PixelState, dt: f32, rng: &mut R) {
    let speed = 1.0 + state.excitement * EXCITED_PULSE_GAIN;
    state.size += state.pulse_step * state.pulse_direction * dt * speed;

    if state.size > PULSE_MAX_SIZE {
        state.size = PULSE_MAX_SIZE;
        state.pulse_direction = -1.0;

        if rng.random_bool(color_change_chance(state.connection)) {
            state.start_color_transition(rng);
        }
    } else if state.size < PULSE_MIN_SIZE {
        state.size = PULSE_MIN_SIZE;
        state.pulse_direction = 1.0;
    }
}

/// Reflect off the viewport edges with a slightly randomized response
fn bounce<R: Rng>(state: &mut PixelState, viewport: Viewport, rng: &mut R) {
    let max = viewport.max_corner(state.size);

    if state.pos.x <= 0.0 || state.pos.x >= max.x {
        state.vel.x = -state.vel.x * (BOUNCE_DAMP_MIN + rng.random::<f32>() * BOUNCE_DAMP_SPREAD);
        state.vel.y += (rng.random::<f32>() - 0.5) * BOUNCE_KICK;
        state.pos.x = inset(state.pos.x, max.x);
    }

    if state.pos.y <= 0.0 || state.pos.y >= max.y {
        state.vel.y = -state.vel.y * (BOUNCE_DAMP_MIN + rng.random::<f32>() * BOUNCE_DAMP_SPREAD);
        state.vel.x += (rng.random::<f32>() - 0.5) * BOUNCE_KICK;
        state.pos.y = inset(state.pos.y, max.y);
    }

    // NaN from a degenerate viewport collapses to the origin
    if !state.pos.is_finite() {
        state.pos = Vec2::ZERO;
    }
}

/// Move a coordinate that touched an edge just inside [0, max]
fn inset(value: f32, max: f32) -> f32 {
    if value <= 0.0 {
        EDGE_INSET.min(max)
    } else {
        (max - EDGE_INSET).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::color::Rgb;
    use crate::sim::state::ColorTransition;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn pixel_at(pos: Vec2, vel: Vec2, rng: &mut Pcg32) -> PixelState {
        let mut state = PixelState::new(Viewport::new(800.0, 600.0), rng);
        state.pos = pos;
        state.vel = vel;
        state
    }

    #[test]
    fn test_first_frame_delta_is_one() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut state = PixelState::new(Viewport::new(100.0, 100.0), &mut rng);
        assert_eq!(frame_delta(&mut state, 5000.0), 1.0);
        assert_eq!(frame_delta(&mut state, 5032.0), 2.0);
        assert_eq!(state.last_timestamp, Some(5032.0));
    }

    #[test]
    fn test_frame_delta_capped_and_non_negative() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut state = PixelState::new(Viewport::new(100.0, 100.0), &mut rng);
        frame_delta(&mut state, 1000.0);
        assert_eq!(frame_delta(&mut state, 60_000.0), MAX_FRAME_DELTA);
        assert_eq!(frame_delta(&mut state, 100.0), 0.0);
        assert_eq!(frame_delta(&mut state, f64::NAN), 0.0);
        assert_eq!(state.last_timestamp, Some(100.0));
    }

    #[test]
    fn test_moves_by_velocity() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::new(1.0, -0.5), &mut rng);
        tick(&mut state, &FrameInput::default(), Viewport::new(800.0, 600.0), 2.0, &mut rng);
        // Wander may nudge velocity after integration but not this frame's step
        assert!((state.pos.x - 402.0).abs() < 1e-4);
        assert!((state.pos.y - 299.0).abs() < 1e-4);
    }

    #[test]
    fn test_bounces_off_right_edge() {
        let mut rng = Pcg32::seed_from_u64(4);
        let vp = Viewport::new(800.0, 600.0);
        let mut state = pixel_at(Vec2::new(795.0, 300.0), Vec2::new(2.5, 0.0), &mut rng);
        tick(&mut state, &FrameInput::default(), vp, 1.0, &mut rng);

        assert!(state.vel.x < 0.0, "velocity reflected");
        assert!(state.pos.x <= vp.width - state.size);
        assert!(state.pos.x >= vp.width - state.size - EDGE_INSET - 1e-3);
    }

    #[test]
    fn test_bounces_off_top_edge() {
        let mut rng = Pcg32::seed_from_u64(5);
        let vp = Viewport::new(800.0, 600.0);
        let mut state = pixel_at(Vec2::new(300.0, 0.5), Vec2::new(0.0, -2.0), &mut rng);
        tick(&mut state, &FrameInput::default(), vp, 1.0, &mut rng);

        assert!(state.vel.y > 0.0);
        assert_eq!(state.pos.y, EDGE_INSET);
    }

    #[test]
    fn test_bounce_never_leaves_speed_over_cap() {
        let vp = Viewport::new(800.0, 600.0);
        for seed in 0..200 {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut state = pixel_at(Vec2::new(795.0, 300.0), Vec2::new(MAX_VELOCITY, 0.0), &mut rng);
            state.excitement = 0.0;
            tick(&mut state, &FrameInput::default(), vp, 1.0, &mut rng);

            let cap = MAX_VELOCITY * (1.0 + state.excitement);
            assert!(
                state.vel.length() <= cap + 1e-4,
                "seed {}: speed {} over cap {}",
                seed,
                state.vel.length(),
                cap
            );
            assert!(state.vel.x < 0.0);
        }
    }

    #[test]
    fn test_connection_sets_color_cadence() {
        assert_eq!(color_change_chance(ConnectionStatus::Connected), CONNECTED_COLOR_CHANGE_CHANCE);
        assert_eq!(color_change_chance(ConnectionStatus::Disconnected), COLOR_CHANGE_CHANCE);
        assert_eq!(color_change_chance(ConnectionStatus::Pending), COLOR_CHANGE_CHANCE);
    }

    #[test]
    fn test_connected_pixel_changes_color_more_often() {
        let peaks = 2000;
        let count_changes = |status: ConnectionStatus| {
            let mut rng = Pcg32::seed_from_u64(21);
            let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::ZERO, &mut rng);
            state.set_connection(status);
            let mut started = 0;
            for _ in 0..peaks {
                state.transition = None;
                state.size = PULSE_MAX_SIZE - 0.001;
                state.pulse_direction = 1.0;
                pulse(&mut state, 1.0, &mut rng);
                if state.transition.is_some() {
                    started += 1;
                }
            }
            started
        };

        let connected = count_changes(ConnectionStatus::Connected);
        let disconnected = count_changes(ConnectionStatus::Disconnected);
        let pending = count_changes(ConnectionStatus::Pending);

        // Expected around 400 vs 160 peaks
        assert!(connected > 300 && connected < 500, "connected: {}", connected);
        assert!(disconnected > 100 && disconnected < 220, "disconnected: {}", disconnected);
        assert!(pending > 100 && pending < 220, "pending: {}", pending);
    }

    #[test]
    fn test_velocity_capped() {
        let mut rng = Pcg32::seed_from_u64(6);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::new(50.0, 50.0), &mut rng);
        tick(&mut state, &FrameInput::default(), Viewport::new(800.0, 600.0), 1.0, &mut rng);
        assert!(state.vel.length() <= MAX_VELOCITY * (1.0 + state.excitement) + 1e-4);
    }

    #[test]
    fn test_calm_pixel_relaxes_to_base_speed() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::new(5.0, 0.0), &mut rng);
        state.excitement = 0.0;
        limit_velocity(&mut state, 1.0);
        assert!(state.vel.length() <= MAX_VELOCITY + 1e-4);

        // Excited: allowed to go faster, relaxes only partially
        state.vel = Vec2::new(5.0, 0.0);
        state.excitement = 1.0;
        limit_velocity(&mut state, 1.0);
        assert!((state.vel.length() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_pulse_reverses_at_bounds() {
        let mut rng = Pcg32::seed_from_u64(8);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::ZERO, &mut rng);
        state.size = PULSE_MAX_SIZE - 0.01;
        state.pulse_direction = 1.0;
        pulse(&mut state, 1.0, &mut rng);
        assert_eq!(state.size, PULSE_MAX_SIZE);
        assert_eq!(state.pulse_direction, -1.0);

        state.size = PULSE_MIN_SIZE + 0.01;
        pulse(&mut state, 1.0, &mut rng);
        assert_eq!(state.size, PULSE_MIN_SIZE);
        assert_eq!(state.pulse_direction, 1.0);
    }

    #[test]
    fn test_excitement_speeds_up_pulse() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut calm = pixel_at(Vec2::new(400.0, 300.0), Vec2::ZERO, &mut rng);
        calm.size = 4.0;
        let mut excited = calm.clone();
        excited.excitement = 1.0;

        pulse(&mut calm, 1.0, &mut rng);
        pulse(&mut excited, 1.0, &mut rng);
        let calm_growth = calm.size - 4.0;
        let excited_growth = excited.size - 4.0;
        assert!((excited_growth - calm_growth * (1.0 + EXCITED_PULSE_GAIN)).abs() < 1e-5);
    }

    #[test]
    fn test_color_transition_runs_over_frames() {
        let mut rng = Pcg32::seed_from_u64(10);
        let vp = Viewport::new(800.0, 600.0);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::ZERO, &mut rng);
        let from = Rgb::new(0, 0, 0);
        let to = Rgb::new(160, 160, 160);
        state.color = from;
        state.transition = Some(ColorTransition::new(from, to, 160.0));

        // 5 frames of 16 ms = halfway (wander could move the pixel, not the color)
        for _ in 0..5 {
            tick(&mut state, &FrameInput::default(), vp, 1.0, &mut rng);
        }
        assert_eq!(state.color, Rgb::new(80, 80, 80));

        for _ in 0..5 {
            tick(&mut state, &FrameInput::default(), vp, 1.0, &mut rng);
        }
        assert_eq!(state.color, to);
        assert!(state.transition.is_none());
    }

    #[test]
    fn test_press_in_input_is_applied() {
        let mut rng = Pcg32::seed_from_u64(11);
        let vp = Viewport::new(800.0, 600.0);
        let mut state = pixel_at(Vec2::new(400.0, 300.0), Vec2::ZERO, &mut rng);
        let mut input = FrameInput::at(42.0);
        input.push(PointerEvent::Pressed(state.center()));
        tick(&mut state, &input, vp, 1.0, &mut rng);

        assert!(state.pointer.pressed);
        // Full excitement minus one frame of decay
        assert!((state.excitement - (1.0 - EXCITEMENT_DECAY)).abs() < 1e-5);
    }

    #[test]
    fn test_zero_viewport_pins_to_origin() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut state = pixel_at(Vec2::new(10.0, 10.0), Vec2::new(1.0, 1.0), &mut rng);
        for _ in 0..20 {
            tick(&mut state, &FrameInput::default(), Viewport::new(0.0, 0.0), 1.0, &mut rng);
            assert_eq!(state.pos, Vec2::ZERO);
        }
    }

    fn any_point() -> impl Strategy<Value = Vec2> {
        (-100.0f32..2100.0, -100.0f32..2100.0).prop_map(|(x, y)| Vec2::new(x, y))
    }

    fn any_event() -> impl Strategy<Value = PointerEvent> {
        prop_oneof![
            any_point().prop_map(PointerEvent::Moved),
            any_point().prop_map(PointerEvent::Pressed),
            Just(PointerEvent::Released),
            Just(PointerEvent::Left),
        ]
    }

    proptest! {
        #[test]
        fn invariants_hold_for_any_frames(
            seed in any::<u64>(),
            width in 0.0f32..2000.0,
            height in 0.0f32..2000.0,
            frames in prop::collection::vec(
                (0.0f32..6.0, prop::collection::vec(any_event(), 0..3)),
                1..60,
            ),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let vp = Viewport::new(width, height);
            let mut state = PixelState::new(vp, &mut rng);
            let mut now = 0.0;

            for (dt, events) in frames {
                now += dt as f64 * FRAME_MS;
                let input = FrameInput { events, now_ms: now };
                tick(&mut state, &input, vp, dt, &mut rng);

                let max = vp.max_corner(state.size);
                prop_assert!(state.pos.x >= 0.0 && state.pos.x <= max.x);
                prop_assert!(state.pos.y >= 0.0 && state.pos.y <= max.y);
                prop_assert!(state.pos.x <= vp.width && state.pos.y <= vp.height);
                prop_assert!(state.size >= PULSE_MIN_SIZE && state.size <= PULSE_MAX_SIZE);
                prop_assert!(state.excitement >= 0.0 && state.excitement <= 1.0);
                prop_assert!(
                    state.vel.length() <= MAX_VELOCITY * (1.0 + state.excitement) + 1e-4
                );
            }
        }
    }
}
