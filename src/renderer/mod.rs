//! Host rendering
//!
//! The simulation never touches the page. Each frame the host turns the
//! state into a `PixelFrame` and hands it to a `PixelRenderer`.

#[cfg(target_arch = "wasm32")]
pub mod dom;

#[cfg(target_arch = "wasm32")]
pub use dom::DomRenderer;

use serde::{Deserialize, Serialize};

use crate::sim::{PixelState, Rgb};

/// Opacity range driven by the pulse
const BASE_OPACITY: f32 = 0.55;
const PULSE_OPACITY: f32 = 0.35;
const EXCITED_OPACITY: f32 = 0.1;

/// Everything needed to draw one frame of the pixel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PixelFrame {
    pub left: f32,
    pub top: f32,
    pub size: f32,
    pub color: Rgb,
    /// Blur radius of the glow
    pub glow: f32,
    pub opacity: f32,
    pub connected: bool,
}

impl PixelFrame {
    pub fn from_state(state: &PixelState) -> Self {
        let opacity = BASE_OPACITY
            + PULSE_OPACITY * state.pulse_phase()
            + EXCITED_OPACITY * state.excitement;
        Self {
            left: state.pos.x,
            top: state.pos.y,
            size: state.size,
            color: state.color,
            glow: state.size * 2.0,
            opacity: opacity.clamp(0.0, 1.0),
            connected: state.connection.is_connected(),
        }
    }

    /// CSS `box-shadow` value for the glow
    pub fn box_shadow(&self) -> String {
        format!("0 0 {:.2}px {}", self.glow, self.color.to_css())
    }
}

/// Something that can draw the pixel
pub trait PixelRenderer {
    fn render(&mut self, frame: &PixelFrame);
}

/// Renderer for headless runs: logs every `every`-th frame at debug level
#[derive(Debug)]
pub struct LogRenderer {
    pub frames: u64,
    /// Never zero
    every: u64,
    pub last: Option<PixelFrame>,
}

impl Default for LogRenderer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl LogRenderer {
    pub fn new(every: u64) -> Self {
        Self {
            frames: 0,
            every: every.max(1),
            last: None,
        }
    }
}

impl PixelRenderer for LogRenderer {
    fn render(&mut self, frame: &PixelFrame) {
        if self.frames % self.every == 0 {
            log::debug!(
                "frame {}: ({:.1}, {:.1}) size {:.2} {} opacity {:.2}",
                self.frames,
                frame.left,
                frame.top,
                frame.size,
                frame.color.to_css(),
                frame.opacity
            );
        }
        self.frames += 1;
        self.last = Some(frame.clone());
    }
}
