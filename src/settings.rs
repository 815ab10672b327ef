//! Pixel settings and preferences
//!
//! Read from a JSON blob the page stores in LocalStorage. Anything missing
//! or unreadable falls back to the defaults.

use serde::{Deserialize, Serialize};

use crate::consts::PROBE_URL;

/// Frame delta multiplier applied when reduced motion is requested
const REDUCED_MOTION_SCALE: f32 = 0.25;

/// Pixel settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Show the pixel at all
    pub enabled: bool,
    /// Slow the animation down (accessibility)
    pub reduced_motion: bool,
    /// React to the pointer
    pub pointer_reactions: bool,

    // === Connectivity ===
    /// Run the connectivity probe at startup
    pub probe_enabled: bool,
    /// Probe target
    pub probe_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            reduced_motion: false,
            pointer_reactions: true,
            probe_enabled: true,
            probe_url: PROBE_URL.to_string(),
        }
    }
}

impl Settings {
    /// Frame delta after applying motion preferences
    pub fn effective_delta(&self, dt: f32) -> f32 {
        if self.reduced_motion {
            dt * REDUCED_MOTION_SCALE
        } else {
            dt
        }
    }

    /// Parse a stored settings blob
    pub fn from_json(json: &str) -> Option<Self> {
        match serde_json::from_str(json) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {}", e);
                None
            }
        }
    }

    /// LocalStorage key
    const STORAGE_KEY: &'static str = "conscious_pixel_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Some(settings) = Self::from_json(&json) {
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native: read `CONSCIOUS_PIXEL_SETTINGS` (a JSON blob) if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        std::env::var(Self::STORAGE_KEY.to_uppercase())
            .ok()
            .and_then(|json| Self::from_json(&json))
            .unwrap_or_default()
    }
}
