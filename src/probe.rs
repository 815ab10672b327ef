//! Connectivity probe
//!
//! One fire-and-forget request to a fixed address. The answer only changes
//! how often the pixel changes color; failures are logged and forgotten.

use crate::sim::ConnectionStatus;

/// Map a probe outcome onto the cosmetic status, logging it once
pub fn status_from<E: std::fmt::Debug>(url: &str, result: Result<(), E>) -> ConnectionStatus {
    match result {
        Ok(()) => {
            log::info!("Connected to {}", url);
            ConnectionStatus::Connected
        }
        Err(e) => {
            log::warn!("Connection to {} failed: {:?}", url, e);
            ConnectionStatus::Disconnected
        }
    }
}

/// Probe `url` once.
///
/// Uses `fetch` in `no-cors` mode, so any response (even an opaque one)
/// counts as reachable and only a network error counts as a failure.
#[cfg(target_arch = "wasm32")]
pub async fn check(url: &str) -> ConnectionStatus {
    status_from(url, fetch_no_cors(url).await)
}

#[cfg(target_arch = "wasm32")]
async fn fetch_no_cors(url: &str) -> Result<(), wasm_bindgen::JsValue> {
    use wasm_bindgen::JsValue;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode};

    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::NoCors);
    let request = Request::new_with_str_and_init(url, &opts)?;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    JsFuture::from(window.fetch_with_request(&request)).await?;
    Ok(())
}

/// Native builds have no fetch; the pixel runs disconnected
#[cfg(not(target_arch = "wasm32"))]
pub async fn check(url: &str) -> ConnectionStatus {
    status_from(url, Err("network probe is only available in the browser"))
}
