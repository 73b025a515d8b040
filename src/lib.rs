//! Lovebeat core crate.
//!
//! Interactive heartbeat sensor for the plush-companion landing page: a
//! press-and-hold canvas surface whose simulated pulse climbs from resting
//! rate while held, counts as "synchronized" after a sustained five-second
//! hold, and decays back to rest on release. The pulse drives a lub-dub
//! audio cue and an ECG-style canvas trace with beat ripples.
//!
//! The simulation itself ([`session`], [`emotion`], plus the pure parts of
//! [`waveform`]) is browser-free and exercised by native tests; the wasm
//! exports below wire it to pointer events, browser timers and the 2d
//! context.

use wasm_bindgen::prelude::*;

pub mod emotion;
pub mod session;
pub mod waveform;

mod audio;
mod timers;
mod widget;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Mount the sensor widget: canvas, pointer listeners and render loop.
#[wasm_bindgen]
pub fn start_heart_sensor() -> Result<(), JsValue> {
    widget::mount()
}

/// Press-start trigger, for hosts that drive the sensor from their own UI
/// instead of the canvas pointer listeners.
#[wasm_bindgen]
pub fn start_heartbeat() {
    widget::press_start();
}

/// Press-end trigger; safe to call when already released.
#[wasm_bindgen]
pub fn stop_heartbeat() {
    widget::press_end();
}

/// Hard reset to the idle state, cancelling any pending timers.
#[wasm_bindgen]
pub fn reset_heartbeat() {
    widget::reset();
}

/// Gate the lub-dub audio cue.
#[wasm_bindgen]
pub fn set_heartbeat_muted(muted: bool) {
    widget::set_muted(muted);
}

/// Current `{ bpm, isActive, isSynced, emotionalState, touchDuration,
/// beatInterval }` record as JSON, for the presentation layer.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn heartbeat_snapshot() -> String {
    widget::snapshot_json()
}
