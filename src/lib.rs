//! Super Robot Team core crate.
//!
//! Interactive robot widgets (eye toggle, limb recolor, speak + blink, ambient
//! glow) with synthesized sound cues, over a drifting particle backdrop.
//! Browser glue lives in `page`, `frame`, `robot::dom` and
//! `particles::canvas`; the rest is plain Rust, exercised by native tests.

use wasm_bindgen::prelude::*;

pub mod color;
pub mod config;
pub mod frame;
pub mod particles;
mod page;
pub mod robot;
pub mod scheduler;
pub mod sound;

pub use color::{ARM_PALETTE, ColorError, LEG_PALETTE, darken_color};
pub use config::{Config, ConfigError, TimerPolicy};
pub use robot::{Control, Part, RobotManager, RobotView};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

// -----------------------------------------------------------------------------
// JS entrypoints
// -----------------------------------------------------------------------------

/// Discover robots, bind controls and start the particle backdrop.
#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    page::start(Config::default())
}

/// Same as [`start`] with a JSON config overriding any subset of the defaults.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    let config = Config::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    page::start(config)
}

/// Stop the frame loop and ambient timers. Bound listeners become inert.
#[wasm_bindgen]
pub fn stop() {
    page::stop();
}

#[wasm_bindgen(js_name = darkenColor)]
pub fn darken_color_js(color: &str, percent: f64) -> Result<String, JsValue> {
    darken_color(color, percent).map_err(|e| JsValue::from_str(&e.to_string()))
}
