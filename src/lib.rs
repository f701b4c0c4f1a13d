#![warn(clippy::all, rust_2018_idioms)]
mod alerts;
mod app;
mod chart;
mod consts;
mod encode;
mod error;
mod live_feed;
mod map;
mod poller;
mod snapshot;
pub use app::TrafficConsoleApp;
pub use consts::DEFAULT_BASE_URL;
pub const APP_NAME: &str = "Traffic Console";
pub(crate) use egui_phosphor::regular as icons;

/// Concatenate an icon const with a string literal at compile time (zero allocation).
/// Usage: `icon_str!(icons::MAP_PIN, "Map")` => `&'static str`
macro_rules! icon_str {
    ($icon:expr, $text:expr) => {
        const_format::concatcp!($icon, " ", $text)
    };
}
pub(crate) use icon_str;
