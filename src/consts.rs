use std::time::Duration;

use egui::Color32;

/// Backend base URL when none is given on the command line.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Fixed snapshot poll cadence.
pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Per-request timeout for snapshot fetches. Kept below the poll interval so a
/// hung request cannot stack up behind the scheduler.
pub const FETCH_TIMEOUT: Duration = Duration::from_millis(1800);

/// Simulated locations only produce an alert above this vehicle count. Live
/// cameras alert on intensity alone.
pub const ALERT_COUNT_GATE: u64 = 45;

/// Road capacity is approximated as `lanes * LANE_CAPACITY_MULTIPLIER`
/// vehicles when the reading carries a lane count.
pub const LANE_CAPACITY_MULTIPLIER: u64 = 4;

/// Saturation denominator for readings with no usable lane count.
pub const FALLBACK_CAPACITY: u64 = 50;

/// Lane count assumed for display when a reading omits `lanes`.
pub const DEFAULT_LANES: u32 = 2;

// Intensity palette. High and congestion share the red band.
pub const FLOWING_GREEN: Color32 = Color32::from_rgb(0x2e, 0xcc, 0x71);
pub const MODERATE_YELLOW: Color32 = Color32::from_rgb(0xf1, 0xc4, 0x0f);
pub const CONGESTED_RED: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

pub const LIVE_MARKER_RADIUS: f32 = 12.0;
pub const SIMULATED_MARKER_RADIUS: f32 = 6.0;
pub const LIVE_BORDER_WIDTH: f32 = 3.0;
pub const LIVE_FILL_OPACITY: f32 = 0.9;
pub const SIMULATED_FILL_OPACITY: f32 = 0.5;

/// Initial map viewport. Never reset by data updates.
pub const MAP_CENTER_LAT: f64 = 10.0229;
pub const MAP_CENTER_LNG: f64 = 76.3095;

/// Fixed zoom, expressed as screen pixels per degree of latitude. The
/// monitored cluster spans roughly a hundredth of a degree.
pub const MAP_PIXELS_PER_DEGREE: f64 = 30_000.0;

/// Fixed chart categories, in series order.
pub const VEHICLE_CATEGORIES: [&str; 4] = ["Car", "Bike", "Bus", "Truck"];

/// Fixed chart colors, matching `VEHICLE_CATEGORIES`.
pub const VEHICLE_CATEGORY_COLORS: [Color32; 4] = [
    Color32::from_rgb(0x3a, 0x86, 0xff),
    Color32::from_rgb(0x8e, 0xc0, 0x7c),
    Color32::from_rgb(0xff, 0xbe, 0x0b),
    Color32::from_rgb(0xfb, 0x56, 0x07),
];
