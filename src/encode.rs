//! Pure mapping from a raw location reading to its render attributes.
//!
//! Everything here is deterministic and total: unknown intensity labels get
//! the free-flowing color, a missing or zero lane count gets a flat capacity
//! estimate. Nothing in this module may panic on backend data.

use egui::Color32;
use egui::Stroke;

use crate::consts::CONGESTED_RED;
use crate::consts::DEFAULT_LANES;
use crate::consts::FALLBACK_CAPACITY;
use crate::consts::FLOWING_GREEN;
use crate::consts::LANE_CAPACITY_MULTIPLIER;
use crate::consts::LIVE_BORDER_WIDTH;
use crate::consts::LIVE_FILL_OPACITY;
use crate::consts::LIVE_MARKER_RADIUS;
use crate::consts::MODERATE_YELLOW;
use crate::consts::SIMULATED_FILL_OPACITY;
use crate::consts::SIMULATED_MARKER_RADIUS;
use crate::snapshot::Intensity;
use crate::snapshot::LocationReading;

/// Render attributes for one marker, derived entirely from its reading.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    pub fill: Color32,
    pub fill_opacity: f32,
    pub radius: f32,
    pub border: Stroke,
    /// Saturation clamped for display; the raw ratio may exceed 100%.
    pub saturation_percent: u32,
    pub popup: PopupContent,
}

/// Text and badge styling for a marker popup, re-derived fresh each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub name: String,
    pub intensity_label: &'static str,
    pub badge_fill: Color32,
    pub badge_text: Color32,
    pub total: u64,
    pub lanes: u32,
    pub saturation_percent: u32,
    pub provenance: &'static str,
}

/// Total `intensity -> color` mapping. High and congestion share the red
/// band; anything unrecognized falls open to green.
pub fn intensity_color(intensity: Intensity) -> Color32 {
    match intensity {
        Intensity::Moderate => MODERATE_YELLOW,
        Intensity::High | Intensity::Congestion => CONGESTED_RED,
        Intensity::Low | Intensity::Unknown => FLOWING_GREEN,
    }
}

/// Vehicle count as a percentage of estimated road capacity, clamped to 100
/// for display. A zero lane count is treated exactly like an absent one.
pub fn saturation_percent(total: u64, lanes: Option<u32>) -> u32 {
    let capacity = match lanes {
        Some(lanes) if lanes > 0 => u64::from(lanes) * LANE_CAPACITY_MULTIPLIER,
        _ => FALLBACK_CAPACITY,
    };
    let raw = (total as f64 / capacity as f64 * 100.0).round() as u32;
    raw.min(100)
}

pub fn encode(reading: &LocationReading) -> RenderStyle {
    let fill = intensity_color(reading.intensity);
    let live = reading.source_type.is_live();

    let (radius, border, fill_opacity) = if live {
        (
            LIVE_MARKER_RADIUS,
            Stroke::new(LIVE_BORDER_WIDTH, Color32::WHITE),
            LIVE_FILL_OPACITY,
        )
    } else {
        (
            SIMULATED_MARKER_RADIUS,
            Stroke::new(0.0, Color32::TRANSPARENT),
            SIMULATED_FILL_OPACITY,
        )
    };

    let saturation = saturation_percent(reading.total, reading.lanes);

    // Yellow badges need dark text for contrast.
    let badge_text = if fill == MODERATE_YELLOW {
        Color32::BLACK
    } else {
        Color32::WHITE
    };

    RenderStyle {
        fill,
        fill_opacity,
        radius,
        border,
        saturation_percent: saturation,
        popup: PopupContent {
            name: reading.name.clone(),
            intensity_label: reading.intensity.label(),
            badge_fill: fill,
            badge_text,
            total: reading.total,
            lanes: reading.lanes.filter(|lanes| *lanes > 0).unwrap_or(DEFAULT_LANES),
            saturation_percent: saturation,
            provenance: if live { "LIVE FEED" } else { "Modeled Data" },
        },
    }
}
