//! Map viewport, heat layer, and marker layer.
//!
//! The viewport is fixed (initial center and zoom, never reset by data).
//! Both layers are rebuilt wholesale from each snapshot rather than diffed:
//! snapshots are small and arrive every couple of seconds, and a full replace
//! cannot leak stale markers. Tile providers are out of scope, so the canvas
//! draws a plain grid underneath the data layers.
//!
//! Projection is a local equirectangular one around the fixed center, with
//! the longitude axis corrected by `cos(center_lat)`. That is accurate at the
//! neighborhood scale this dashboard monitors.

use egui::Color32;
use egui::Id;
use egui::Pos2;
use egui::Rect;
use egui::RichText;
use egui::Sense;
use egui::Stroke;

use crate::consts::MAP_CENTER_LAT;
use crate::consts::MAP_CENTER_LNG;
use crate::consts::MAP_PIXELS_PER_DEGREE;
use crate::encode::PopupContent;
use crate::encode::RenderStyle;
use crate::encode::encode;
use crate::snapshot::Snapshot;

const MAP_BACKGROUND: Color32 = Color32::from_gray(18);
const GRID_LINE: Color32 = Color32::from_gray(32);
const GRID_SPACING: f32 = 48.0;

/// Extra hit-test slop around a marker's drawn radius.
const MARKER_GRAB_MARGIN: f32 = 2.0;

/// A click on a live marker, to be routed to the live-feed selector. Clicks
/// on simulated markers are deliberately inert and never produce one of
/// these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerClick {
    pub location_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeatPoint {
    pub lat: f64,
    pub lng: f64,
    /// Clamped to `[0, 1]` at ingest even if the source misbehaves.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub location_id: String,
    pub lat: f64,
    pub lng: f64,
    pub live: bool,
    pub style: RenderStyle,
}

pub struct MapView {
    center_lat: f64,
    center_lng: f64,
    pixels_per_degree: f64,
    heat_points: Vec<HeatPoint>,
    markers: Vec<Marker>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lat: MAP_CENTER_LAT,
            center_lng: MAP_CENTER_LNG,
            pixels_per_degree: MAP_PIXELS_PER_DEGREE,
            heat_points: Vec::new(),
            markers: Vec::new(),
        }
    }
}

impl MapView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild both layers from a fresh snapshot. Full replace, not a diff.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.heat_points = snapshot
            .locations
            .iter()
            .map(|reading| HeatPoint {
                lat: reading.lat,
                lng: reading.lng,
                weight: reading.weighted_intensity.clamp(0.0, 1.0),
            })
            .collect();

        self.markers = snapshot
            .locations
            .iter()
            .map(|reading| Marker {
                location_id: reading.id.clone(),
                lat: reading.lat,
                lng: reading.lng,
                live: reading.source_type.is_live(),
                style: encode(reading),
            })
            .collect();
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn heat_points(&self) -> &[HeatPoint] {
        &self.heat_points
    }

    fn project(&self, rect: Rect, lat: f64, lng: f64) -> Pos2 {
        let lng_scale = self.center_lat.to_radians().cos();
        let x = (lng - self.center_lng) * self.pixels_per_degree * lng_scale;
        // Screen y grows downward, latitude grows upward.
        let y = -(lat - self.center_lat) * self.pixels_per_degree;
        Pos2::new(rect.center().x + x as f32, rect.center().y + y as f32)
    }

    /// Topmost marker under `pos`. Markers are drawn in input order, so the
    /// last hit wins.
    fn marker_at(&self, rect: Rect, pos: Pos2) -> Option<&Marker> {
        self.markers.iter().rev().find(|marker| {
            let center = self.project(rect, marker.lat, marker.lng);
            center.distance(pos) <= marker.style.radius + MARKER_GRAB_MARGIN
        })
    }

    /// Click semantics: live markers select the live feed, simulated markers
    /// are observation points only.
    fn click_outcome(&self, rect: Rect, pos: Pos2) -> Option<MarkerClick> {
        self.marker_at(rect, pos)
            .filter(|marker| marker.live)
            .map(|marker| MarkerClick {
                location_id: marker.location_id.clone(),
                name: marker.style.popup.name.clone(),
            })
    }

    pub fn show(&self, ui: &mut egui::Ui) -> Option<MarkerClick> {
        let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
        let rect = response.rect;

        painter.rect_filled(rect, 0.0, MAP_BACKGROUND);

        let grid_stroke = Stroke::new(1.0, GRID_LINE);
        let mut x = rect.left();
        while x < rect.right() {
            painter.vline(x, rect.y_range(), grid_stroke);
            x += GRID_SPACING;
        }
        let mut y = rect.top();
        while y < rect.bottom() {
            painter.hline(rect.x_range(), y, grid_stroke);
            y += GRID_SPACING;
        }

        // Heat underneath, markers on top.
        for point in &self.heat_points {
            let center = self.project(rect, point.lat, point.lng);
            let weight = point.weight as f32;
            painter.circle_filled(center, 12.0 + 18.0 * weight, heat_color(weight));
        }

        for marker in &self.markers {
            let center = self.project(rect, marker.lat, marker.lng);
            let fill = marker.style.fill.gamma_multiply(marker.style.fill_opacity);
            painter.circle(center, marker.style.radius, fill, marker.style.border);
        }

        if let Some(pos) = response.hover_pos()
            && let Some(marker) = self.marker_at(rect, pos)
        {
            egui::show_tooltip_at_pointer(
                ui.ctx(),
                ui.layer_id(),
                Id::new("marker_popup"),
                |ui| popup_ui(ui, &marker.style.popup),
            );
        }

        if response.clicked()
            && let Some(pos) = response.interact_pointer_pos()
        {
            return self.click_outcome(rect, pos);
        }

        None
    }
}

/// Green-to-red gradient for heat weights, drawn translucent.
fn heat_color(weight: f32) -> Color32 {
    let t = weight.clamp(0.0, 1.0);
    let lerp = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
    Color32::from_rgba_unmultiplied(lerp(0x2e, 0xe7), lerp(0xcc, 0x4c), lerp(0x71, 0x3c), 56)
}

fn popup_ui(ui: &mut egui::Ui, popup: &PopupContent) {
    ui.label(RichText::new(&popup.name).strong());
    egui::Frame::new()
        .fill(popup.badge_fill)
        .corner_radius(3)
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(
                RichText::new(popup.intensity_label)
                    .color(popup.badge_text)
                    .small()
                    .strong(),
            );
        });
    ui.label(format!("Vehicles: {}", popup.total));
    ui.label(format!("Lanes: {}", popup.lanes));
    ui.label(format!("Saturation: {}%", popup.saturation_percent));
    ui.label(RichText::new(popup.provenance).small().italics());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Intensity;
    use crate::snapshot::LocationReading;
    use crate::snapshot::SourceType;
    use crate::snapshot::VehicleDistribution;

    fn reading(id: &str, lat: f64, lng: f64, source_type: SourceType) -> LocationReading {
        LocationReading {
            id: id.to_string(),
            name: format!("Node {id}"),
            lat,
            lng,
            total: 10,
            lanes: Some(2),
            intensity: Intensity::Low,
            weighted_intensity: 0.5,
            source_type,
        }
    }

    fn snapshot(locations: Vec<LocationReading>) -> Snapshot {
        Snapshot { total_vehicles: 0, distribution: VehicleDistribution::default(), locations }
    }

    fn canvas() -> Rect {
        Rect::from_min_size(Pos2::ZERO, egui::vec2(800.0, 600.0))
    }

    #[test]
    fn layers_are_fully_replaced_each_tick() {
        let mut map = MapView::new();
        map.apply_snapshot(&snapshot(vec![
            reading("A", 10.023, 76.309, SourceType::LiveCctv),
            reading("B", 10.024, 76.310, SourceType::Simulated),
            reading("C", 10.025, 76.311, SourceType::Simulated),
        ]));
        assert_eq!(map.markers().len(), 3);
        assert_eq!(map.heat_points().len(), 3);

        // A smaller snapshot leaves no stale markers behind.
        map.apply_snapshot(&snapshot(vec![reading("D", 10.026, 76.312, SourceType::Simulated)]));
        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].location_id, "D");
        assert_eq!(map.heat_points().len(), 1);
    }

    #[test]
    fn heat_weight_is_clamped_defensively() {
        let mut map = MapView::new();
        let mut hot = reading("A", 10.023, 76.309, SourceType::Simulated);
        hot.weighted_intensity = 1.7;
        let mut cold = reading("B", 10.024, 76.310, SourceType::Simulated);
        cold.weighted_intensity = -0.3;

        map.apply_snapshot(&snapshot(vec![hot, cold]));
        assert_eq!(map.heat_points()[0].weight, 1.0);
        assert_eq!(map.heat_points()[1].weight, 0.0);
    }

    #[test]
    fn projection_is_centered_and_oriented() {
        let map = MapView::new();
        let rect = canvas();

        let center = map.project(rect, MAP_CENTER_LAT, MAP_CENTER_LNG);
        assert_eq!(center, rect.center());

        // North is up, east is right.
        let north = map.project(rect, MAP_CENTER_LAT + 0.001, MAP_CENTER_LNG);
        assert!(north.y < center.y);
        let east = map.project(rect, MAP_CENTER_LAT, MAP_CENTER_LNG + 0.001);
        assert!(east.x > center.x);
    }

    #[test]
    fn clicking_live_marker_yields_selection() {
        let mut map = MapView::new();
        map.apply_snapshot(&snapshot(vec![reading(
            "A",
            MAP_CENTER_LAT,
            MAP_CENTER_LNG,
            SourceType::LiveCctv,
        )]));

        let rect = canvas();
        let click = map.click_outcome(rect, rect.center());
        assert_eq!(
            click,
            Some(MarkerClick { location_id: "A".to_string(), name: "Node A".to_string() })
        );
    }

    #[test]
    fn clicking_simulated_marker_is_inert() {
        let mut map = MapView::new();
        map.apply_snapshot(&snapshot(vec![reading(
            "A",
            MAP_CENTER_LAT,
            MAP_CENTER_LNG,
            SourceType::Simulated,
        )]));

        let rect = canvas();
        assert_eq!(map.click_outcome(rect, rect.center()), None);
    }

    #[test]
    fn clicking_empty_canvas_is_inert() {
        let mut map = MapView::new();
        map.apply_snapshot(&snapshot(vec![reading(
            "A",
            MAP_CENTER_LAT,
            MAP_CENTER_LNG,
            SourceType::LiveCctv,
        )]));

        let rect = canvas();
        assert_eq!(map.click_outcome(rect, Pos2::new(5.0, 5.0)), None);
    }
}
