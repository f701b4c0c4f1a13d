//! Side-panel alert derivation.
//!
//! The alert list is a snapshot view, not a log: it is rebuilt from scratch
//! each tick and fully replaces the previous list.

use egui::Color32;
use egui::RichText;
use egui::ScrollArea;

use crate::consts::ALERT_COUNT_GATE;
use crate::consts::CONGESTED_RED;
use crate::encode::saturation_percent;
use crate::icons;
use crate::snapshot::LocationReading;
use crate::snapshot::Snapshot;

/// One high-congestion entry for the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub location_id: String,
    pub name: String,
    pub total: u64,
    pub saturation_percent: u32,
}

impl Alert {
    pub fn headline(&self) -> String {
        format!("CONGESTION: {}", self.name)
    }
}

/// Whether a reading is credible enough to surface as an alert. Simulated
/// points are low-confidence, so they additionally need a count above the
/// gate.
fn is_alert(reading: &LocationReading) -> bool {
    reading.intensity.is_congested()
        && (reading.source_type.is_live() || reading.total > ALERT_COUNT_GATE)
}

/// Filter `locations` down to alert entries, preserving input order.
pub fn build_alerts(snapshot: &Snapshot) -> Vec<Alert> {
    snapshot
        .locations
        .iter()
        .filter(|reading| is_alert(reading))
        .map(|reading| Alert {
            location_id: reading.id.clone(),
            name: reading.name.clone(),
            total: reading.total,
            saturation_percent: saturation_percent(reading.total, reading.lanes),
        })
        .collect()
}

pub fn show_alert_list(ui: &mut egui::Ui, alerts: &[Alert]) {
    if alerts.is_empty() {
        ui.label(
            RichText::new(format!("{} No congestion alerts", icons::CHECK_CIRCLE))
                .color(Color32::GRAY),
        );
        return;
    }

    ScrollArea::vertical()
        .id_salt("alert_list")
        .max_height(180.0)
        .show(ui, |ui| {
            for alert in alerts {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(icons::WARNING).color(CONGESTED_RED));
                    ui.vertical(|ui| {
                        ui.label(RichText::new(alert.headline()).strong().color(CONGESTED_RED));
                        ui.label(format!(
                            "{} vehicles, {}% saturation",
                            alert.total, alert.saturation_percent
                        ));
                    });
                });
                ui.separator();
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::Intensity;
    use crate::snapshot::SourceType;
    use crate::snapshot::VehicleDistribution;

    fn reading(
        id: &str,
        total: u64,
        intensity: Intensity,
        source_type: SourceType,
    ) -> LocationReading {
        LocationReading {
            id: id.to_string(),
            name: format!("Node {id}"),
            lat: 10.03,
            lng: 76.31,
            total,
            lanes: Some(2),
            intensity,
            weighted_intensity: 1.0,
            source_type,
        }
    }

    fn snapshot(locations: Vec<LocationReading>) -> Snapshot {
        Snapshot {
            total_vehicles: locations.iter().map(|l| l.total).sum(),
            distribution: VehicleDistribution::default(),
            locations,
        }
    }

    #[test]
    fn live_camera_alerts_on_intensity_alone() {
        let alerts = build_alerts(&snapshot(vec![reading(
            "A",
            1,
            Intensity::High,
            SourceType::LiveCctv,
        )]));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].headline(), "CONGESTION: Node A");
    }

    #[test]
    fn simulated_count_gate_is_exclusive_at_45() {
        let at_gate = snapshot(vec![reading("A", 45, Intensity::High, SourceType::Simulated)]);
        assert!(build_alerts(&at_gate).is_empty());

        let above_gate = snapshot(vec![reading("A", 46, Intensity::High, SourceType::Simulated)]);
        assert_eq!(build_alerts(&above_gate).len(), 1);
    }

    #[test]
    fn non_congested_intensity_never_alerts() {
        let snap = snapshot(vec![
            reading("A", 500, Intensity::Low, SourceType::LiveCctv),
            reading("B", 500, Intensity::Moderate, SourceType::Simulated),
            reading("C", 500, Intensity::Unknown, SourceType::LiveCctv),
        ]);
        assert!(build_alerts(&snap).is_empty());
    }

    #[test]
    fn congestion_label_alerts_like_high() {
        let snap = snapshot(vec![reading(
            "A",
            60,
            Intensity::Congestion,
            SourceType::Simulated,
        )]);
        assert_eq!(build_alerts(&snap).len(), 1);
    }

    #[test]
    fn output_preserves_input_order() {
        let snap = snapshot(vec![
            reading("B", 50, Intensity::High, SourceType::LiveCctv),
            reading("A", 90, Intensity::Congestion, SourceType::LiveCctv),
            reading("C", 10, Intensity::Low, SourceType::Simulated),
        ]);
        let alerts = build_alerts(&snap);
        let ids: Vec<&str> = alerts.iter().map(|a| a.location_id.as_str()).collect();
        assert_eq!(ids, ["B", "A"]);
    }
}
