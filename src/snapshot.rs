//! Wire types for the `/api/data` snapshot payload.
//!
//! A snapshot fully replaces the previous one in every renderer each tick; no
//! history is kept. Per-field fallbacks live here (unknown intensity, legacy
//! `simulated_cctv` source tag, missing lanes) so one odd reading never
//! rejects a whole payload.

use serde::Deserialize;

/// One fetched payload describing all monitored locations and aggregate
/// counts at a point in time.
#[derive(Debug, Clone, Deserialize)]
pub struct Snapshot {
    pub total_vehicles: u64,
    #[serde(default)]
    pub distribution: VehicleDistribution,
    #[serde(default)]
    pub locations: Vec<LocationReading>,
}

/// Vehicle counts by category. The category set is fixed and exhaustive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct VehicleDistribution {
    #[serde(default)]
    pub car: u64,
    #[serde(default)]
    pub bike: u64,
    #[serde(default)]
    pub bus: u64,
    #[serde(default)]
    pub truck: u64,
}

impl VehicleDistribution {
    /// Chart series in fixed `[car, bike, bus, truck]` order.
    pub fn series(&self) -> [u64; 4] {
        [self.car, self.bike, self.bus, self.truck]
    }
}

/// One monitored point at fetch time.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationReading {
    /// Stable identifier, unique within a snapshot. Correlates live-feed
    /// requests across ticks.
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub total: u64,
    /// Optional lane count. Absent or zero means "unknown"; the encoder falls
    /// back to a flat capacity estimate.
    #[serde(default)]
    pub lanes: Option<u32>,
    #[serde(default)]
    pub intensity: Intensity,
    /// Heat-layer weight. Nominally in `[0, 1]`; the map clamps defensively.
    #[serde(default)]
    pub weighted_intensity: f64,
    #[serde(default)]
    pub source_type: SourceType,
}

/// Categorical congestion severity attached to a location.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    #[default]
    Low,
    Moderate,
    High,
    Congestion,
    /// Any label this build does not recognize. Renders as free-flowing
    /// rather than failing the snapshot.
    #[serde(other)]
    Unknown,
}

impl Intensity {
    /// Whether this severity sits in the red "congested" band.
    pub fn is_congested(self) -> bool {
        matches!(self, Intensity::High | Intensity::Congestion)
    }

    pub fn label(self) -> &'static str {
        match self {
            Intensity::Low => "LOW",
            Intensity::Moderate => "MODERATE",
            Intensity::High => "HIGH",
            Intensity::Congestion => "CONGESTION",
            Intensity::Unknown => "LOW",
        }
    }
}

/// Provenance of a reading: a real camera feed or a modeled point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    LiveCctv,
    /// The backend historically tags these `simulated_cctv`; anything we do
    /// not recognize is also treated as simulated since we have no stream to
    /// offer for it.
    #[default]
    #[serde(other)]
    Simulated,
}

impl SourceType {
    pub fn is_live(self) -> bool {
        matches!(self, SourceType::LiveCctv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading_json(intensity: &str, source_type: &str) -> String {
        format!(
            r#"{{"id":"A","name":"Junction1","lat":10.03,"lng":76.31,"total":50,
                "intensity":"{intensity}","weighted_intensity":0.9,"source_type":"{source_type}"}}"#
        )
    }

    #[test]
    fn full_snapshot_decodes() {
        let body = r#"{
            "total_vehicles": 100,
            "distribution": {"car": 60, "bike": 20, "bus": 10, "truck": 10},
            "locations": [
                {"id": "CAM_002", "name": "Seaport-Airport Rd", "lat": 10.0229, "lng": 76.3095,
                 "total": 42, "lanes": 8, "intensity": "moderate", "weighted_intensity": 0.5,
                 "source_type": "live_cctv"}
            ]
        }"#;

        let snapshot: Snapshot = serde_json::from_str(body).unwrap();
        assert_eq!(snapshot.total_vehicles, 100);
        assert_eq!(snapshot.distribution.series(), [60, 20, 10, 10]);
        assert_eq!(snapshot.locations.len(), 1);

        let reading = &snapshot.locations[0];
        assert_eq!(reading.lanes, Some(8));
        assert_eq!(reading.intensity, Intensity::Moderate);
        assert!(reading.source_type.is_live());
    }

    #[test]
    fn legacy_simulated_tag_decodes_as_simulated() {
        let reading: LocationReading =
            serde_json::from_str(&reading_json("high", "simulated_cctv")).unwrap();
        assert_eq!(reading.source_type, SourceType::Simulated);
    }

    #[test]
    fn unknown_source_type_decodes_as_simulated() {
        let reading: LocationReading =
            serde_json::from_str(&reading_json("high", "drone_swarm")).unwrap();
        assert_eq!(reading.source_type, SourceType::Simulated);
    }

    #[test]
    fn unknown_intensity_is_fail_open() {
        let reading: LocationReading =
            serde_json::from_str(&reading_json("gridlock_supreme", "live_cctv")).unwrap();
        assert_eq!(reading.intensity, Intensity::Unknown);
        assert!(!reading.intensity.is_congested());
    }

    #[test]
    fn missing_lanes_decodes_as_none() {
        let reading: LocationReading =
            serde_json::from_str(&reading_json("low", "live_cctv")).unwrap();
        assert_eq!(reading.lanes, None);
    }

    #[test]
    fn congested_band_covers_high_and_congestion() {
        assert!(Intensity::High.is_congested());
        assert!(Intensity::Congestion.is_congested());
        assert!(!Intensity::Low.is_congested());
        assert!(!Intensity::Moderate.is_congested());
    }
}
