use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Instant;

use egui::Color32;
use egui::RichText;
use thousands::Separable;
use tokio::runtime::Runtime;

use crate::alerts::Alert;
use crate::alerts::build_alerts;
use crate::alerts::show_alert_list;
use crate::chart::DistributionChart;
use crate::error::ConsoleError;
use crate::icon_str;
use crate::icons;
use crate::live_feed::LiveFeedCard;
use crate::map::MapView;
use crate::poller;
use crate::snapshot::Snapshot;

/// Everything a snapshot re-renders. One owner, explicitly constructed at
/// startup; each tick replaces the derived state wholesale while the map
/// viewport and chart instance persist.
#[derive(Default)]
pub struct DashboardState {
    pub map: MapView,
    pub chart: DistributionChart,
    pub alerts: Vec<Alert>,
    pub total_vehicles: u64,
    pub last_refresh: Option<Instant>,
}

impl DashboardState {
    /// Dispatch one decoded snapshot to every renderer. This is the whole
    /// per-tick render pipeline; failed ticks never get here.
    pub fn apply_snapshot(&mut self, snapshot: &Snapshot) {
        self.map.apply_snapshot(snapshot);
        self.chart.update_series(&snapshot.distribution);
        self.alerts = build_alerts(snapshot);
        self.total_vehicles = snapshot.total_vehicles;
        self.last_refresh = Some(Instant::now());
    }
}

pub struct TrafficConsoleApp {
    dashboard: DashboardState,
    live_feed: LiveFeedCard,
    snapshot_rx: Receiver<Result<Snapshot, ConsoleError>>,
    runtime: Arc<Runtime>,
    skipped_ticks: usize,
}

impl TrafficConsoleApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>, base_url: String) -> Self {
        // Include phosphor icons
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_theme(egui::Theme::Dark);

        let runtime = Arc::new(Runtime::new().expect("failed to create tokio runtime"));
        let snapshot_rx = poller::start_poll_task(&runtime, &base_url, cc.egui_ctx.clone());

        Self {
            dashboard: DashboardState::default(),
            live_feed: LiveFeedCard::new(base_url),
            snapshot_rx,
            runtime,
            skipped_ticks: 0,
        }
    }

    fn build_status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(format!(
                "{} {} vehicles tracked",
                icons::MAP_PIN,
                self.dashboard.total_vehicles.separate_with_commas()
            ));
            ui.separator();
            match self.dashboard.last_refresh {
                Some(at) => {
                    ui.label(format!(
                        "{} updated {}s ago",
                        icons::CHECK_CIRCLE,
                        at.elapsed().as_secs()
                    ));
                }
                None => {
                    ui.spinner();
                    ui.label("Waiting for first snapshot...");
                }
            }
            if self.skipped_ticks > 0 {
                ui.separator();
                ui.label(
                    RichText::new(format!(
                        "{} {} skipped refreshes",
                        icons::X_CIRCLE,
                        self.skipped_ticks
                    ))
                    .color(Color32::LIGHT_RED),
                );
            }
        });
    }
}

impl eframe::App for TrafficConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Tick boundary: a failed fetch/decode skips the whole render
        // dispatch and leaves the previous state visible.
        let outcome = poller::drain_poll_results(&self.snapshot_rx);
        if let Some(snapshot) = outcome.snapshot {
            self.dashboard.apply_snapshot(&snapshot);
        }
        self.skipped_ticks += outcome.failures;

        egui::TopBottomPanel::bottom("status_panel").show(ctx, |ui| {
            self.build_status_bar(ui);
        });

        egui::SidePanel::right("side_panel").default_width(340.0).show(ctx, |ui| {
            ui.heading(icon_str!(icons::CHART_BAR, "Vehicle Distribution"));
            self.dashboard.chart.show(ui);
            ui.separator();
            ui.heading(icon_str!(icons::WARNING, "Congestion Alerts"));
            show_alert_list(ui, &self.dashboard.alerts);
            ui.separator();
            ui.heading(icon_str!(icons::VIDEO_CAMERA, "Live Feed"));
            self.live_feed.show(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(click) = self.dashboard.map.show(ui) {
                self.live_feed.select(&self.runtime, ctx, &click.location_id, &click.name);
            }
        });

        // Keep the "updated Ns ago" note moving even between data ticks.
        ctx.request_repaint_after_secs(1.0);
    }
}
