//! Vehicle distribution chart.

use egui_plot::Bar;
use egui_plot::BarChart;
use egui_plot::Legend;
use egui_plot::Plot;

use crate::consts::VEHICLE_CATEGORIES;
use crate::consts::VEHICLE_CATEGORY_COLORS;
use crate::snapshot::VehicleDistribution;

/// A single chart instance created once at startup. The category labels and
/// colors are fixed; only the numeric series is replaced per tick, so the
/// chart object itself is never recreated.
#[derive(Default)]
pub struct DistributionChart {
    series: [u64; 4],
}

impl DistributionChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the numeric series from a fresh snapshot.
    pub fn update_series(&mut self, distribution: &VehicleDistribution) {
        self.series = distribution.series();
    }

    pub fn series(&self) -> [u64; 4] {
        self.series
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let charts: Vec<BarChart> = self
            .series
            .iter()
            .enumerate()
            .map(|(i, count)| {
                let bar = Bar::new(i as f64, *count as f64).width(0.7);
                BarChart::new(VEHICLE_CATEGORIES[i], vec![bar]).color(VEHICLE_CATEGORY_COLORS[i])
            })
            .collect();

        Plot::new("distribution_chart")
            .legend(Legend::default())
            .y_axis_label("Vehicles")
            .show_axes([false, true])
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .view_aspect(2.0)
            .show(ui, |plot_ui| {
                for chart in charts {
                    plot_ui.bar_chart(chart);
                }
            });
    }
}
