#![warn(clippy::all, rust_2018_idioms)]
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // hide console window on Windows in release

fn main() -> eframe::Result<()> {
    use std::env;

    #[cfg(feature = "logging")]
    let _log_guard = {
        use tracing_appender::rolling::Rotation;
        use tracing_subscriber::Layer;
        use tracing_subscriber::filter::LevelFilter;
        use tracing_subscriber::fmt;
        use tracing_subscriber::fmt::time::LocalTime;
        use tracing_subscriber::layer::SubscriberExt;

        let file_appender = tracing_appender::rolling::Builder::new()
            .rotation(Rotation::HOURLY)
            .max_log_files(1)
            .filename_prefix("traffic_console.log")
            .build(".")
            .expect("failed to build file appender");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let subscriber = tracing_subscriber::registry()
            .with(fmt::Layer::new().with_ansi(true).with_filter(LevelFilter::DEBUG))
            .with(
                fmt::Layer::new()
                    .with_writer(non_blocking)
                    .with_timer(LocalTime::rfc_3339())
                    .with_ansi(false)
                    .with_filter(LevelFilter::DEBUG),
            );
        tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
        guard
    };

    // Optional single argument: backend base URL. Everything else is a
    // compile-time constant.
    let base_url = env::args()
        .nth(1)
        .unwrap_or_else(|| traffic_console::DEFAULT_BASE_URL.to_string())
        .trim_end_matches('/')
        .to_string();

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title(format!("{} v{}", traffic_console::APP_NAME, env!("CARGO_PKG_VERSION"))),
        ..Default::default()
    };

    eframe::run_native(
        traffic_console::APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(traffic_console::TrafficConsoleApp::new(cc, base_url)))),
    )
}
