mod app;
mod ui;
mod viewport;

// Re-export library modules so that `crate::state`, `crate::model`, etc.
// resolve to the lib crate types everywhere in the binary.
pub use case_customizer_lib::i18n;
pub use case_customizer_lib::model;
pub use case_customizer_lib::normalize;
pub use case_customizer_lib::state;

use std::path::PathBuf;

use app::CustomizerApp;
use state::settings::AppSettings;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "case_customizer=info,case_customizer_lib=info".into()),
        )
        .init();

    let mut settings = AppSettings::load();

    // Parse --model <path> argument
    if let Some(path) = parse_model_arg() {
        tracing::info!("Using model {}", path.display());
        settings.model.path = path;
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("customizer-worker")
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Failed to start background runtime: {e}");
            return;
        }
    };

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Case Customizer")
            .with_inner_size([960.0, 900.0])
            .with_min_inner_size([480.0, 520.0]),
        multisampling: if settings.viewport.antialiasing { 4 } else { 0 },
        depth_buffer: 24,
        ..Default::default()
    };

    if let Err(e) = eframe::run_native(
        "case-customizer",
        native_options,
        Box::new(move |cc| Ok(Box::new(CustomizerApp::new(cc, runtime, settings)))),
    ) {
        tracing::error!("Failed to start application: {e}");
    }
}

fn parse_model_arg() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        if args[i] == "--model" && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
        i += 1;
    }
    None
}
