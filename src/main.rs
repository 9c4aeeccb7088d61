use anyhow::anyhow;
use eframe::egui;
use layered_sketch::gui::SketchApp;
use layered_sketch::{logging, settings_store};

fn main() -> anyhow::Result<()> {
    let loaded = settings_store::load();
    let settings = loaded.as_ref().cloned().unwrap_or_default();
    // A file that failed to load is left alone rather than overwritten.
    let persist = loaded.is_ok();
    logging::init(settings.debug_logging, settings.log_file.clone());
    if let Err(err) = &loaded {
        tracing::warn!(error = %format!("{err:#}"), "could not load settings, using defaults");
    }

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Layered Sketch")
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Layered Sketch",
        native_options,
        Box::new(move |_cc| Box::new(SketchApp::new(settings).persist_on_exit(persist))),
    )
    .map_err(|err| anyhow!("failed to open the sketch window: {err}"))
}
