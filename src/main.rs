use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod app;
mod capture;
mod device;
mod export;
mod scanner;
mod settings;
mod state;
mod ui;

use app::App;
use settings::Settings;

/// Initialize tracing. `RUST_LOG` wins over the configured filter.
fn init_logging(settings: &Settings) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| settings.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> iced::Result {
    let (settings, settings_error) = Settings::load_or_default();
    init_logging(&settings);

    if let Some(e) = settings_error {
        tracing::warn!(
            "⚠️  Using default settings ({}): {}",
            settings::settings_path().display(),
            e
        );
    }

    iced::application("Artifact Scanner", App::update, App::view)
        .subscription(App::subscription)
        .theme(App::theme)
        .centered()
        .run_with(move || App::new(settings))
}
