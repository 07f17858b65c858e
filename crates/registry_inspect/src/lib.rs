//! # Registry Inspector
//!
//! Loads an event type hierarchy and a set of listener registrations from a
//! TOML file, resolves every declared type and logs the handler list chain
//! and listener counts each one ends up with.
//!
//! ```bash
//! # Inspect the default config (created if missing)
//! registry_inspect
//!
//! # Custom config, drop a plugin's registrations before reporting
//! registry_inspect --config events.toml --unload greeter --log-level debug
//! ```

use tracing::error;

pub mod app;
pub mod cli;
pub mod config;
pub mod logging;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Parses arguments, sets up logging and runs the inspection.
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();

    let mut logging = config.logging.clone();
    if let Some(level) = &args.log_level {
        logging.level = level.clone();
    }
    if let Err(e) = logging::setup_logging(&logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => match app.run() {
            Ok(report) => {
                tracing::debug!("{}", serde_json::to_string_pretty(&report)?);
            }
            Err(e) => {
                error!("❌ Inspection failed: {e}");
                std::process::exit(1);
            }
        },
        Err(e) => {
            error!("❌ Failed to start inspector: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use config::{LoggingSettings, PrioritySetting, RegistrationSettings};
