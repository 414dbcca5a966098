//! IntakeCare: patient intake and triage
//!
//! Main entry point for the terminal application.

use anyhow::Result;
use std::io::IsTerminal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intakecare::adapters::sanitize::SanitizingMakeWriter;
use intakecare::config::AppConfig;
use intakecare::tui::App;

fn main() -> Result<()> {
    let (config, ignored) = AppConfig::from_env_or_default();

    // Initialize logging.
    //
    // IMPORTANT: writing logs to the terminal will corrupt the TUI (alternate screen).
    // Default behavior:
    // - interactive TTY: log to a file
    // - non-interactive: log to stdout
    let interactive = std::io::stdout().is_terminal();

    let (writer, _guard) = if config.log_mode.use_file(interactive) {
        if let Some(parent) = config.log_file.parent() {
            // Best-effort: don't fail startup just because the directory is missing.
            let _ = std::fs::create_dir_all(parent);
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&config.log_file)?;
        tracing_appender::non_blocking(file)
    } else {
        tracing_appender::non_blocking(std::io::stdout())
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    for message in &ignored {
        tracing::warn!("{}", message);
    }

    tracing::info!("Starting IntakeCare...");

    let mut app = App::new(&config);
    app.run()?;

    tracing::info!(
        "IntakeCare shutdown complete ({} records this session).",
        app.session().len()
    );
    Ok(())
}
