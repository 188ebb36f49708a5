use std::fs::File;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Maps a `-v` count onto a default filter level.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Sends tracing output to `log_file`, if one was given.
///
/// The terminal belongs to the UI, so without a file nothing is installed
/// and every event is dropped. `RUST_LOG` overrides the verbosity level.
pub fn init_logging(log_file: Option<&Path>, verbose: u8) -> std::io::Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_level(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .init();
    Ok(())
}
