//! Application logging setup

use std::path::Path;

use anyhow::Context;
use tracing::metadata::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, Layer};

/// Set up logging to stderr, plus a debug log file when `path` is given.
///
/// `verbosity` counts the `-v` flags.
pub fn set_up_logging(verbosity: u8, path: Option<&Path>) -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .compact()
        .with_target(false)
        .with_filter(stderr_level(verbosity));

    let file_layer = match path {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| Path::new(""));
            let file_name = path
                .file_name()
                .with_context(|| format!("log path {} has no file name", path.display()))?;

            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating {} failed", dir.display()))?;
            }

            let file_appender = tracing_appender::rolling::never(dir, file_name);

            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .compact()
                    .with_filter(LevelFilter::DEBUG),
            )
        }
        None => None,
    };

    let subscriber = tracing_subscriber::registry::Registry::default()
        .with(stderr_layer)
        .with(file_layer);

    tracing::subscriber::set_global_default(subscriber)?;

    tracing::debug!("logging configured");

    Ok(())
}

fn stderr_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}
