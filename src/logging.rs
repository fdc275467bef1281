//! tracing setup: one rolling log file, plus a coloured console copy in
//! text mode.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::AppConfig;

/// Map `rotation` from the config; anything unrecognised never rotates.
fn rotation(name: &str) -> Rotation {
    match name.to_ascii_lowercase().as_str() {
        "minutely" => Rotation::MINUTELY,
        "hourly" => Rotation::HOURLY,
        "daily" => Rotation::DAILY,
        _ => Rotation::NEVER,
    }
}

/// `RUST_LOG` wins; otherwise the configured level, with sqlx statement
/// logging held at warn.
fn filter_directives(log_level: &str) -> String {
    format!("{log_level},sqlx=warn,tower_http=debug")
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process or buffered file output is lost.
pub fn init_logging(config: &AppConfig) -> WorkerGuard {
    let appender =
        RollingFileAppender::new(rotation(&config.rotation), &config.log_dir, &config.log_file);
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(&config.log_level)));

    let file_json = config.use_json.then(|| {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(file_writer.clone())
            .with_ansi(false)
    });
    let file_text = (!config.use_json).then(|| {
        fmt::layer()
            .with_target(false)
            .with_writer(file_writer)
            .with_ansi(false)
    });
    let console = (!config.use_json).then(|| fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_json)
        .with(file_text)
        .with(console)
        .init();

    guard
}
