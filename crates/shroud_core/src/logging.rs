//! Diagnostic output for pipeline runs.
//!
//! The engine only emits `tracing` events; embedders decide where they go.
//! [`init_tracing`] installs a stderr subscriber driven by two variables:
//!
//! ```text
//! SHROUD_LOG=shroud_core::transform=debug     # filter, falls back to RUST_LOG
//! SHROUD_LOG_FORMAT=json                      # `text` (default) or `json`
//! ```
//!
//! Nothing is installed when neither filter variable is set.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Registry, fmt};

const FILTER_VAR: &str = "SHROUD_LOG";
const FORMAT_VAR: &str = "SHROUD_LOG_FORMAT";

/// Shape of emitted log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

fn filter_from_env() -> Option<EnvFilter> {
    match std::env::var(FILTER_VAR) {
        Ok(directives) => Some(EnvFilter::builder().parse_lossy(directives)),
        Err(_) if std::env::var(EnvFilter::DEFAULT_ENV).is_ok() => Some(EnvFilter::from_default_env()),
        Err(_) => None,
    }
}

/// Installs the global subscriber described in the module docs.
///
/// Returns `false` when logging was not requested or another subscriber is
/// already installed.
pub fn init_tracing() -> bool {
    let Some(filter) = filter_from_env() else {
        return false;
    };
    let format = std::env::var(FORMAT_VAR)
        .map(|v| LogFormat::parse(&v))
        .unwrap_or_default();
    init_with(filter, format)
}

/// Installs a stderr subscriber with an explicit filter and format.
pub fn init_with(filter: EnvFilter, format: LogFormat) -> bool {
    let installed = match format {
        LogFormat::Json => Registry::default()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => Registry::default()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init(),
    };
    installed.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing_defaults_to_text() {
        assert_eq!(LogFormat::parse("json"), LogFormat::Json);
        assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
        assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
        assert_eq!(LogFormat::parse(""), LogFormat::Text);
    }

    #[test]
    fn test_second_install_is_refused() {
        let first = init_with(EnvFilter::new("off"), LogFormat::Text);
        let second = init_with(EnvFilter::new("off"), LogFormat::Json);
        assert!(!(first && second));
        assert!(!second);
    }
}
