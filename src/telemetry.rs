use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("FUNNEL_LOG_LEVEL '{directive}' is not a valid tracing filter")]
    InvalidLogLevel {
        directive: String,
        source: ParseError,
    },

    #[error("failed to install log subscriber: {0}")]
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

/// Filter for CLI logs. A `RUST_LOG` directive replaces `FUNNEL_LOG_LEVEL`.
fn roster_filter(
    configured: &str,
    rust_log: Option<String>,
) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = rust_log.and_then(|directive| EnvFilter::try_new(directive).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured).map_err(|source| TelemetryError::InvalidLogLevel {
        directive: configured.to_string(),
        source,
    })
}

/// Installs the global subscriber. Logs go to stderr so `--json` output stays parseable.
pub fn init(config: &AppConfig) -> Result<(), TelemetryError> {
    let filter = roster_filter(&config.log_level, std::env::var(EnvFilter::DEFAULT_ENV).ok())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_builds_filter() {
        let filter = roster_filter("debug", None).unwrap();
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn rust_log_overrides_configured_level() {
        let filter = roster_filter("funnel=loud", Some("warn".to_string())).unwrap();
        assert_eq!(filter.to_string(), "warn");
    }

    #[test]
    fn bad_configured_level_is_reported() {
        let err = roster_filter("funnel=loud", None).unwrap_err();
        assert!(matches!(
            err,
            TelemetryError::InvalidLogLevel { ref directive, .. } if directive == "funnel=loud"
        ));
        assert!(err.to_string().contains("FUNNEL_LOG_LEVEL 'funnel=loud'"));
    }

    #[test]
    fn unparseable_rust_log_falls_back_to_config() {
        let filter = roster_filter("info", Some("funnel=loud".to_string())).unwrap();
        assert_eq!(filter.to_string(), "info");
    }
}
