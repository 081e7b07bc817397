//! Logging configuration and subscriber setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

use crate::error::{TelemetryError, TelemetryResult};

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable, multi-line, colored when the terminal supports it.
    #[default]
    Pretty,
    /// Single-line compact format, suitable for local development.
    Compact,
    /// Structured JSON, one object per line, suitable for log shippers.
    Json,
}

/// Logging configuration for a process.
#[derive(Debug, Clone)]
pub struct LogConfig {
    default_directive: String,
    format: LogFormat,
    extra_directives: Vec<String>,
}

impl LogConfig {
    /// Start a config with the given default level (`"info"`, `"debug"`, …).
    #[must_use]
    pub fn new(default_directive: impl Into<String>) -> Self {
        Self {
            default_directive: default_directive.into(),
            format: LogFormat::default(),
            extra_directives: Vec::new(),
        }
    }

    /// Select the output format.
    #[must_use]
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Add an extra per-target directive (e.g. `"annot_hub=trace"`).
    #[must_use]
    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.extra_directives.push(directive.into());
        self
    }

    fn build_filter(&self) -> TelemetryResult<EnvFilter> {
        let mut filter =
            EnvFilter::try_new(&self.default_directive).map_err(|e| TelemetryError::InvalidFilter {
                directive: self.default_directive.clone(),
                reason: e.to_string(),
            })?;
        for directive in &self.extra_directives {
            let parsed = directive
                .parse()
                .map_err(|e: tracing_subscriber::filter::ParseError| TelemetryError::InvalidFilter {
                    directive: directive.clone(),
                    reason: e.to_string(),
                })?;
            filter = filter.add_directive(parsed);
        }
        Ok(filter)
    }
}

/// Install a global `tracing` subscriber built from `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] if a directive fails to
/// parse, or [`TelemetryError::AlreadyInitialized`] if a global
/// subscriber was already installed in this process.
pub fn setup_logging(config: &LogConfig) -> TelemetryResult<()> {
    let filter = config.build_filter()?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::NONE);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    result.map_err(|_| TelemetryError::AlreadyInitialized)
}

/// Convenience wrapper: install default (info-level, pretty) logging.
///
/// # Errors
///
/// See [`setup_logging`].
pub fn setup_default_logging() -> TelemetryResult<()> {
    setup_logging(&LogConfig::new("info"))
}
