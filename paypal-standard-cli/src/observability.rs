//! Logging setup and the credential readiness report.

use std::io;

use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Log format configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable pretty format for development.
    Pretty,
    /// JSON format for production log aggregation.
    Json,
}

impl LogFormat {
    /// Determines log format from environment.
    ///
    /// Checks `LOG_FORMAT` environment variable:
    /// - `json` => JSON format
    /// - `pretty` or unset => Pretty format
    #[must_use]
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("LOG_FORMAT").unwrap_or_default())
    }

    fn parse(value: &str) -> Self {
        match value.to_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initializes structured logging on stderr; stdout stays reserved for command output.
///
/// # Environment Variables
///
/// - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
/// - `RUST_LOG`: Log level filter (default: `warn`)
pub fn init_observability(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let subscriber = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => {
            subscriber
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
        LogFormat::Json => {
            subscriber
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_span_list(true)
                        .with_target(true)
                        .with_thread_ids(false)
                        .with_thread_names(false)
                        .with_span_events(FmtSpan::CLOSE)
                        .with_writer(io::stderr),
                )
                .init();
        }
    }
}

/// Overall readiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Forms, encrypted buttons and verification all work.
    Healthy,
    /// Usable, but some feature (usually encrypted buttons) is unavailable.
    Degraded,
    /// Misconfigured.
    Unhealthy,
}

impl HealthStatus {
    /// Returns string representation for JSON serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Health check status for individual checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheckStatus {
    /// Check passed.
    Pass,
    /// Check failed.
    Fail,
    /// Check warning (degraded but operational).
    Warn,
}

impl HealthCheckStatus {
    /// Returns string representation for JSON serialization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
            Self::Warn => "warn",
        }
    }
}

/// Individual check result.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Check name.
    pub name: String,
    /// Check status.
    pub status: HealthCheckStatus,
    /// Optional message with details.
    pub message: Option<String>,
}

impl HealthCheck {
    /// Creates a passing check with a message.
    #[must_use]
    pub fn pass_with_message<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Pass, message: Some(message.into()) }
    }

    /// Creates a failing check with error message.
    #[must_use]
    pub fn fail<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Fail, message: Some(message.into()) }
    }

    /// Creates a warning check.
    #[must_use]
    pub fn warn<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self { name: name.into(), status: HealthCheckStatus::Warn, message: Some(message.into()) }
    }
}

/// Readiness report printed by `check`.
#[derive(Debug, Clone)]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Tool version.
    pub version: String,
    /// Service URL the configuration targets.
    pub service_url: String,
    /// Individual checks.
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    /// Builds a report, deriving the overall status from `checks`.
    #[must_use]
    pub fn new(service_url: impl Into<String>, checks: Vec<HealthCheck>) -> Self {
        Self {
            status: Self::compute_status(&checks),
            version: env!("CARGO_PKG_VERSION").to_owned(),
            service_url: service_url.into(),
            checks,
        }
    }

    /// Serializes the report to a JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if JSON serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::json!({
            "status": self.status.as_str(),
            "version": self.version,
            "service_url": self.service_url,
            "checks": self.checks.iter().map(|c| {
                let mut obj = serde_json::json!({
                    "name": c.name,
                    "status": c.status.as_str(),
                });
                if let Some(msg) = &c.message {
                    obj["message"] = serde_json::Value::String(msg.clone());
                }
                obj
            }).collect::<Vec<_>>(),
        });

        serde_json::to_string_pretty(&json)
    }

    /// Determines overall status from individual checks.
    #[must_use]
    pub fn compute_status(checks: &[HealthCheck]) -> HealthStatus {
        if checks.iter().any(|c| c.status == HealthCheckStatus::Fail) {
            HealthStatus::Unhealthy
        } else if checks.iter().any(|c| c.status == HealthCheckStatus::Warn) {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}
