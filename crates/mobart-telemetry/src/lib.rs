//! Telemetry for the mobart worker
//!
//! Logs always go to stdout through `tracing-subscriber`. When an OTLP
//! exporter is configured, spans and pipeline metrics are exported too.

mod metadata;
pub mod metrics;
mod otlp;

use mobart_config::TelemetryConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use metrics::PipelineMetrics;
pub use otlp::TelemetryGuard;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `log_filter`. Hold the returned guard
/// for the lifetime of the process so exporters get flushed on exit.
///
/// # Errors
///
/// Returns an error if an OTLP exporter cannot be built
pub fn init(config: Option<&TelemetryConfig>, log_filter: &str) -> anyhow::Result<TelemetryGuard> {
    let console = tracing_subscriber::fmt::layer().with_target(true).compact();
    let registry = tracing_subscriber::registry().with(env_filter(log_filter)).with(console);

    let Some((settings, exporter)) = config.and_then(|c| c.exporter.as_ref().map(|e| (c, e))) else {
        registry.init();
        return Ok(TelemetryGuard::default());
    };

    let (guard, tracer) = otlp::install(settings, exporter)?;
    registry.with(tracing_opentelemetry::layer().with_tracer(tracer)).init();

    Ok(guard)
}

fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

#[cfg(test)]
mod tests {
    use super::env_filter;

    #[test]
    fn rust_log_wins_over_fallback() {
        temp_env::with_var("RUST_LOG", Some("mobart_worker=trace"), || {
            assert_eq!(env_filter("warn").to_string(), "mobart_worker=trace");
        });
    }

    #[test]
    fn fallback_used_without_rust_log() {
        temp_env::with_var_unset("RUST_LOG", || {
            assert_eq!(env_filter("debug").to_string(), "debug");
        });
    }
}
