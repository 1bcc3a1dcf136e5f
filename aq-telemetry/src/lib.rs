//! Structured logging/tracing init, shared by every binary and test harness
//! in the workspace.
//!
//! Mirrors the layered-subscriber approach used throughout the platform:
//! an `EnvFilter` layer plus an `fmt` layer, with an optional OTLP tracing
//! layer spliced in when an endpoint is configured.

use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to install OTLP exporter: {0}")]
    Otlp(String),
}

/// Telemetry configuration, overlaid from the environment.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
    pub default_level: String,
    pub extra_directives: Vec<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "autoqa".to_string(),
            otlp_endpoint: None,
            default_level: "info".to_string(),
            extra_directives: Vec::new(),
        }
    }
}

impl TelemetryConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(name) = std::env::var("SERVICE_NAME") {
            config.service_name = name;
        }
        if let Ok(endpoint) = std::env::var("OTLP_ENDPOINT") {
            if !endpoint.is_empty() {
                config.otlp_endpoint = Some(endpoint);
            }
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.default_level = level;
        }
        config
    }

    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    pub fn with_otlp_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.otlp_endpoint = Some(endpoint.into());
        self
    }

    fn env_filter(&self) -> EnvFilter {
        let mut directive = self.default_level.clone();
        for extra in &self.extra_directives {
            directive.push(',');
            directive.push_str(extra);
        }
        EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

static INIT: Once = Once::new();

/// Install the global subscriber using default config read from the
/// environment. Safe to call more than once (across crates, across test
/// modules); only the first call takes effect.
pub fn init_telemetry() {
    init_with_config(TelemetryConfig::from_env());
}

/// Install the global subscriber with an explicit config.
pub fn init_with_config(config: TelemetryConfig) {
    INIT.call_once(|| {
        let filter = config.env_filter();
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

        match config.otlp_endpoint.as_deref() {
            Some(endpoint) => match build_otlp_layer(&config.service_name, endpoint) {
                Ok(otlp_layer) => {
                    let subscriber = Registry::default().with(filter).with(fmt_layer).with(otlp_layer);
                    let _ = subscriber.try_init();
                }
                Err(err) => {
                    let subscriber = Registry::default().with(filter).with(fmt_layer);
                    let _ = subscriber.try_init();
                    tracing::warn!(error = %err, "continuing without OTLP export");
                }
            },
            None => {
                let subscriber = Registry::default().with(filter).with(fmt_layer);
                let _ = subscriber.try_init();
            }
        }
    });
}

#[cfg(feature = "otlp")]
fn build_otlp_layer(
    service_name: &str,
    endpoint: &str,
) -> Result<tracing_opentelemetry::OpenTelemetryLayer<Registry, opentelemetry_sdk::trace::Tracer>, Error> {
    use opentelemetry::KeyValue;
    use opentelemetry_otlp::WithExportConfig;
    use opentelemetry_sdk::trace::Config as TraceConfig;
    use opentelemetry_sdk::Resource;

    let tracer = opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(opentelemetry_otlp::new_exporter().tonic().with_endpoint(endpoint))
        .with_trace_config(TraceConfig::default().with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            service_name.to_string(),
        )])))
        .install_batch(opentelemetry_sdk::runtime::Tokio)
        .map_err(|e| Error::Otlp(e.to_string()))?;

    Ok(tracing_opentelemetry::layer().with_tracer(tracer))
}

#[cfg(not(feature = "otlp"))]
fn build_otlp_layer(_service_name: &str, _endpoint: &str) -> Result<NoopLayer, Error> {
    Err(Error::Otlp("telemetry crate was built without the `otlp` feature".to_string()))
}

#[cfg(not(feature = "otlp"))]
#[derive(Default)]
struct NoopLayer;

#[cfg(not(feature = "otlp"))]
impl<S> tracing_subscriber::Layer<S> for NoopLayer where S: tracing::Subscriber {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        let config = TelemetryConfig { service_name: "x".into(), ..Default::default() };
        assert_eq!(config.default_level, "info");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn builder_methods_set_fields() {
        let config = TelemetryConfig::default().with_service_name("svc").with_otlp_endpoint("http://localhost:4317");
        assert_eq!(config.service_name, "svc");
        assert_eq!(config.otlp_endpoint.as_deref(), Some("http://localhost:4317"));
    }

    #[test]
    fn init_is_idempotent() {
        init_with_config(TelemetryConfig::default());
        init_with_config(TelemetryConfig::default());
    }
}
