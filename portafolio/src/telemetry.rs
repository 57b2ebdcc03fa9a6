//! Tracing setup: console output, optional OpenTelemetry export and the
//! ERROR-event layer feeding the `logs` table.
//!
//! OTLP export is **disabled by default** and must be enabled with the
//! `enable_otel_export` configuration flag. It is then configured through the
//! standard OpenTelemetry environment variables:
//!
//! - `OTEL_EXPORTER_OTLP_ENDPOINT` - The OTLP endpoint URL
//! - `OTEL_EXPORTER_OTLP_PROTOCOL` - `http/protobuf` (default) or `http/json`
//! - `OTEL_EXPORTER_OTLP_HEADERS` - Comma-separated key=value pairs; `%20` decodes to a space
//! - `OTEL_SERVICE_NAME` - Service name, `portafolio` when unset
//!
//! ```yaml
//! enable_otel_export: true
//! error_log:
//!   enabled: true
//!   batch_size: 50
//!   flush_interval: 1s
//! ```
//!
//! The tracer provider is kept in a `OnceLock` so [`shutdown_telemetry`] can
//! flush pending spans; `tracing-opentelemetry` only holds the tracer.

use opentelemetry::KeyValue;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{Protocol, WithExportConfig, WithHttpConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::Config;
use crate::error_log::{self, ErrorLogReceiver};

static TRACER_PROVIDER: OnceLock<SdkTracerProvider> = OnceLock::new();

/// Install the global subscriber.
///
/// Layers:
/// - `EnvFilter` from `RUST_LOG`, `info` by default
/// - console output
/// - OTLP export, when `enable_otel_export` is set and the exporter can be built
/// - the error-log layer, when `error_log.enabled` is set
///
/// Returns the receiver for the error-log writer, which
/// [`Application::new`](crate::Application::new) starts once the pool exists.
pub fn init_telemetry(config: &Config) -> anyhow::Result<Option<ErrorLogReceiver>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (error_layer, receiver) = if config.error_log.enabled {
        let (layer, receiver) = error_log::channel(config.error_log.buffer_size);
        (Some(layer), Some(receiver))
    } else {
        (None, None)
    };

    let (otel_layer, otel_error) = if config.enable_otel_export {
        match create_otlp_tracer() {
            Ok(tracer) => (Some(tracing_opentelemetry::layer().with_tracer(tracer)), None),
            Err(e) => (None, Some(e)),
        }
    } else {
        (None, None)
    };
    let otel_enabled = otel_layer.is_some();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .with(error_layer)
        .try_init()?;

    match otel_error {
        Some(e) => info!("Telemetry initialized without OTLP export: {}", e),
        None => info!(
            otlp = otel_enabled,
            error_log = config.error_log.enabled,
            "Telemetry initialized"
        ),
    }

    Ok(receiver)
}

fn parse_headers(raw: &str) -> HashMap<String, String> {
    raw.replace("%20", " ")
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect()
}

fn create_otlp_tracer() -> anyhow::Result<opentelemetry_sdk::trace::Tracer> {
    let service_name = std::env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "portafolio".to_string());
    let endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").unwrap_or_else(|_| "http://localhost:4318".to_string());

    eprintln!("[OTLP] Service Name: {}", service_name);
    eprintln!("[OTLP] Endpoint: {}", endpoint);

    let headers = std::env::var("OTEL_EXPORTER_OTLP_HEADERS")
        .map(|raw| parse_headers(&raw))
        .unwrap_or_default();

    let protocol = match std::env::var("OTEL_EXPORTER_OTLP_PROTOCOL").as_deref().unwrap_or("http/protobuf") {
        "http/json" => Protocol::HttpJson,
        _ => Protocol::HttpBinary,
    };

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_http()
        .with_endpoint(&endpoint)
        .with_protocol(protocol)
        .with_headers(headers)
        .build()?;

    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(
            opentelemetry_sdk::Resource::builder()
                .with_attribute(KeyValue::new("service.name", service_name.clone()))
                .build(),
        )
        .build();

    let tracer = tracer_provider.tracer(service_name);
    let _ = TRACER_PROVIDER.set(tracer_provider);

    Ok(tracer)
}

/// Flush pending spans. Call before exit.
pub fn shutdown_telemetry() {
    if let Some(Err(e)) = TRACER_PROVIDER.get().map(|provider| provider.shutdown()) {
        tracing::warn!("Failed to shutdown tracer provider: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers("Authorization=Basic%20abc, x-tenant = portafolio,broken");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["Authorization"], "Basic abc");
        assert_eq!(headers["x-tenant"], "portafolio");
    }
}
