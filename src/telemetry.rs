//! Logging and trace export setup

use anyhow::{Context, Result};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::{SpanExporter, WithExportConfig};
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::trace::SdkTracerProvider;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::LoggingConfig;

/// Flushes exported spans when dropped
#[derive(Debug)]
pub struct TelemetryGuard {
    provider: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if let Some(provider) = self.provider.take() {
            if let Err(err) = provider.shutdown() {
                eprintln!("Failed to flush trace exporter: {err}");
            }
        }
    }
}

/// Filter directive: `RUST_LOG` wins over the configured level
fn filter_directive(level: &str, rust_log: Option<String>) -> String {
    rust_log
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| format!("{level},tower_http=info,reqwest_retry=warn"))
}

fn tracer_provider(endpoint: &str, service_name: &'static str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_endpoint(endpoint)
        .build()
        .context("Failed to create OTLP span exporter")?;

    Ok(SdkTracerProvider::builder()
        .with_batch_exporter(exporter)
        .with_resource(Resource::builder().with_service_name(service_name).build())
        .build())
}

/// Install the global subscriber: an env filter, a pretty or JSON formatter
/// and, when an OTLP endpoint is configured, span export.
pub fn init(config: &LoggingConfig, service_name: &'static str) -> Result<TelemetryGuard> {
    let filter = EnvFilter::try_new(filter_directive(
        &config.level,
        std::env::var("RUST_LOG").ok(),
    ))
    .context("Invalid log filter")?;

    let fmt_layer = if config.format == "json" {
        fmt::layer().json().with_current_span(true).boxed()
    } else {
        fmt::layer().with_target(false).boxed()
    };

    let provider = config
        .otlp_endpoint
        .as_deref()
        .map(|endpoint| tracer_provider(endpoint, service_name))
        .transpose()?;
    let otel_layer = provider
        .as_ref()
        .map(|provider| tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name)));
    if let Some(provider) = &provider {
        global::set_tracer_provider(provider.clone());
    }

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(otel_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        otlp = config.otlp_endpoint.is_some(),
        "Telemetry initialized"
    );
    Ok(TelemetryGuard { provider })
}
