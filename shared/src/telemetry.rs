//! Logging and trace export for cookbook binaries.
//!
//! Logs are JSON lines on the chosen writer. Spans are exported over OTLP/HTTP
//! only when `OTEL_EXPORTER_OTLP_ENDPOINT` is set; either way W3C trace context
//! is attached to outbound API calls through [`RequestBuilderExt`].

use anyhow::Result;
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{propagation::TraceContextPropagator, trace::TracerProvider, Resource};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::env;
use std::time::Duration;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

pub use propagation::RequestBuilderExt;

const OTLP_EXPORT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_LOG_FILTER: &str = "info";

/// HTTP internals stay quiet unless a filter names them explicitly.
const QUIET_TARGETS: &[&str] = &["hyper=warn", "hyper_util=warn", "reqwest=warn"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogWriter {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otlp_endpoint: Option<String>,
    /// `EnvFilter` directives, e.g. `info,cookbook_sdk=debug`.
    pub log_filter: String,
    pub writer: LogWriter,
}

impl TelemetryConfig {
    pub fn from_env(service_name: &str) -> Self {
        Self::from_lookup(service_name, &|key: &str| env::var(key).ok())
    }

    /// `COOKBOOK_LOG` wins over `RUST_LOG`; blank values count as unset.
    pub fn from_lookup(service_name: &str, lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            service_name: service_name.to_string(),
            otlp_endpoint: non_blank("OTEL_EXPORTER_OTLP_ENDPOINT"),
            log_filter: non_blank("COOKBOOK_LOG")
                .or_else(|| non_blank("RUST_LOG"))
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            writer: LogWriter::Stdout,
        }
    }

    /// Command-line tools keep stdout for their own output.
    pub fn with_writer(mut self, writer: LogWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter = EnvFilter::try_new(&self.log_filter)?;
        for directive in QUIET_TARGETS {
            let target = directive.split('=').next().unwrap_or_default();
            if !self.log_filter.contains(target) {
                filter = filter.add_directive(directive.parse()?);
            }
        }
        Ok(filter)
    }
}

pub fn init_telemetry(config: TelemetryConfig) -> Result<()> {
    let resource = Resource::new([
        KeyValue::new(SERVICE_NAME, config.service_name.clone()),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
    ]);

    let mut provider_builder = TracerProvider::builder().with_resource(resource);
    if let Some(endpoint) = &config.otlp_endpoint {
        let exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_http()
            .with_endpoint(endpoint)
            .with_timeout(OTLP_EXPORT_TIMEOUT)
            .build()?;
        provider_builder =
            provider_builder.with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio);
    }
    let tracer_provider = provider_builder.build();

    global::set_tracer_provider(tracer_provider.clone());
    global::set_text_map_propagator(TraceContextPropagator::new());

    let tracer = tracer_provider.tracer(config.service_name.clone());
    let writer = match config.writer {
        LogWriter::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogWriter::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::registry()
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_filter(config.env_filter()?),
        )
        .try_init()?;

    tracing::debug!(
        service_name = %config.service_name,
        otlp_endpoint = ?config.otlp_endpoint,
        filter = %config.log_filter,
        "Telemetry initialized"
    );

    Ok(())
}

pub async fn shutdown_telemetry() {
    tracing::debug!("Shutting down telemetry");
    global::shutdown_tracer_provider();
}

pub mod propagation {
    use http::HeaderMap;
    use opentelemetry::global;
    use opentelemetry_http::HeaderInjector;
    use reqwest::RequestBuilder;
    use tracing::Span;
    use tracing_opentelemetry::OpenTelemetrySpanExt;

    pub trait RequestBuilderExt {
        /// Adds `traceparent`/`tracestate` for the current span, if it is being traced.
        fn with_trace_context(self) -> Self;
    }

    impl RequestBuilderExt for RequestBuilder {
        fn with_trace_context(self) -> Self {
            let context = Span::current().context();
            let mut headers = HeaderMap::new();
            global::get_text_map_propagator(|propagator| {
                propagator.inject_context(&context, &mut HeaderInjector(&mut headers));
            });
            self.headers(headers)
        }
    }
}
