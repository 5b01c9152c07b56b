use opentelemetry::trace::TraceId;

/// Fetch the opentelemetry::trace::TraceId of the current tracing span
pub fn get_trace_id() -> TraceId {
    use opentelemetry::trace::TraceContextExt as _;
    use tracing_opentelemetry::OpenTelemetrySpanExt as _;

    tracing::Span::current()
        .context()
        .span()
        .span_context()
        .trace_id()
}

#[cfg(feature = "telemetry")]
pub async fn init_tracer() -> opentelemetry_sdk::trace::Tracer {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig as _;

    let endpoint = std::env::var("OPENTELEMETRY_ENDPOINT_URL")
        .expect("Needs an otel collector on OPENTELEMETRY_ENDPOINT_URL");

    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .expect("valid otlp exporter");

    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_resource(opentelemetry_sdk::Resource::new(vec![
            opentelemetry::KeyValue::new("service.name", "crescendo-operator"),
        ]))
        .build();

    opentelemetry::global::set_tracer_provider(provider.clone());
    provider.tracer("tracing-otel-subscriber")
}

#[cfg(test)]
mod tests {
    // Outside a configured subscriber the trace id must be the invalid all-zero one
    #[test]
    fn test_trace_id_is_invalid_outside_a_span() {
        assert_eq!(super::get_trace_id(), opentelemetry::trace::TraceId::INVALID);
    }
}
