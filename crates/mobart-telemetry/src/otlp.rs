//! OTLP export of spans and metrics

use std::time::Duration;

use anyhow::Context;
use mobart_config::TelemetryConfig;
use mobart_config::telemetry::exporters::{ExportProtocol, ExporterConfig};
use opentelemetry::global;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{MetricExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::trace::{Sampler, SdkTracer, SdkTracerProvider};

use crate::metadata;

/// Shuts exporters down, flushing pending data, when dropped
#[derive(Default)]
pub struct TelemetryGuard {
    meters: Option<SdkMeterProvider>,
    tracers: Option<SdkTracerProvider>,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        let results = [
            ("meter", self.meters.take().map(|p| p.shutdown())),
            ("tracer", self.tracers.take().map(|p| p.shutdown())),
        ];

        for (kind, result) in results {
            if let Some(Err(e)) = result {
                eprintln!("failed to shut down {kind} provider: {e}");
            }
        }
    }
}

/// Register global meter and tracer providers exporting to `exporter`
pub(crate) fn install(
    settings: &TelemetryConfig,
    exporter: &ExporterConfig,
) -> anyhow::Result<(TelemetryGuard, SdkTracer)> {
    let resource = metadata::build_resource(settings);

    let reader = PeriodicReader::builder(metric_exporter(exporter)?)
        .with_interval(Duration::from_secs(exporter.export_interval))
        .build();

    let meters = SdkMeterProvider::builder()
        .with_resource(resource.clone())
        .with_reader(reader)
        .build();
    global::set_meter_provider(meters.clone());

    let tracers = SdkTracerProvider::builder()
        .with_resource(resource)
        .with_sampler(Sampler::ParentBased(Box::new(sampler(settings.sampling_rate))))
        .with_batch_exporter(span_exporter(exporter)?)
        .build();
    global::set_tracer_provider(tracers.clone());

    let tracer = tracers.tracer("mobart");

    Ok((
        TelemetryGuard {
            meters: Some(meters),
            tracers: Some(tracers),
        },
        tracer,
    ))
}

fn metric_exporter(config: &ExporterConfig) -> anyhow::Result<MetricExporter> {
    let builder = MetricExporter::builder();

    match config.protocol {
        ExportProtocol::Grpc => builder.with_tonic().with_endpoint(config.endpoint.as_str()).build(),
        ExportProtocol::HttpProto => builder.with_http().with_endpoint(config.endpoint.as_str()).build(),
    }
    .context("failed to build OTLP metric exporter")
}

fn span_exporter(config: &ExporterConfig) -> anyhow::Result<SpanExporter> {
    let builder = SpanExporter::builder();

    match config.protocol {
        ExportProtocol::Grpc => builder.with_tonic().with_endpoint(config.endpoint.as_str()).build(),
        ExportProtocol::HttpProto => builder.with_http().with_endpoint(config.endpoint.as_str()).build(),
    }
    .context("failed to build OTLP span exporter")
}

fn sampler(rate: f64) -> Sampler {
    match rate {
        r if r >= 1.0 => Sampler::AlwaysOn,
        r if r <= 0.0 => Sampler::AlwaysOff,
        r => Sampler::TraceIdRatioBased(r),
    }
}
