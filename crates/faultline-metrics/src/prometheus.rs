//! Prometheus text-format exporter

use crate::collector::MetricsCollector;
use std::fmt::Write;

const LATENCY_METRIC: &str = "faultline_http_request_latency_seconds";
const REQUESTS_METRIC: &str = "faultline_http_requests_total";

/// Renders the collector state in the Prometheus text exposition format.
#[derive(Debug)]
pub struct PrometheusExporter;

impl PrometheusExporter {
    /// Export the current snapshot.
    pub fn export(collector: &MetricsCollector) -> String {
        let mut output = String::with_capacity(4096);

        writeln!(
            output,
            "# HELP {REQUESTS_METRIC} Total number of HTTP requests served"
        )
        .expect("write to String");
        writeln!(output, "# TYPE {REQUESTS_METRIC} counter").expect("write to String");
        writeln!(output, "{REQUESTS_METRIC} {}", collector.total_requests())
            .expect("write to String");

        writeln!(
            output,
            "# HELP {LATENCY_METRIC} HTTP request processing latency in seconds"
        )
        .expect("write to String");
        writeln!(output, "# TYPE {LATENCY_METRIC} histogram").expect("write to String");

        let buckets = collector.buckets().to_vec();

        for series in collector.snapshot() {
            let labels = format!(
                "method=\"{}\",path=\"{}\",status=\"{}\"",
                series.key.method,
                sanitize_label(&series.key.path),
                series.key.status
            );

            for (upper, cumulative) in buckets.iter().zip(&series.cumulative) {
                writeln!(
                    output,
                    "{LATENCY_METRIC}_bucket{{{labels},le=\"{upper}\"}} {cumulative}"
                )
                .expect("write to String");
            }
            writeln!(
                output,
                "{LATENCY_METRIC}_bucket{{{labels},le=\"+Inf\"}} {}",
                series.count
            )
            .expect("write to String");
            writeln!(
                output,
                "{LATENCY_METRIC}_sum{{{labels}}} {:.6}",
                series.sum_seconds
            )
            .expect("write to String");
            writeln!(output, "{LATENCY_METRIC}_count{{{labels}}} {}", series.count)
                .expect("write to String");
        }

        output
    }
}

fn sanitize_label(label: &str) -> String {
    label
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
