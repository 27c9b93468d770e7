//! Metrics and tracing helpers
//!
//! `metrics` feature: OpenTelemetry instruments backed by a Prometheus registry.
//! `tracing` feature: span constructors used around DDL execution and middleware chains.

#[cfg(feature = "metrics")]
pub use self::otel::{IndexMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::metrics::{Counter, Histogram, MeterProvider as _};
    use opentelemetry::{global, KeyValue};
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<IndexMetrics> = Lazy::new(IndexMetrics::init);

    pub struct IndexMetrics {
        /// `None` when the Prometheus exporter could not be built; instruments then
        /// report through the global meter.
        registry: Option<Registry>,
        _provider: Option<SdkMeterProvider>,
        pub ddl_total: Counter<u64>,
        pub duplicates_skipped: Counter<u64>,
        pub deprecated_options: Counter<u64>,
        pub query_duration: Histogram<f64>,
    }

    impl IndexMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let (meter, registry, provider) = match opentelemetry_prometheus::exporter()
                .with_registry(registry.clone())
                .build()
            {
                Ok(exporter) => {
                    let provider = SdkMeterProvider::builder().with_reader(exporter).build();
                    (provider.meter("lifeguard"), Some(registry), Some(provider))
                }
                Err(err) => {
                    log::warn!("Prometheus exporter unavailable, using global meter: {err}");
                    (global::meter("lifeguard"), None, None)
                }
            };

            let ddl_total = meter
                .u64_counter("lifeguard_index_ddl_total")
                .with_description("Index and column DDL statements issued by the index middleware")
                .build();

            let duplicates_skipped = meter
                .u64_counter("lifeguard_index_duplicates_skipped_total")
                .with_description("add_index calls skipped because an identical index already exists")
                .build();

            let deprecated_options = meter
                .u64_counter("lifeguard_index_deprecated_options_total")
                .with_description("Deprecated index options rewritten to their replacement")
                .build();

            let query_duration = meter
                .f64_histogram("lifeguard_query_duration_seconds")
                .with_description("Duration of queries")
                .build();

            Self {
                registry,
                _provider: provider,
                ddl_total,
                duplicates_skipped,
                deprecated_options,
                query_duration,
            }
        }

        pub fn record_ddl(&self, statement: &'static str) {
            self.ddl_total.add(1, &[KeyValue::new("statement", statement)]);
        }

        pub fn record_duplicate_skipped(&self) {
            self.duplicates_skipped.add(1, &[]);
        }

        pub fn record_deprecated_option(&self, option: &'static str) {
            self.deprecated_options.add(1, &[KeyValue::new("option", option)]);
        }

        pub fn record_query_duration(&self, elapsed: Duration) {
            self.query_duration.record(elapsed.as_secs_f64(), &[]);
        }

        /// Render the current metric families in the Prometheus text format
        pub fn gather(&self) -> String {
            let Some(registry) = &self.registry else {
                return String::new();
            };
            let mut buffer = Vec::new();
            if let Err(err) = TextEncoder::new().encode(&registry.gather(), &mut buffer) {
                log::warn!("failed to encode metrics: {err}");
                return String::new();
            }
            String::from_utf8(buffer).unwrap_or_default()
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::Span;

    /// Span covering one statement sent through a `LifeExecutor`
    pub fn execute_query_span(query: &str) -> Span {
        tracing::info_span!("lifeguard.execute_query", db.statement = %query)
    }

    /// Span covering one run of a middleware chain (`add_column` / `add_index`)
    pub fn pipeline_span(chain: &'static str, table: &str) -> Span {
        tracing::debug_span!("lifeguard.index_pipeline", chain, table = %table)
    }
}
