use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::cache::metric_names::{
    CACHE_DEDUP_TOTAL, CACHE_EVICT_TOTAL, CACHE_HIT_TOTAL, CACHE_INVALIDATED_TOTAL, CACHE_MISS_TOTAL,
};
use crate::config::{LogFormat, LoggingSettings};
use crate::transport::METRIC_TRANSPORT_REQUEST_MS;

use super::error::ClientError;

static METRIC_DESCRIPTIONS: Once = Once::new();

const CACHE_COUNTERS: &[(&str, &str)] = &[
    (CACHE_HIT_TOTAL, "Subscriptions served from fresh cached data."),
    (CACHE_MISS_TOTAL, "Subscriptions that started a new fetch."),
    (CACHE_DEDUP_TOTAL, "Subscriptions that joined a fetch already in flight."),
    (CACHE_INVALIDATED_TOTAL, "Cache entries marked stale by tag invalidation."),
    (CACHE_EVICT_TOTAL, "Cache entries evicted after their grace period."),
];

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), ClientError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_target(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            ClientError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        for (name, description) in CACHE_COUNTERS {
            describe_counter!(*name, Unit::Count, *description);
        }
        describe_histogram!(
            METRIC_TRANSPORT_REQUEST_MS,
            Unit::Milliseconds,
            "HTTP request latency in milliseconds."
        );
    });
}
