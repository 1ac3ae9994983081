//! Tracing subscriber setup and metric descriptions.

use std::sync::Once;

use anyhow::{Context, Result};
use metrics::{Unit, describe_counter};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::application::services::page_cache_service::{CACHE_HITS, CACHE_MISSES};

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over `log_level` when set. `log_format` is `json` for
/// structured output and anything else for plain text.
pub fn init(log_level: &str, log_format: &str) -> Result<()> {
    describe_metrics();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .context("invalid log filter")?;

    let fmt_layer = match log_format {
        "json" => fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .boxed(),
        _ => fmt::layer().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("failed to install tracing subscriber")
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(CACHE_HITS, Unit::Count, "Page cache hits.");
        describe_counter!(CACHE_MISSES, Unit::Count, "Page cache misses, including cache backend failures.");
    });
}
