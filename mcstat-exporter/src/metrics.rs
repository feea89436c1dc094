//! Prometheus rendering of a status record.
//!
//! Each scrape builds a fresh registry from the record so that players who
//! left since the previous scrape disappear instead of lingering as stale
//! series.

use mcstat_query::StatusRecord;
use prometheus::{Encoder, GaugeVec, IntGaugeVec, Opts, Registry, TextEncoder};

/// Fully qualified metric names, with the optional prefix applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricNames {
    pub players_available: String,
    pub players_count: String,
    pub server_latency: String,
}

impl MetricNames {
    pub fn new(prefix: &str) -> Self {
        let name = |base: &str| {
            if prefix.is_empty() {
                base.to_string()
            } else {
                format!("{prefix}_{base}")
            }
        };
        Self {
            players_available: name("players_available"),
            players_count: name("players_count"),
            server_latency: name("server_latency"),
        }
    }
}

impl Default for MetricNames {
    fn default() -> Self {
        Self::new("")
    }
}

/// Render the record in the Prometheus text format.
///
/// No record renders as an empty exposition.
pub fn render(record: Option<&StatusRecord>, names: &MetricNames) -> prometheus::Result<String> {
    let Some(record) = record else {
        return Ok(String::new());
    };

    let registry = Registry::new();

    let available = IntGaugeVec::new(
        Opts::new(&names.players_available, "currently available players on server"),
        &["uuid", "name"],
    )?;
    for (uuid, name) in &record.players {
        available.with_label_values(&[uuid.as_str(), name.as_str()]).set(1);
    }
    registry.register(Box::new(available))?;

    let count = IntGaugeVec::new(
        Opts::new(&names.players_count, "current amount of players on server"),
        &["type"],
    )?;
    count
        .with_label_values(&["online"])
        .set(i64::from(record.players_online));
    if let Some(max) = record.players_max {
        count.with_label_values(&["max"]).set(i64::from(max));
    }
    registry.register(Box::new(count))?;

    if let Some(latency) = record.latency {
        let gauge = GaugeVec::new(
            Opts::new(&names.server_latency, "current value of server-latency"),
            &["latency"],
        )?;
        gauge.with_label_values(&["latency"]).set(latency);
        registry.register(Box::new(gauge))?;
    }

    let mut buffer = Vec::new();
    TextEncoder::new().encode(&registry.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}
