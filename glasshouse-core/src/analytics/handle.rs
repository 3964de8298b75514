use std::sync::Arc;

use super::record::{ip_without_port, AnalyticsRecord};
use super::sink::Sink;

/// Bundles a [`Sink`] with the one config knob that changes what gets
/// written to it (`mongo_log_ips`, spec §6), so the protocol engines
/// thread this one handle instead of reaching into `Config` directly
/// (spec §9 "Global mutable state" — thread explicit parameters rather
/// than process-wide singletons).
pub struct AnalyticsHandle {
    sink: Arc<dyn Sink>,
    log_ips: bool,
}

impl AnalyticsHandle {
    pub fn new(sink: Arc<dyn Sink>, log_ips: bool) -> Self {
        Self { sink, log_ips }
    }

    /// Fire-and-forget write (spec §4, §7 "Analytics sink down": best
    /// effort, failure logged once per request and ignored). `ip` is the
    /// raw peer address (with port); stripped and recorded only when
    /// `mongo_log_ips` is set.
    pub fn record_async(&self, mut record: AnalyticsRecord, ip: &str) {
        if self.log_ips {
            record.ip = Some(ip_without_port(ip));
        }
        record.time_unix = unix_time_best_effort();
        let sink = self.sink.clone();
        tokio::spawn(async move {
            if let Err(err) = sink.record(record).await {
                tracing::warn!(error = %err, "analytics write failed");
            }
        });
    }

    pub fn sink(&self) -> Arc<dyn Sink> {
        self.sink.clone()
    }
}

fn unix_time_best_effort() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}
