use tokio::sync::Mutex;

use super::record::AnalyticsRecord;
use super::sink::{top_cooccurrences, FingerprintKind, SearchResult, Sink, SinkFuture};

/// In-memory analytics sink: the default when `log_to_db` is unset, and
/// what integration tests exercise the `/api/*` surface against without a
/// live MongoDB instance.
#[derive(Default)]
pub struct MemorySink {
    records: Mutex<Vec<AnalyticsRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sink for MemorySink {
    fn record(&self, record: AnalyticsRecord) -> SinkFuture<'_, ()> {
        Box::pin(async move {
            self.records.lock().await.push(record);
            Ok(())
        })
    }

    fn search(&self, kind: FingerprintKind, value: &str) -> SinkFuture<'_, SearchResult> {
        let value = value.to_string();
        Box::pin(async move {
            let records = self.records.lock().await;
            Ok(top_cooccurrences(&records, kind, &value))
        })
    }

    fn request_count(&self) -> SinkFuture<'_, u64> {
        Box::pin(async move { Ok(self.records.lock().await.len() as u64) })
    }
}
