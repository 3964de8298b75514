use futures_util::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Client, Collection};

use crate::error::{GlassError, Result};

use super::record::AnalyticsRecord;
use super::sink::{top_cooccurrences, FingerprintKind, SearchResult, Sink, SinkFuture};

/// MongoDB-backed analytics sink (spec §6 `mongo_url`/`mongo_database`/
/// `mongo_collection`). The datastore itself is explicitly out of scope
/// (spec §1) — this talks to it only through the narrow [`Sink`] trait,
/// and `search` pulls matching documents back into the same
/// [`top_cooccurrences`] helper [`super::MemorySink`] uses rather than
/// hand-writing an aggregation pipeline, since this is a diagnostic
/// endpoint, not a scale-sensitive one.
pub struct MongoSink {
    collection: Collection<AnalyticsRecord>,
}

impl MongoSink {
    pub async fn connect(url: &str, database: &str, collection: &str) -> Result<Self> {
        let client = Client::with_uri_str(url)
            .await
            .map_err(|e| GlassError::Config(format!("failed to connect to mongo: {e}")))?;
        let collection = client.database(database).collection::<AnalyticsRecord>(collection);
        Ok(Self { collection })
    }
}

impl Sink for MongoSink {
    fn record(&self, record: AnalyticsRecord) -> SinkFuture<'_, ()> {
        Box::pin(async move {
            self.collection
                .insert_one(record)
                .await
                .map_err(|e| GlassError::Internal(format!("mongo insert failed: {e}")))?;
            Ok(())
        })
    }

    fn search(&self, kind: FingerprintKind, value: &str) -> SinkFuture<'_, SearchResult> {
        let value = value.to_string();
        Box::pin(async move {
            let filter = doc! { kind.as_str(): &value };
            let mut cursor = self
                .collection
                .find(filter)
                .await
                .map_err(|e| GlassError::Internal(format!("mongo find failed: {e}")))?;

            let mut records = Vec::new();
            while let Some(record) = cursor
                .try_next()
                .await
                .map_err(|e| GlassError::Internal(format!("mongo cursor failed: {e}")))?
            {
                records.push(record);
            }

            Ok(top_cooccurrences(&records, kind, &value))
        })
    }

    fn request_count(&self) -> SinkFuture<'_, u64> {
        Box::pin(async move {
            self.collection
                .count_documents(doc! {})
                .await
                .map_err(|e| GlassError::Internal(format!("mongo count failed: {e}")))
        })
    }
}
