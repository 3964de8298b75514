use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use serde::Serialize;

use crate::error::Result;

use super::record::AnalyticsRecord;

/// The fingerprint kinds the analytics sink indexes on (spec §6
/// "Persisted state" / "Analytics endpoints").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerprintKind {
    Ja3,
    Ja4,
    Ja4h,
    H2,
    PeetPrint,
    UserAgent,
}

impl FingerprintKind {
    /// Parses the `{kind}` suffix of `/api/search-{kind}`.
    pub fn from_path_suffix(s: &str) -> Option<Self> {
        Some(match s {
            "ja3" => Self::Ja3,
            "ja4" => Self::Ja4,
            "ja4h" => Self::Ja4h,
            "h2" => Self::H2,
            "peetprint" => Self::PeetPrint,
            "useragent" => Self::UserAgent,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ja3 => "ja3",
            Self::Ja4 => "ja4",
            Self::Ja4h => "ja4h",
            Self::H2 => "h2",
            Self::PeetPrint => "peetprint",
            Self::UserAgent => "user_agent",
        }
    }

    fn all() -> [FingerprintKind; 6] {
        [Self::Ja3, Self::Ja4, Self::Ja4h, Self::H2, Self::PeetPrint, Self::UserAgent]
    }
}

/// One `(value, count)` pair in a search result, pre-sorted descending by
/// count and truncated to the top 10 (spec §6 "Analytics endpoints").
#[derive(Debug, Clone, Serialize)]
pub struct CoOccurrence {
    pub value: String,
    pub count: u64,
}

/// The full result of `/api/search-{kind}?by=<value>`: the top 10
/// co-occurring values for every *other* fingerprint kind.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub kind: &'static str,
    pub value: String,
    pub related: HashMap<&'static str, Vec<CoOccurrence>>,
}

/// A future boxed the same way [`crate::router::HandlerFuture`] is —
/// kept dependency-free rather than pulling in `async-trait` for three
/// methods.
pub type SinkFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Component (H): the analytics sink (spec §4 "Analytics sink", §6
/// "Persisted state"/"Analytics endpoints"). Write-through is always
/// best-effort from the caller's perspective — see spec §7 "Analytics
/// sink down".
pub trait Sink: Send + Sync {
    fn record(&self, record: AnalyticsRecord) -> SinkFuture<'_, ()>;
    fn search(&self, kind: FingerprintKind, value: &str) -> SinkFuture<'_, SearchResult>;
    fn request_count(&self) -> SinkFuture<'_, u64>;
}

/// Shared co-occurrence counting, used directly by [`super::MemorySink`]
/// and by [`super::MongoSink`] once it has pulled the matching documents
/// back into memory (spec §1 scopes the datastore itself out — this
/// keeps the aggregation logic in one place rather than duplicating a
/// Mongo pipeline and an in-memory pass).
pub(super) fn top_cooccurrences(
    records: &[AnalyticsRecord],
    kind: FingerprintKind,
    value: &str,
) -> SearchResult {
    let matching: Vec<&AnalyticsRecord> =
        records.iter().filter(|r| r.field(kind) == value).collect();

    let mut related = HashMap::new();
    for other in FingerprintKind::all() {
        if other == kind {
            continue;
        }
        let mut counts: HashMap<String, u64> = HashMap::new();
        for record in &matching {
            let v = record.field(other);
            if v.is_empty() {
                continue;
            }
            *counts.entry(v.to_string()).or_insert(0) += 1;
        }
        let mut entries: Vec<CoOccurrence> =
            counts.into_iter().map(|(value, count)| CoOccurrence { value, count }).collect();
        entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
        entries.truncate(10);
        related.insert(other.as_str(), entries);
    }

    SearchResult { kind: kind.as_str(), value: value.to_string(), related }
}
