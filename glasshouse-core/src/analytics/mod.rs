//! Component (H): the analytics sink (spec §4, §6). Optional write-through
//! to a document store, indexed by fingerprint kind, plus the lookup
//! endpoints the `httpbin::api` module exposes over it.

mod handle;
mod memory;
mod mongo;
mod record;
mod sink;

pub use handle::AnalyticsHandle;
pub use memory::MemorySink;
pub use mongo::MongoSink;
pub use record::{ip_without_port, AnalyticsRecord};
pub use sink::{CoOccurrence, FingerprintKind, SearchResult, Sink, SinkFuture};
