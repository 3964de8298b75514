use serde::{Deserialize, Serialize};

/// One persisted analytics record (spec §6 "Persisted state"). Written
/// once per request when the sink is enabled; `h2` is only populated for
/// HTTP/2 requests and `ip` only when `mongo_log_ips` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsRecord {
    pub user_agent: String,
    pub ja3: String,
    pub ja4: String,
    pub ja4h: String,
    pub h2: Option<String>,
    pub peetprint: String,
    pub ip: Option<String>,
    pub time_unix: i64,
}

impl AnalyticsRecord {
    /// The field value for a given [`super::FingerprintKind`], used both
    /// to build the Mongo filter and to group co-occurrences in memory.
    pub(super) fn field(&self, kind: super::FingerprintKind) -> &str {
        use super::FingerprintKind::*;
        match kind {
            Ja3 => &self.ja3,
            Ja4 => &self.ja4,
            Ja4h => &self.ja4h,
            H2 => self.h2.as_deref().unwrap_or(""),
            PeetPrint => &self.peetprint,
            UserAgent => &self.user_agent,
        }
    }
}

/// Strips the trailing port from a socket address string, per spec §6
/// "IP is recorded... without the trailing port".
pub fn ip_without_port(addr: &str) -> String {
    if let Some(idx) = addr.rfind(':') {
        // Guard against bare IPv6 addresses (multiple colons, no port).
        if addr.matches(':').count() == 1 || addr.starts_with('[') {
            return addr[..idx].trim_start_matches('[').trim_end_matches(']').to_string();
        }
    }
    addr.to_string()
}
