//! `/api/*`: fingerprint introspection plus the analytics lookups
//! backed by whatever `Sink` the service was started with (spec §6
//! "Analytics endpoints" / "Fingerprint endpoints").

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use crate::analytics::{AnalyticsHandle, FingerprintKind};
use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

pub(super) fn tls_json(req: &RequestDescriptor) -> serde_json::Value {
    let tls = &req.tls.tls;
    json!({
        "ja3": tls.ja3,
        "ja3_hash": tls.ja3_hash,
        "ja4": tls.ja4,
        "ja4_r": tls.ja4_r,
        "ja4h": req.tls.ja4h,
        "ja4h_r": req.tls.ja4h_r,
        "peetprint": tls.peetprint,
        "peetprint_hash": tls.peetprint_hash,
        "h2": req.h2_frames.as_ref().map(|frames| crate::http2::compute_akamai_fingerprint(frames)),
    })
}

pub fn all(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "ip": req.ip,
        "http_version": req.http_version,
        "method": req.method,
        "path": req.path,
        "headers": req.normalized_headers().into_iter().collect::<HashMap<_, _>>(),
        "tls": tls_json(req),
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn tls(req: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::json(serde_json::to_vec(&tls_json(req)).unwrap_or_default()))
}

/// Hashes only (spec §6 `/api/clean`) — no raw bytes, no ordered lists.
pub fn clean(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "ja3_hash": req.tls.tls.ja3_hash,
        "ja4": req.tls.tls.ja4,
        "ja4_r": req.tls.tls.ja4_r,
        "ja4h": req.tls.ja4h,
        "ja4h_r": req.tls.ja4h_r,
        "peetprint_hash": req.tls.tls.peetprint_hash,
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn raw(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "raw_hex": req.tls.tls.raw_hex,
        "raw_b64": req.tls.tls.raw_b64,
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn sni(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "sni": req.tls.tls.sni,
        "http_version": req.http_version,
        "ip": req.ip,
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

fn unavailable() -> ResponseDirective {
    ResponseDirective::with_status(
        br#"{"error":"analytics unavailable"}"#.to_vec(),
        503,
        "application/json",
    )
}

/// Builds the `/api/search-{kind}` handler for one fixed `kind`, closing
/// over the analytics handle — the one place the router's handlers need
/// captured state rather than a bare path lookup.
pub fn search(
    kind: FingerprintKind,
    analytics: Arc<AnalyticsHandle>,
) -> impl Fn(&RequestDescriptor) -> HandlerFuture + Send + Sync + 'static {
    move |req: &RequestDescriptor| {
        let value =
            req.query_pairs().into_iter().find(|(k, _)| k == "by").map(|(_, v)| v).unwrap_or_default();
        let sink = analytics.sink();
        Box::pin(async move {
            match sink.search(kind, &value).await {
                Ok(result) => ResponseDirective::json(serde_json::to_vec(&result).unwrap_or_default()),
                Err(err) => {
                    tracing::warn!(error = %err, "analytics search failed");
                    unavailable()
                }
            }
        })
    }
}

pub fn request_count(
    analytics: Arc<AnalyticsHandle>,
) -> impl Fn(&RequestDescriptor) -> HandlerFuture + Send + Sync + 'static {
    move |_req: &RequestDescriptor| {
        let sink = analytics.sink();
        Box::pin(async move {
            match sink.request_count().await {
                Ok(count) => ResponseDirective::json(
                    serde_json::to_vec(&json!({ "request_count": count })).unwrap_or_default(),
                ),
                Err(err) => {
                    tracing::warn!(error = %err, "analytics request-count failed");
                    unavailable()
                }
            }
        })
    }
}
