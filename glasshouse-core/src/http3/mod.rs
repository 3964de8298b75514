//! Component (E): the HTTP/3 adapter (spec §4.5). Thin surface converting
//! QUIC-delivered requests into the shared response-building pipeline.
//! The QUIC transport itself is an external collaborator (spec §1, §6):
//! this module defines the shape it is expected to hand requests in and
//! does the one conversion spec §4.5 describes, but never opens a UDP
//! socket or speaks QUIC/h3 itself.

use std::sync::Arc;
use std::time::Instant;

use crate::analytics::{AnalyticsHandle, AnalyticsRecord};
use crate::fingerprint::{FingerprintBlock, TlsFingerprint};
use crate::router::{RequestDescriptor, Router};

/// Everything the external QUIC stack is expected to have decoded by the
/// time it calls [`handle_request`]: method/path/headers/body, plus the
/// peer address. The TLS fingerprint is supplied separately (derived at
/// QUIC/TLS 1.3 session establishment, spec §4.5) since it is stable for
/// the connection rather than per-request.
#[derive(Debug, Clone)]
pub struct Http3Request {
    pub ip: String,
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// What the adapter hands back for the QUIC stack to frame onto its own
/// stream type. WebSocket upgrades (spec §4.5 "supported only on this
/// transport") are the QUIC stack's concern; this adapter only ever
/// produces a plain response.
#[derive(Debug, Clone)]
pub struct Http3Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Runs one HTTP/3 request through the same router every other protocol
/// engine uses (spec §4.5: "invokes the router, honours the same
/// redirect/set-cookies tags, emits the same tracking headers").
pub async fn handle_request(
    request: Http3Request,
    tls: Arc<TlsFingerprint>,
    router: Arc<Router>,
    analytics: Option<Arc<AnalyticsHandle>>,
) -> Http3Response {
    let start = Instant::now();
    let header_lines: Vec<String> =
        request.headers.iter().map(|(n, v)| format!("{n}: {v}")).collect();
    let user_agent = request
        .headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case("user-agent"))
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    let fingerprint = FingerprintBlock::new((*tls).clone(), &request.method, "HTTP/3", &header_lines);

    let descriptor = RequestDescriptor {
        ip: request.ip,
        http_version: "h3".to_string(),
        method: request.method,
        path: request.path,
        query: request.query,
        user_agent,
        headers: request.headers,
        body: request.body,
        tls: fingerprint.clone(),
        h2_frames: None,
    };

    let is_admin = router.is_admin(&descriptor);
    let directive = router.dispatch(&descriptor).await;

    if let Some(handle) = analytics {
        let record = AnalyticsRecord {
            user_agent: descriptor.user_agent.clone(),
            ja3: fingerprint.tls.ja3.clone(),
            ja4: fingerprint.tls.ja4.clone(),
            ja4h: fingerprint.ja4h.clone(),
            h2: None,
            peetprint: fingerprint.tls.peetprint.clone(),
            ip: None,
            time_unix: 0,
        };
        handle.record_async(record, &descriptor.ip);
    }

    let resolved = directive.resolve();
    let mut headers = vec![
        ("server".to_string(), crate::router::SERVER_NAME.to_string()),
        ("content-length".to_string(), resolved.body.len().to_string()),
        ("content-type".to_string(), resolved.content_type),
        ("x-request-id".to_string(), crate::router::request_id()),
        ("x-response-time".to_string(), crate::router::response_time_ms(start.elapsed())),
        ("alt-svc".to_string(), crate::router::ALT_SVC.to_string()),
    ];
    if is_admin {
        headers.extend(
            crate::router::CORS_HEADERS.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        );
    }
    headers.extend(resolved.extra_headers);

    Http3Response { status: resolved.status, headers, body: resolved.body }
}
