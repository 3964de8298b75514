//! `/stream/{n}` and `/sse[/n]` (spec §4.7).

use serde_json::json;

use crate::analytics::ip_without_port;
use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

const STREAM_PREFIX: &str = "/stream/";
const SSE_PREFIX: &str = "/sse/";

fn origin_and_url(req: &RequestDescriptor) -> (String, String) {
    let host = req.header("host").unwrap_or("glasshouse");
    (ip_without_port(&req.ip), format!("https://{host}{}", req.path))
}

/// Newline-delimited JSON, `n` objects `{id, ja3_hash, origin, url}`,
/// `1 <= n <= 100` (spec §4.7).
pub fn stream(req: &RequestDescriptor) -> HandlerFuture {
    let n: u32 = req.path.strip_prefix(STREAM_PREFIX).and_then(|s| s.parse().ok()).unwrap_or(1);
    let n = n.clamp(1, 100);
    let (origin, url) = origin_and_url(req);
    let ja3_hash = req.tls.tls.ja3_hash.clone();

    let mut body = String::new();
    for id in 0..n {
        let line = json!({ "id": id, "ja3_hash": ja3_hash, "origin": origin, "url": url });
        body.push_str(&line.to_string());
        body.push('\n');
    }
    immediate(ResponseDirective::new(body.into_bytes(), "application/x-ndjson"))
}

/// `n` `data:` events plus a final `event: done` (spec §4.7), `n`
/// defaulting to 10 when the path carries no count.
pub fn sse(req: &RequestDescriptor) -> HandlerFuture {
    let n: u32 = req.path.strip_prefix(SSE_PREFIX).and_then(|s| s.parse().ok()).unwrap_or(10);
    let n = n.clamp(1, 100);

    let mut body = String::new();
    for id in 0..n {
        body.push_str(&format!("data: {{\"id\": {id}}}\n\n"));
    }
    body.push_str("event: done\ndata: {}\n\n");
    immediate(ResponseDirective::new(body.into_bytes(), "text/event-stream"))
}
