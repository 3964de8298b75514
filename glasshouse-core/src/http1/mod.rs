//! Component (C): the HTTP/1.1 line engine (spec §4.3). Strictly serial:
//! read the first 1024 bytes off the plaintext-after-TLS stream, parse a
//! single request line plus headers, dispatch through the shared router,
//! write back status line + headers + body. One request per connection —
//! keep-alive is optional and this engine does not implement it (spec
//! §4.3 "may be omitted").

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{split, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::analytics::{AnalyticsHandle, AnalyticsRecord};
use crate::error::{GlassError, Result};
use crate::fingerprint::{FingerprintBlock, TlsFingerprint};
use crate::router::{RequestDescriptor, ResponseDirective, Router};

/// Spec §4.3: "Accepts the first 1024 bytes after TLS".
const HEAD_CAP: usize = 1024;
/// Sentinel used for method/path/version when the request line does not
/// have exactly three whitespace-separated tokens (spec §4.3).
const MALFORMED: &str = "--";
const SERVER_NAME: &str = "TrackMe";

/// Runs the HTTP/1.1 engine for one accepted, already-TLS-terminated
/// connection to completion: one request in, one response out.
pub async fn run<S>(
    stream: S,
    peer_ip: String,
    tls: Arc<TlsFingerprint>,
    router: Arc<Router>,
    analytics: Option<Arc<AnalyticsHandle>>,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut reader, mut writer) = split(stream);
    let start = Instant::now();

    let raw = read_head(&mut reader).await?;
    let parsed = parse_request(&raw);

    let fingerprint = FingerprintBlock::new((*tls).clone(), &parsed.method, "HTTP/1.1", &parsed.header_lines);

    let descriptor = RequestDescriptor {
        ip: peer_ip,
        http_version: "http/1.1".to_string(),
        method: parsed.method,
        path: parsed.path,
        query: parsed.query,
        user_agent: parsed.user_agent,
        headers: parsed.headers,
        body: parsed.body,
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

    write_response(&mut writer, directive, is_admin, start.elapsed()).await
}

struct ParsedRequest {
    method: String,
    path: String,
    query: String,
    user_agent: String,
    headers: Vec<(String, String)>,
    header_lines: Vec<String>,
    body: Vec<u8>,
}

/// Reads up to [`HEAD_CAP`] bytes, stopping early once a full
/// `\r\n\r\n` header terminator has arrived.
async fn read_head<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(HEAD_CAP);
    let mut chunk = [0u8; 256];
    loop {
        if buf.len() >= HEAD_CAP {
            break;
        }
        let n = reader.read(&mut chunk).await.map_err(GlassError::Io)?;
        if n == 0 {
            break;
        }
        let take = n.min(HEAD_CAP - buf.len());
        buf.extend_from_slice(&chunk[..take]);
        if find_subslice(&buf, b"\r\n\r\n").is_some() {
            break;
        }
    }
    Ok(buf)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_request(raw: &[u8]) -> ParsedRequest {
    let text = String::from_utf8_lossy(raw);
    let mut lines = text.split("\r\n");

    let request_line = lines.next().unwrap_or("");
    let tokens: Vec<&str> = request_line.split_whitespace().collect();
    let (method, full_path, version_str) = if tokens.len() == 3 {
        (tokens[0].to_string(), tokens[1].to_string(), tokens[2].to_string())
    } else {
        (MALFORMED.to_string(), MALFORMED.to_string(), MALFORMED.to_string())
    };
    let _ = version_str;

    let (path, query) = match full_path.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (full_path, String::new()),
    };

    let mut headers = Vec::new();
    let mut header_lines = Vec::new();
    let mut body_start: Option<usize> = None;
    let mut consumed = request_line.len() + 2;

    for line in lines {
        consumed += line.len() + 2;
        if line.is_empty() {
            body_start = Some(consumed);
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim().to_string();
            let value = value.trim().to_string();
            header_lines.push(format!("{name}: {value}"));
            headers.push((name, value));
        }
    }

    let body = match body_start {
        Some(offset) if offset <= raw.len() => raw[offset..].to_vec(),
        _ => Vec::new(),
    };

    let user_agent = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
        .map(|(_, v)| v.clone())
        .unwrap_or_default();

    ParsedRequest { method, path, query, user_agent, headers, header_lines, body }
}

async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    directive: ResponseDirective,
    is_admin: bool,
    elapsed: Duration,
) -> Result<()> {
    let resolved = directive.resolve();
    let reason = http::StatusCode::from_u16(resolved.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown");

    let mut out = format!("HTTP/1.1 {} {reason}\r\n", resolved.status);
    out.push_str(&format!("Content-Length: {}\r\n", resolved.body.len()));
    out.push_str(&format!("Content-Type: {}\r\n", resolved.content_type));
    out.push_str(&format!("X-Request-Id: {}\r\n", crate::router::request_id()));
    out.push_str(&format!("X-Response-Time: {}\r\n", crate::router::response_time_ms(elapsed)));
    out.push_str(&format!("Server: {SERVER_NAME}\r\n"));
    out.push_str(&format!("Alt-Svc: {}\r\n", crate::router::ALT_SVC));
    for (name, value) in &resolved.extra_headers {
        out.push_str(&format!("{}: {value}\r\n", title_case(name)));
    }
    if is_admin {
        for (name, value) in crate::router::CORS_HEADERS {
            out.push_str(&format!("{name}: {value}\r\n"));
        }
    }
    out.push_str("\r\n");

    writer.write_all(out.as_bytes()).await.map_err(GlassError::Io)?;
    writer.write_all(&resolved.body).await.map_err(GlassError::Io)?;
    writer.flush().await.map_err(GlassError::Io)?;
    Ok(())
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}
