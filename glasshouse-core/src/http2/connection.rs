use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use hpack::{Decoder, Encoder};
use tokio::io::{split, AsyncRead, AsyncWrite, WriteHalf};
use tokio::sync::mpsc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::{interval, timeout, Instant};

use crate::analytics::{AnalyticsHandle, AnalyticsRecord};
use crate::error::{GlassError, Result};
use crate::fingerprint::{FingerprintBlock, TlsFingerprint};
use crate::router::{RequestDescriptor, Router};

use super::akamai;
use super::frame::{
    self, capture, header_block_fragment, read_frame, write_frame, RawFrame, ERR_NO_ERROR,
    ERR_PROTOCOL_ERROR, FLAG_ACK, FLAG_END_HEADERS, FLAG_END_STREAM, FRAME_CONTINUATION,
    FRAME_DATA, FRAME_GOAWAY, FRAME_HEADERS, FRAME_PING, FRAME_PRIORITY, FRAME_RST_STREAM,
    FRAME_SETTINGS, FRAME_WINDOW_UPDATE,
};
use super::stream::Stream;

const IDLE_TICK: Duration = Duration::from_secs(5);
const IDLE_TIMEOUT: Duration = Duration::from_secs(30);
const GOAWAY_DRAIN: Duration = Duration::from_secs(5);
const BODY_WAIT: Duration = Duration::from_secs(5);
const MAX_DATA_CHUNK: usize = 16_384;

/// The startup `SETTINGS` frame sent on every new connection (spec §4.4).
const STARTUP_SETTINGS: &[(u16, u32)] = &[
    (0x4, 1_048_576),   // INITIAL_WINDOW_SIZE
    (0x3, 100),         // MAX_CONCURRENT_STREAMS
    (0x6, 65_536),      // MAX_HEADER_LIST_SIZE
];

type SharedWriter<W> = Arc<AsyncMutex<WriteHalf<W>>>;

/// Everything a spawned request task needs that isn't in the frame it
/// received: the router, the TLS half of the fingerprint block, the
/// connection-wide captured-frame log, and the single write mutex.
struct Shared<W> {
    writer: SharedWriter<W>,
    router: Arc<Router>,
    tls: Arc<TlsFingerprint>,
    peer_ip: String,
    connection_frames: Arc<Mutex<Vec<frame::H2Frame>>>,
    analytics: Option<Arc<AnalyticsHandle>>,
}

/// Runs the HTTP/2 engine for one accepted connection, from the moment
/// the H2 preamble has already been consumed by the caller (spec §4.4
/// "Detection") until the socket closes.
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
    let (mut reader, writer) = split(stream);
    let writer = Arc::new(AsyncMutex::new(writer));

    write_settings(&writer, STARTUP_SETTINGS).await?;

    let shared = Arc::new(Shared {
        writer,
        router,
        tls,
        peer_ip,
        connection_frames: Arc::new(Mutex::new(Vec::new())),
        analytics,
    });

    let mut streams: HashMap<u32, Stream> = HashMap::new();
    let mut decoder = Decoder::new();
    let mut last_stream_id: u32 = 0;
    let mut closing = false;
    let mut ticker = interval(IDLE_TICK);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            frame = read_frame(&mut reader) => {
                let raw = match frame {
                    Ok(raw) => raw,
                    Err(_) => break,
                };
                last_activity = Instant::now();

                if closing {
                    continue;
                }

                if handle_frame(
                    raw,
                    &mut streams,
                    &mut decoder,
                    &mut last_stream_id,
                    &shared,
                ).await? {
                    closing = true;
                }
            }
            _ = ticker.tick() => {
                let idle = last_activity.elapsed() >= IDLE_TIMEOUT;
                let no_active_streams = streams.values().all(|s| s.is_closed());
                if idle && no_active_streams && !closing {
                    closing = true;
                    write_goaway(&shared.writer, last_stream_id, ERR_NO_ERROR, "").await?;
                    let _ = timeout(GOAWAY_DRAIN, drain(&mut streams)).await;
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn drain(streams: &mut HashMap<u32, Stream>) {
    while streams.values().any(|s| !s.is_closed()) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

/// Processes one frame off the wire. Returns `Ok(true)` if this was a
/// `GOAWAY` and the connection should stop accepting new work.
async fn handle_frame<W>(
    raw: RawFrame,
    streams: &mut HashMap<u32, Stream>,
    decoder: &mut Decoder<'static>,
    last_stream_id: &mut u32,
    shared: &Arc<Shared<W>>,
) -> Result<bool>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    match raw.frame_type {
        FRAME_SETTINGS if raw.flags & FLAG_ACK == 0 => {
            let captured = capture(&raw, None)?;
            shared.connection_frames.lock().expect("lock poisoned").push(captured);
            write_frame(&mut *shared.writer.lock().await, FRAME_SETTINGS, FLAG_ACK, 0, &[])
                .await?;
        }
        FRAME_SETTINGS => {}
        FRAME_HEADERS => {
            let id = raw.stream_id;
            *last_stream_id = (*last_stream_id).max(id);
            let end_stream = raw.flags & FLAG_END_STREAM != 0;
            let header_block = header_block_fragment(&raw)?;
            let decoded = decode_headers(decoder, &header_block);

            let decoded = match decoded {
                Ok(decoded) => decoded,
                Err(_) => {
                    write_rst_stream(&shared.writer, id, ERR_PROTOCOL_ERROR).await?;
                    return Ok(false);
                }
            };

            let captured = capture(&raw, Some(decoded.lines.clone()))?;

            // One HEADERS frame starts a stream for this workload (no
            // trailers support): create it fresh, grabbing the body
            // receiver end now so the request task below can own it.
            let (new_stream, body_rx) = Stream::new(id);
            let stream_entry = streams.entry(id).or_insert(new_stream);
            stream_entry.record(captured);
            if end_stream {
                stream_entry.on_end_stream_received();
            }

            let body_rx = if end_stream { None } else { Some(body_rx) };
            let stream_frames = stream_entry.captured_frames.clone();
            let stream_state_closed = stream_entry.is_closed();

            spawn_request_task(
                Arc::clone(shared),
                id,
                decoded,
                body_rx,
                stream_frames,
                stream_state_closed,
            );
        }
        FRAME_CONTINUATION => {
            // header-block continuation is folded into the owning HEADERS
            // frame by `read_frame`'s caller in practice for this workload;
            // treated as a no-op frame at the connection level otherwise.
            if raw.flags & FLAG_END_HEADERS != 0 {
                // nothing further to decode without a pending HEADERS state
            }
        }
        FRAME_DATA => {
            let id = raw.stream_id;
            let end_stream = raw.flags & FLAG_END_STREAM != 0;
            let captured = capture(&raw, None)?;
            let data_payload = Bytes::copy_from_slice(&raw.payload);
            if let Some(stream) = streams.get_mut(&id) {
                stream.record(captured);
                stream.push_body_chunk(data_payload);
                if end_stream {
                    stream.on_end_stream_received();
                }
            } else {
                // DATA on a stream that never received HEADERS: an
                // illegal transition, scoped to that stream (spec §4.4
                // "An unknown / illegal transition yields
                // RST_STREAM(PROTOCOL_ERROR) on that stream; the
                // connection stays open").
                write_rst_stream(&shared.writer, id, ERR_PROTOCOL_ERROR).await?;
            }
        }
        FRAME_WINDOW_UPDATE => {
            let captured = capture(&raw, None)?;
            if raw.stream_id == 0 {
                shared.connection_frames.lock().expect("lock poisoned").push(captured);
            } else if let Some(stream) = streams.get_mut(&raw.stream_id) {
                stream.record(captured);
            }
        }
        FRAME_PRIORITY => {
            let captured = capture(&raw, None)?;
            if let Some(stream) = streams.get_mut(&raw.stream_id) {
                stream.record(captured);
            } else {
                shared.connection_frames.lock().expect("lock poisoned").push(captured);
            }
        }
        FRAME_PING if raw.flags & FLAG_ACK == 0 => {
            write_frame(&mut *shared.writer.lock().await, FRAME_PING, FLAG_ACK, 0, &raw.payload)
                .await?;
        }
        FRAME_PING => {}
        FRAME_GOAWAY => {
            return Ok(true);
        }
        FRAME_RST_STREAM => {
            if let Some(stream) = streams.get_mut(&raw.stream_id) {
                stream.reset();
            }
        }
        _ => {}
    }

    Ok(false)
}

struct DecodedHeaders {
    lines: Vec<String>,
    method: String,
    path: String,
    authority: String,
    scheme: String,
}

fn decode_headers(decoder: &mut Decoder<'static>, block: &[u8]) -> Result<DecodedHeaders> {
    let pairs = decoder
        .decode(block)
        .map_err(|e| GlassError::Internal(format!("HPACK decode error: {e:?}")))?;

    let mut lines = Vec::with_capacity(pairs.len());
    let mut method = String::new();
    let mut path = String::new();
    let mut authority = String::new();
    let mut scheme = String::new();

    for (name, value) in &pairs {
        let name = String::from_utf8_lossy(name).into_owned();
        let value = String::from_utf8_lossy(value).into_owned();
        match name.as_str() {
            ":method" => method = value.clone(),
            ":path" => path = value.clone(),
            ":authority" => authority = value.clone(),
            ":scheme" => scheme = value.clone(),
            _ => {}
        }
        lines.push(format!("{name}: {value}"));
    }

    Ok(DecodedHeaders { lines, method, path, authority, scheme })
}

fn spawn_request_task<W>(
    shared: Arc<Shared<W>>,
    stream_id: u32,
    decoded: DecodedHeaders,
    body_rx: Option<mpsc::Receiver<Bytes>>,
    stream_frames: Arc<Mutex<Vec<frame::H2Frame>>>,
    already_closed: bool,
) where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let start = Instant::now();
        let body = collect_body(body_rx).await;

        let connection_frames = shared.connection_frames.lock().expect("lock poisoned").clone();
        let frames_on_stream = stream_frames.lock().expect("lock poisoned").clone();
        let mut h2_frames = connection_frames;
        h2_frames.extend(frames_on_stream);

        let h2_fingerprint = akamai::compute(&h2_frames);
        let (path, query) = split_path_query(&decoded.path);
        let user_agent = decoded
            .lines
            .iter()
            .find_map(|l| l.split_once(": ").filter(|(n, _)| n.eq_ignore_ascii_case("user-agent")))
            .map(|(_, v)| v.to_string())
            .unwrap_or_default();

        let fingerprint = FingerprintBlock::new(
            (*shared.tls).clone(),
            &decoded.method,
            "h2",
            &decoded.lines,
        );

        let headers: Vec<(String, String)> = decoded
            .lines
            .iter()
            .filter_map(|l| l.split_once(": "))
            .filter(|(n, _)| !n.starts_with(':'))
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        let descriptor = RequestDescriptor {
            ip: shared.peer_ip.clone(),
            http_version: "h2".to_string(),
            method: decoded.method.clone(),
            path,
            query,
            user_agent,
            headers,
            body,
            tls: fingerprint,
            h2_frames: Some(h2_frames),
        };

        let is_admin = shared.router.is_admin(&descriptor);
        let directive = shared.router.dispatch(&descriptor).await;

        if let Some(handle) = shared.analytics.clone() {
            let record = AnalyticsRecord {
                user_agent: descriptor.user_agent.clone(),
                ja3: descriptor.tls.tls.ja3.clone(),
                ja4: descriptor.tls.tls.ja4.clone(),
                ja4h: descriptor.tls.ja4h.clone(),
                h2: Some(h2_fingerprint.clone()),
                peetprint: descriptor.tls.tls.peetprint.clone(),
                ip: None,
                time_unix: 0,
            };
            handle.record_async(record, &descriptor.ip);
        }

        if let Err(err) =
            emit_response(&shared, stream_id, directive, is_admin, start.elapsed(), already_closed)
                .await
        {
            tracing::warn!(stream_id, error = %err, "h2 response write failed");
        }
    });
}

fn split_path_query(path: &str) -> (String, String) {
    match path.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (path.to_string(), String::new()),
    }
}

async fn collect_body(rx: Option<mpsc::Receiver<Bytes>>) -> Vec<u8> {
    let Some(mut rx) = rx else { return Vec::new() };
    let mut body = Vec::new();
    let deadline = timeout(BODY_WAIT, async {
        while let Some(chunk) = rx.recv().await {
            body.extend_from_slice(&chunk);
        }
    });
    let _ = deadline.await;
    body
}

async fn emit_response<W>(
    shared: &Arc<Shared<W>>,
    stream_id: u32,
    directive: crate::router::ResponseDirective,
    is_admin: bool,
    elapsed: Duration,
    _already_closed: bool,
) -> Result<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let resolved = directive.resolve();
    let (status, mime, extra_headers, body) =
        (resolved.status, resolved.content_type, resolved.extra_headers, resolved.body);

    let mut header_lines = vec![
        (":status".to_string(), status.to_string()),
        ("server".to_string(), crate::router::SERVER_NAME.to_string()),
        ("content-length".to_string(), body.len().to_string()),
        ("content-type".to_string(), mime),
        ("x-request-id".to_string(), crate::router::request_id()),
        ("x-response-time".to_string(), crate::router::response_time_ms(elapsed)),
        ("alt-svc".to_string(), crate::router::ALT_SVC.to_string()),
    ];
    if is_admin {
        header_lines.extend(
            crate::router::CORS_HEADERS.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        );
    }
    header_lines.extend(extra_headers);

    let mut encoder = Encoder::new();
    let encoded = encoder.encode(
        header_lines
            .iter()
            .map(|(k, v)| (k.as_bytes(), v.as_bytes())),
    );

    let end_stream_on_headers = body.is_empty();
    let headers_flag = FLAG_END_HEADERS | if end_stream_on_headers { FLAG_END_STREAM } else { 0 };

    let mut writer = shared.writer.lock().await;
    write_frame(&mut *writer, FRAME_HEADERS, headers_flag, stream_id, &encoded).await?;

    if !body.is_empty() {
        let mut offset = 0;
        while offset < body.len() {
            let end = (offset + MAX_DATA_CHUNK).min(body.len());
            let is_last = end == body.len();
            let flags = if is_last { FLAG_END_STREAM } else { 0 };
            write_frame(&mut *writer, FRAME_DATA, flags, stream_id, &body[offset..end]).await?;
            offset = end;
        }
    }

    Ok(())
}

async fn write_settings<W>(writer: &SharedWriter<W>, settings: &[(u16, u32)]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = Vec::with_capacity(settings.len() * 6);
    for (id, value) in settings {
        payload.extend_from_slice(&id.to_be_bytes());
        payload.extend_from_slice(&value.to_be_bytes());
    }
    let mut writer = writer.lock().await;
    write_frame(&mut *writer, FRAME_SETTINGS, 0, 0, &payload).await
}

async fn write_rst_stream<W>(writer: &SharedWriter<W>, stream_id: u32, err_code: u32) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut writer = writer.lock().await;
    write_frame(&mut *writer, FRAME_RST_STREAM, 0, stream_id, &err_code.to_be_bytes()).await
}

async fn write_goaway<W>(
    writer: &SharedWriter<W>,
    last_stream_id: u32,
    err_code: u32,
    debug: &str,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = Vec::with_capacity(8 + debug.len());
    payload.extend_from_slice(&last_stream_id.to_be_bytes());
    payload.extend_from_slice(&err_code.to_be_bytes());
    payload.extend_from_slice(debug.as_bytes());
    let mut writer = writer.lock().await;
    write_frame(&mut *writer, FRAME_GOAWAY, 0, 0, &payload).await
}
