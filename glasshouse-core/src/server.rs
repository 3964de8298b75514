//! Component (E) wiring: the TCP accept loop. Captures the raw
//! ClientHello off the wire before the TLS handshake consumes it, drives
//! the handshake through the hot-reloadable acceptor (`tls::setup`),
//! detects HTTP/2 vs HTTP/1.1 (spec §4.4 "Detection"), and hands the
//! decrypted stream to the matching protocol engine. Also runs the
//! plain-HTTP listener that unconditionally redirects to `http_redirect`
//! (spec §6).

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;
use tokio::sync::RwLock;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use crate::analytics::{AnalyticsHandle, MongoSink};
use crate::config::Config;
use crate::dissector::parse_client_hello;
use crate::error::{GlassError, Result};
use crate::fingerprint::TlsFingerprint;
use crate::router::Router;
use crate::telemetry::{init_metrics, Metrics};
use crate::tls::{record_tls_handshake_metrics, setup_tls_with_hot_reload};

/// Bytes needed to recognize the HTTP/2 connection preamble
/// (`b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n"`, 24 bytes) when ALPN didn't
/// already settle the question.
const DETECT_CAP: usize = 24;
/// Upper bound on a peeked ClientHello record. A genuine ClientHello
/// this large would already be unusual; anything past it is treated as
/// malformed input rather than peeked indefinitely.
const CLIENT_HELLO_PEEK_CAP: usize = 16 * 1024;
/// How long to wait for the peer to finish sending a ClientHello record
/// before giving up on the connection.
const CLIENT_HELLO_PEEK_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the service to completion: binds the TLS listener and the
/// plain-HTTP redirect listener, starts the optional metrics/health
/// server, and serves until SIGTERM/SIGINT.
pub async fn run(config: Arc<Config>) -> Result<()> {
    let analytics = build_analytics_handle(&config).await?;
    let router = Arc::new(crate::httpbin::build_router(
        config.cors_key.clone(),
        analytics.clone(),
    ));

    let metrics = init_metrics_and_observability(&config).await;

    let tls_setup = setup_tls_with_hot_reload(&config.tls_config()).await?;

    let tls_addr = parse_addr(&config.host, &config.tls_port)?;
    let tls_listener = TcpListener::bind(tls_addr).await.map_err(GlassError::Io)?;
    info!(%tls_addr, "TLS listener bound");

    if !config.http_port.is_empty() {
        let http_addr = parse_addr(&config.host, &config.http_port)?;
        match TcpListener::bind(http_addr).await {
            Ok(listener) => {
                info!(%http_addr, "plain-HTTP redirect listener bound");
                let redirect_to = config.http_redirect.clone();
                tokio::spawn(async move { run_redirect_listener(listener, redirect_to).await });
            }
            Err(err) => {
                warn!(%http_addr, error = %err, "failed to bind plain-HTTP redirect listener, continuing without it");
            }
        }
    }

    let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate()).map_err(GlassError::Io)?;
    let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt()).map_err(GlassError::Io)?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
            accepted = tls_listener.accept() => {
                let (stream, peer) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "accept error");
                        continue;
                    }
                };
                let router = router.clone();
                let analytics = analytics.clone();
                let acceptor = tls_setup.acceptor.clone();
                let metrics = metrics.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle_connection(stream, peer, acceptor, router, analytics, metrics).await {
                        warn!(%peer, error = %err, "connection closed with error");
                    }
                });
            }
        }
    }

    Ok(())
}

fn parse_addr(host: &str, port: &str) -> Result<SocketAddr> {
    format!("{host}:{port}")
        .parse()
        .map_err(|e| GlassError::Config(format!("invalid listen address {host}:{port}: {e}")))
}

async fn init_metrics_and_observability(config: &Config) -> Option<Arc<Metrics>> {
    match init_metrics() {
        Ok((metrics, registry)) => {
            if let Some(port) = config.telemetry.metrics_port {
                let ready = Arc::new(AtomicBool::new(true));
                tokio::spawn(async move {
                    if let Err(err) =
                        crate::telemetry::start_observability_server(port, registry, ready).await
                    {
                        error!(%err, "observability server exited");
                    }
                });
            }
            Some(metrics)
        }
        Err(err) => {
            warn!(%err, "failed to initialize metrics, continuing without them");
            None
        }
    }
}

async fn build_analytics_handle(config: &Config) -> Result<Option<Arc<AnalyticsHandle>>> {
    if !config.log_to_db {
        return Ok(None);
    }
    let url = config
        .analytics
        .mongo_url
        .as_deref()
        .ok_or_else(|| GlassError::Config("log_to_db is set but mongo_url is missing".to_string()))?;
    let database = config.analytics.mongo_database.as_deref().ok_or_else(|| {
        GlassError::Config("log_to_db is set but mongo_database is missing".to_string())
    })?;
    let collection = config.analytics.mongo_collection.as_deref().ok_or_else(|| {
        GlassError::Config("log_to_db is set but mongo_collection is missing".to_string())
    })?;

    let sink = MongoSink::connect(url, database, collection).await?;
    Ok(Some(Arc::new(AnalyticsHandle::new(
        Arc::new(sink),
        config.analytics.mongo_log_ips,
    ))))
}

/// Handles one accepted connection end to end: ClientHello capture, TLS
/// handshake, protocol detection, and handoff to the matching engine.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    acceptor: Arc<RwLock<Option<TlsAcceptor>>>,
    router: Arc<Router>,
    analytics: Option<Arc<AnalyticsHandle>>,
    metrics: Option<Arc<Metrics>>,
) -> Result<()> {
    let _ = stream.set_nodelay(true);
    let handshake_start = Instant::now();

    let raw_hello = peek_client_hello(&stream).await?;
    let hello = parse_client_hello(&raw_hello)?;
    let tls_fingerprint = Arc::new(TlsFingerprint::from_client_hello(&hello));

    if let Some(m) = &metrics {
        m.tls_fingerprints_extracted_total.add(1, &[]);
        m.tls_fingerprint_extraction_duration_seconds
            .record(handshake_start.elapsed().as_secs_f64(), &[]);
    }

    let acceptor = acceptor
        .read()
        .await
        .clone()
        .ok_or_else(|| GlassError::Tls("TLS acceptor not ready".to_string()))?;

    let tls_stream = acceptor
        .accept(stream)
        .await
        .map_err(|e| GlassError::Tls(format!("handshake failed: {e}")))?;

    record_tls_handshake_metrics(&tls_stream, handshake_start.elapsed().as_secs_f64(), metrics);

    let alpn = tls_stream.get_ref().1.alpn_protocol().map(|p| p.to_vec());
    let peer_ip = peer.to_string();

    match alpn.as_deref() {
        Some(b"h2") => crate::http2::run(tls_stream, peer_ip, tls_fingerprint, router, analytics).await,
        Some(_) => crate::http1::run(tls_stream, peer_ip, tls_fingerprint, router, analytics).await,
        None => {
            let (is_h2, rewound) = read_and_rewind(tls_stream).await?;
            if is_h2 {
                crate::http2::run(rewound, peer_ip, tls_fingerprint, router, analytics).await
            } else {
                crate::http1::run(rewound, peer_ip, tls_fingerprint, router, analytics).await
            }
        }
    }
}

/// Peeks the TLS record header to learn its declared length, then peeks
/// again for the full record. `TcpStream::peek` never consumes bytes, so
/// the stream is handed to the TLS acceptor afterwards exactly as the
/// peer sent it.
async fn peek_client_hello(stream: &TcpStream) -> Result<Vec<u8>> {
    let mut header = [0u8; 5];
    peek_until_filled(stream, &mut header).await?;

    if header[0] != 0x16 {
        return Err(GlassError::Dissect(format!(
            "expected TLS handshake record (0x16), got {:#04x}",
            header[0]
        )));
    }
    let record_len = u16::from_be_bytes([header[3], header[4]]) as usize;
    let total = 5 + record_len;
    if total > CLIENT_HELLO_PEEK_CAP {
        return Err(GlassError::Dissect("ClientHello record exceeds peek cap".to_string()));
    }

    let mut buf = vec![0u8; total];
    peek_until_filled(stream, &mut buf).await?;
    Ok(buf)
}

async fn peek_until_filled(stream: &TcpStream, buf: &mut [u8]) -> Result<()> {
    let deadline = tokio::time::Instant::now() + CLIENT_HELLO_PEEK_TIMEOUT;
    loop {
        let n = stream.peek(buf).await.map_err(GlassError::Io)?;
        if n >= buf.len() {
            return Ok(());
        }
        if tokio::time::Instant::now() >= deadline {
            return Err(GlassError::Dissect("timed out waiting for ClientHello bytes".to_string()));
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Wraps an `AsyncRead + AsyncWrite` stream, replaying a prefix of
/// already-consumed bytes before delegating further reads to the inner
/// stream. Used to sniff the HTTP/2 preamble without losing the bytes
/// that made up the sniff.
pub(crate) struct Rewind<S> {
    prefix: Option<Vec<u8>>,
    inner: S,
}

impl<S> Rewind<S> {
    fn new(prefix: Vec<u8>, inner: S) -> Self {
        Self { prefix: Some(prefix), inner }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for Rewind<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        if let Some(prefix) = self.prefix.take() {
            if !prefix.is_empty() {
                let take = prefix.len().min(buf.remaining());
                buf.put_slice(&prefix[..take]);
                if take < prefix.len() {
                    self.prefix = Some(prefix[take..].to_vec());
                }
                return Poll::Ready(Ok(()));
            }
        }
        Pin::new(&mut self.inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Rewind<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}

/// Reads up to [`DETECT_CAP`] bytes off `stream` and reports whether they
/// match the HTTP/2 connection preamble, returning a [`Rewind`] that
/// replays those bytes to whichever engine runs next.
async fn read_and_rewind<S>(mut stream: S) -> Result<(bool, Rewind<S>)>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    // A genuine H2-by-prior-knowledge client sends the full 24-byte
    // preamble before anything else; a plain HTTP/1.1 client often sends
    // a short request line and then waits for a response. Bound each
    // read so the latter case doesn't stall the connection waiting for
    // bytes that will never come.
    let mut buf = vec![0u8; DETECT_CAP];
    let mut filled = 0;
    while filled < buf.len() {
        match tokio::time::timeout(Duration::from_millis(200), stream.read(&mut buf[filled..])).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => filled += n,
            Ok(Err(e)) => return Err(GlassError::Io(e)),
            Err(_) => break,
        }
    }
    buf.truncate(filled);
    let is_h2 = filled >= crate::http2::H2_PREAMBLE.len()
        && &buf[..crate::http2::H2_PREAMBLE.len()] == crate::http2::H2_PREAMBLE;
    Ok((is_h2, Rewind::new(buf, stream)))
}

/// Runs the plain-HTTP listener: every connection gets a single
/// unconditional `301` to `redirect_to` and the connection is closed
/// (spec §6 "Plain HTTP... emits an unconditional redirect").
async fn run_redirect_listener(listener: TcpListener, redirect_to: String) {
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(pair) => pair,
            Err(err) => {
                warn!(error = %err, "plain-HTTP accept error");
                continue;
            }
        };
        let redirect_to = redirect_to.clone();
        tokio::spawn(async move {
            if let Err(err) = serve_redirect(stream, &redirect_to).await {
                warn!(%peer, error = %err, "plain-HTTP redirect connection failed");
            }
        });
    }
}

async fn serve_redirect(mut stream: TcpStream, redirect_to: &str) -> Result<()> {
    let mut buf = [0u8; 1024];
    // Drain whatever the client sent (best effort); the redirect does not
    // depend on the request line or headers.
    let _ = stream.read(&mut buf).await;

    let body = format!("Redirecting to {redirect_to}");
    let response = format!(
        "HTTP/1.1 301 Moved Permanently\r\nLocation: {redirect_to}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    stream.write_all(response.as_bytes()).await.map_err(GlassError::Io)?;
    stream.flush().await.map_err(GlassError::Io)?;
    Ok(())
}
