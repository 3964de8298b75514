//! Drives a real TLS + HTTP/2 connection against `http2::run`, the way
//! `server::handle_connection` wires it in production, minus the
//! ClientHello peek (the fingerprint block here is synthetic — these
//! tests exercise the multiplexing engine, not the dissector).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::{CertificateDer, ServerName, UnixTime};

use glasshouse_core::config::{ClientAuth, TlsConfig};
use glasshouse_core::dissector::ClientHello;
use glasshouse_core::fingerprint::TlsFingerprint;
use glasshouse_core::http2::H2_PREAMBLE;
use glasshouse_core::tls::build_rustls;

use crate::helpers::create_valid_test_cert;

fn synthetic_client_hello() -> ClientHello {
    ClientHello {
        record_version: 0x0303,
        handshake_version: 0x0303,
        client_random: [0u8; 32],
        session_id: Vec::new(),
        cipher_suites: vec![0x1301, 0x1302],
        compression_methods: vec![0],
        extensions: Vec::new(),
        sni: Some("localhost".to_string()),
        supported_versions: vec![0x0304],
        supported_groups: vec![0x001d],
        ec_point_formats: vec![0],
        signature_algorithms: vec![0x0403],
        alpn: vec!["h2".to_string()],
        key_shares: Vec::new(),
        psk_modes: Vec::new(),
        application_settings: Vec::new(),
        raw: Vec::new(),
    }
}

/// Binds an ephemeral TLS listener and runs `http2::run` on every
/// accepted connection, exactly as `server::handle_connection` does
/// once ALPN has already settled on `h2`.
async fn spawn_server() -> SocketAddr {
    let (cert_path, key_path) = create_valid_test_cert().expect("generate test cert");
    let tls_config = TlsConfig {
        watch_delay_secs: 60,
        cert_path: cert_path.display().to_string(),
        key_path: key_path.display().to_string(),
        alpn: vec!["h2".to_string()],
        options: Default::default(),
        client_auth: ClientAuth::Disabled,
        session_resumption: Default::default(),
    };
    let acceptor = build_rustls(&tls_config).expect("build_rustls");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");

    let router = Arc::new(glasshouse_core::httpbin::build_router("x-api-key", None));
    let tls_fingerprint = Arc::new(TlsFingerprint::from_client_hello(&synthetic_client_hello()));

    tokio::spawn(async move {
        loop {
            let (stream, peer) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => break,
            };
            let acceptor = acceptor.clone();
            let router = router.clone();
            let tls_fingerprint = tls_fingerprint.clone();
            tokio::spawn(async move {
                let tls_stream = match acceptor.accept(stream).await {
                    Ok(s) => s,
                    Err(_) => return,
                };
                let _ = glasshouse_core::http2::run(
                    tls_stream,
                    peer.to_string(),
                    tls_fingerprint,
                    router,
                    None,
                )
                .await;
            });
        }
    });

    addr
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .danger_accept_invalid_certs(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("build reqwest client")
}

/// `/redirect/2` chains to `/redirect/1` then `/get`: three HEADERS
/// responses, one connection, no GOAWAY in between.
#[tokio::test]
async fn redirect_chain_stays_on_one_connection() {
    let addr = spawn_server().await;
    let client = http_client();
    let base = format!("https://127.0.0.1:{}", addr.port());

    let mut statuses = Vec::new();
    let mut path = "/redirect/2".to_string();
    for _ in 0..3 {
        let resp = client
            .get(format!("{base}{path}"))
            .send()
            .await
            .expect("request");
        assert_eq!(resp.version(), reqwest::Version::HTTP_2, "expected h2 on every hop");
        let status = resp.status();
        statuses.push(status.as_u16());
        if status.is_redirection() {
            path = resp
                .headers()
                .get("location")
                .expect("location header on redirect")
                .to_str()
                .expect("location header is ascii")
                .to_string();
        } else {
            break;
        }
    }

    assert_eq!(statuses, vec![302, 302, 200]);
}

/// Two concurrent requests over the same pooled h2 connection each get
/// back their own uncorrupted body — the single write mutex in
/// `http2::connection` must not interleave frame bytes across streams.
#[tokio::test]
async fn concurrent_streams_do_not_corrupt_each_others_bodies() {
    let addr = spawn_server().await;
    let client = http_client();
    let base = format!("https://127.0.0.1:{}", addr.port());

    let get_fut = client.get(format!("{base}/get")).send();
    let ua_fut = client
        .get(format!("{base}/user-agent"))
        .header("user-agent", "glasshouse-h2-test/1.0")
        .send();

    let (get_resp, ua_resp) = tokio::join!(get_fut, ua_fut);
    let get_resp = get_resp.expect("/get request");
    let ua_resp = ua_resp.expect("/user-agent request");

    assert_eq!(get_resp.status(), reqwest::StatusCode::OK);
    assert_eq!(ua_resp.status(), reqwest::StatusCode::OK);

    let get_body: serde_json::Value = get_resp.json().await.expect("/get body is json");
    assert_eq!(get_body["method"], "GET");

    let ua_body: serde_json::Value = ua_resp.json().await.expect("/user-agent body is json");
    assert!(ua_body.get("tls").is_some(), "expected fingerprint block on /user-agent");
}

#[derive(Debug)]
struct NoServerCertVerification;

impl rustls::client::danger::ServerCertVerifier for NoServerCertVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        rustls::crypto::ring::default_provider()
            .signature_verification_algorithms
            .supported_schemes()
    }
}

async fn raw_h2_client(addr: SocketAddr) -> tokio_rustls::client::TlsStream<TcpStream> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let mut config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(NoServerCertVerification))
        .with_no_client_auth();
    config.alpn_protocols = vec![b"h2".to_vec()];

    let connector = tokio_rustls::TlsConnector::from(Arc::new(config));
    let tcp = TcpStream::connect(addr).await.expect("connect");
    let domain = ServerName::try_from("localhost").expect("server name");
    connector.connect(domain, tcp).await.expect("tls handshake")
}

async fn read_raw_frame(
    stream: &mut tokio_rustls::client::TlsStream<TcpStream>,
) -> std::io::Result<(u8, u32)> {
    let mut header = [0u8; 9];
    stream.read_exact(&mut header).await?;
    let length = u32::from_be_bytes([0, header[0], header[1], header[2]]) as usize;
    let frame_type = header[3];
    let stream_id = u32::from_be_bytes([header[5] & 0x7f, header[6], header[7], header[8]]);
    let mut payload = vec![0u8; length];
    stream.read_exact(&mut payload).await?;
    Ok((frame_type, stream_id))
}

const FRAME_TYPE_GOAWAY: u8 = 0x7;

/// A connection that never sends a HEADERS frame is closed with a
/// `GOAWAY` once it has been idle past the engine's idle-timeout window,
/// well within the 36s budget the ticker plus timeout allow for.
#[tokio::test]
async fn idle_connection_receives_goaway() {
    let addr = spawn_server().await;
    let mut stream = raw_h2_client(addr).await;

    stream.write_all(H2_PREAMBLE).await.expect("write preamble");
    // An empty SETTINGS frame (type 0x4, no ACK flag, stream 0): enough
    // for the server to register activity and ACK back, then go quiet.
    stream
        .write_all(&[0, 0, 0, 0x4, 0x0, 0, 0, 0, 0])
        .await
        .expect("write settings");
    stream.flush().await.expect("flush");

    let saw_goaway = tokio::time::timeout(Duration::from_secs(36), async {
        loop {
            let (frame_type, _stream_id) = read_raw_frame(&mut stream).await.expect("read frame");
            if frame_type == FRAME_TYPE_GOAWAY {
                return;
            }
        }
    })
    .await;

    assert!(saw_goaway.is_ok(), "expected GOAWAY within the idle-timeout deadline");
}
