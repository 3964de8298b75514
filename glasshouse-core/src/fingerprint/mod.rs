//! Component (B): the fingerprint kernel. Computes JA3, JA4/JA4_r,
//! PeetPrint and JA4H/JA4H_r per spec §4.2. Every function here is pure
//! and deterministic — same bytes in, same string out, across runs and
//! processes (spec §8 invariant 2).

pub mod ja3;
pub mod ja4;
pub mod ja4h;
pub mod peetprint;

use crate::dissector::ClientHello;

/// The TLS-derived half of a [`FingerprintBlock`]: everything computable
/// from the ClientHello alone, at handshake time, and stable for the
/// lifetime of the TLS session. JA4H/JA4H_r are deliberately not part of
/// this struct — they depend on the decoded HTTP request and are
/// recomputed per request by [`FingerprintBlock::new`].
#[derive(Debug, Clone)]
pub struct TlsFingerprint {
    pub ja3: String,
    pub ja3_hash: String,
    pub ja4: String,
    pub ja4_r: String,
    pub peetprint: String,
    pub peetprint_hash: String,
    pub raw_hex: String,
    pub raw_b64: String,
    pub record_version: u16,
    pub negotiated_version: u16,
    pub session_id: String,
    pub client_random: String,
    pub sni: Option<String>,
}

impl TlsFingerprint {
    pub fn from_client_hello(hello: &ClientHello) -> Self {
        let (ja3, ja3_hash) = ja3::compute(hello);
        let (ja4, ja4_r) = ja4::compute(hello);
        let (peetprint, peetprint_hash) = peetprint::compute(hello);

        Self {
            ja3,
            ja3_hash,
            ja4,
            ja4_r,
            peetprint,
            peetprint_hash,
            raw_hex: hello.raw_hex(),
            raw_b64: hello.raw_b64(),
            record_version: hello.record_version,
            negotiated_version: hello.negotiated_version(),
            session_id: hex::encode(&hello.session_id),
            client_random: hex::encode(hello.client_random),
            sni: hello.sni.clone(),
        }
    }
}

/// The full per-request fingerprint block threaded into every
/// `RequestDescriptor` (spec §3). The TLS half is computed once per
/// session and cloned in; the HTTP half (JA4H/JA4H_r) is computed fresh
/// for each request from that request's method/version/headers.
#[derive(Debug, Clone)]
pub struct FingerprintBlock {
    pub tls: TlsFingerprint,
    pub ja4h: String,
    pub ja4h_r: String,
}

impl FingerprintBlock {
    pub fn new(tls: TlsFingerprint, method: &str, http_version: &str, headers: &[String]) -> Self {
        let (ja4h, ja4h_r) = ja4h::compute(method, http_version, headers);
        Self { tls, ja4h, ja4h_r }
    }
}
