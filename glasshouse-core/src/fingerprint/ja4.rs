use sha2::{Digest, Sha256};

use crate::dissector::types::{EXT_ALPN, EXT_PADDING, EXT_SERVER_NAME};
use crate::dissector::{is_grease, ClientHello};

const EMPTY_HASH: &str = "000000000000";

/// Computes `(ja4, ja4_r)` per spec §4.2.2.
pub fn compute(hello: &ClientHello) -> (String, String) {
    let a = part_a(hello);

    let non_grease_ciphers: Vec<u16> = hello
        .cipher_suites
        .iter()
        .copied()
        .filter(|v| !is_grease(*v))
        .collect();
    let mut sorted_ciphers = non_grease_ciphers.clone();
    sorted_ciphers.sort_unstable();
    let b_raw = sorted_ciphers
        .iter()
        .map(|v| format!("{v:04x}"))
        .collect::<Vec<_>>()
        .join(",");
    let b_hash = truncated_sha256(&b_raw);

    let mut sorted_exts: Vec<u16> = hello
        .extensions
        .iter()
        .map(|e| e.ext_type)
        .filter(|v| !is_grease(*v) && *v != EXT_SERVER_NAME && *v != EXT_ALPN && *v != EXT_PADDING)
        .collect();
    sorted_exts.sort_unstable();
    let exts_joined = sorted_exts
        .iter()
        .map(|v| format!("{v:04x}"))
        .collect::<Vec<_>>()
        .join(",");

    let sigalgs_joined = hello
        .signature_algorithms
        .iter()
        .map(|v| format!("{v:04x}"))
        .collect::<Vec<_>>()
        .join(",");

    let c_raw = if sigalgs_joined.is_empty() {
        exts_joined.clone()
    } else {
        format!("{exts_joined}_{sigalgs_joined}")
    };
    let c_hash = truncated_sha256(&c_raw);

    let ja4 = format!("{a}_{b_hash}_{c_hash}");
    let ja4_r = format!("{a}_{b_raw}_{c_raw}");
    (ja4, ja4_r)
}

fn part_a(hello: &ClientHello) -> String {
    let tls_ver = version_code(hello.negotiated_version());
    let sni_mode = if hello.sni_is_ip() { "i" } else { "d" };
    let ncipher = hello
        .cipher_suites
        .iter()
        .filter(|v| !is_grease(**v))
        .count()
        .min(99);
    let next = hello
        .extensions
        .iter()
        .filter(|e| {
            !is_grease(e.ext_type) && e.ext_type != EXT_SERVER_NAME && e.ext_type != EXT_ALPN
        })
        .count()
        .min(99);
    let alpn2 = alpn_two_char(hello.alpn.first().map(String::as_str));

    format!("t{tls_ver}{sni_mode}{ncipher:02}{next:02}{alpn2}")
}

fn version_code(version: u16) -> &'static str {
    match version {
        0x0301 => "10",
        0x0302 => "11",
        0x0303 => "12",
        0x0304 => "13",
        _ => "00",
    }
}

fn alpn_two_char(first: Option<&str>) -> String {
    match first {
        None => "00".to_string(),
        Some("h2") => "h2".to_string(),
        Some("h3") => "h3".to_string(),
        Some(v) if v == "0.9" || v.starts_with("1.") || v == "http/1.0" || v == "http/1.1" => {
            "h1".to_string()
        }
        Some(v) => {
            let mut chars = v.chars();
            let first_char = chars.next().unwrap_or('0');
            let last_char = v.chars().last().unwrap_or('0');
            format!("{first_char}{last_char}")
        }
    }
}

fn truncated_sha256(input: &str) -> String {
    if input.is_empty() {
        return EMPTY_HASH.to_string();
    }
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..12].to_string()
}
