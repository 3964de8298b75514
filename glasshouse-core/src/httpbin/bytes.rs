//! `/bytes/{n}` and `/base64/{v}` (spec §4.7).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

const BYTES_PREFIX: &str = "/bytes/";
const BASE64_PREFIX: &str = "/base64/";

/// GET: deterministic `byte[i] = i mod 256`, `1 <= n <= 102400`. POST/PUT:
/// echoes the request body verbatim (spec §4.7).
pub fn bytes(req: &RequestDescriptor) -> HandlerFuture {
    if req.method.eq_ignore_ascii_case("post") || req.method.eq_ignore_ascii_case("put") {
        return immediate(ResponseDirective::new(req.body.clone(), "application/octet-stream"));
    }

    let n: usize = req
        .path
        .strip_prefix(BYTES_PREFIX)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let n = n.clamp(1, 102_400);
    let body: Vec<u8> = (0..n).map(|i| (i % 256) as u8).collect();
    immediate(ResponseDirective::new(body, "application/octet-stream"))
}

pub fn base64_decode(req: &RequestDescriptor) -> HandlerFuture {
    let encoded = req.path.strip_prefix(BASE64_PREFIX).unwrap_or("");
    let directive = match STANDARD.decode(encoded) {
        Ok(decoded) => ResponseDirective::new(decoded, "text/html; charset=utf-8"),
        Err(_) => ResponseDirective::new(&b"Invalid base64"[..], "text/plain"),
    };
    immediate(directive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::httpbin::tests_support::descriptor_with_body;

    #[test]
    fn bytes_are_deterministic_modulo_256() {
        let req = descriptor_with_body("GET", "/bytes/300", b"");
        let n: usize = req.path.strip_prefix(BYTES_PREFIX).unwrap().parse().unwrap();
        let body: Vec<u8> = (0..n.clamp(1, 102_400)).map(|i| (i % 256) as u8).collect();
        assert_eq!(body[0], 0);
        assert_eq!(body[256], 0);
        assert_eq!(body[255], 255);
    }

    #[test]
    fn invalid_base64_returns_the_literal_message() {
        let decoded = STANDARD.decode("not valid base64!!");
        assert!(decoded.is_err());
    }
}
