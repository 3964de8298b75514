//! Response headers emitted identically by every protocol engine (spec
//! §6 "Response headers emitted on every path"). Kept free of any single
//! engine's framing so HTTP/1.1, HTTP/2 and HTTP/3 stay byte-for-byte
//! consistent on this part of the response.

use rand::Rng;
use std::time::Duration;

pub const SERVER_NAME: &str = "TrackMe.peet.ws";
pub const ALT_SVC: &str = "h3=\":443\"; ma=86400";

/// Headers added when a request is flagged "admin" via `cors_key`
/// (spec §4.4 step 6).
pub const CORS_HEADERS: &[(&str, &str)] = &[
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "*"),
    ("access-control-allow-headers", "*"),
];

const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// A 16-char alphanumeric `X-Request-Id` (spec §6).
pub fn request_id() -> String {
    let mut rng = rand::thread_rng();
    (0..16).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect()
}

/// Formats an elapsed duration as the integer-millisecond
/// `X-Response-Time` value spec §6 requires.
pub fn response_time_ms(elapsed: Duration) -> String {
    elapsed.as_millis().to_string()
}
