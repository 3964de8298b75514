//! `/status/{c}` (spec §4.7).

use serde_json::json;

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

const PREFIX: &str = "/status/";

pub fn status(req: &RequestDescriptor) -> HandlerFuture {
    let code: u16 = req.path.strip_prefix(PREFIX).and_then(|s| s.parse().ok()).unwrap_or(200);
    let code = code.clamp(100, 599);
    let body = json!({ "status": code });
    immediate(ResponseDirective::with_status(
        serde_json::to_vec(&body).unwrap_or_default(),
        code,
        "application/json",
    ))
}
