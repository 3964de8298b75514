//! `/redirect/{n}` and `/redirect-to` (spec §4.7).

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

const REDIRECT_PREFIX: &str = "/redirect/";

/// `/redirect/{n}` chains down to `/redirect/{n-1}`, bottoming out at
/// `/get` (spec §4.7), `1 <= n <= 10`.
pub fn chain(req: &RequestDescriptor) -> HandlerFuture {
    let n: u32 = req
        .path
        .strip_prefix(REDIRECT_PREFIX)
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let n = n.clamp(1, 10);
    let next = if n > 1 { format!("/redirect/{}", n - 1) } else { "/get".to_string() };
    immediate(ResponseDirective::redirect(302, &next))
}

/// `/redirect-to?url=U[&status_code=C]`, `C` clamped to 300-399,
/// default 302.
pub fn to(req: &RequestDescriptor) -> HandlerFuture {
    let pairs = req.query_pairs();
    let url = pairs
        .iter()
        .find(|(k, _)| k == "url")
        .map(|(_, v)| v.clone())
        .unwrap_or_else(|| "/get".to_string());
    let status = pairs
        .iter()
        .find(|(k, _)| k == "status_code")
        .and_then(|(_, v)| v.parse::<u16>().ok())
        .unwrap_or(302)
        .clamp(300, 399);
    immediate(ResponseDirective::redirect(status, &url))
}
