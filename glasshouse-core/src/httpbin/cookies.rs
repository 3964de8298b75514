//! `/cookies` and `/cookies/set` (spec §4.7).

use std::collections::HashMap;

use serde_json::json;

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

/// Parses the `Cookie:` header off the normalised header map into
/// `name -> value` pairs.
fn parse_cookies(req: &RequestDescriptor) -> HashMap<String, String> {
    let Some(raw) = req.header("cookie") else { return HashMap::new() };
    raw.split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect()
}

pub fn cookies(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({ "cookies": parse_cookies(req) });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

/// One `Set-Cookie` header per query pair, all scoped `Path=/` (spec
/// §4.7), via the router's `set-cookies:` in-band tag.
pub fn set(req: &RequestDescriptor) -> HandlerFuture {
    let cookies: Vec<String> =
        req.query_pairs().into_iter().map(|(k, v)| format!("{k}={v}; Path=/")).collect();
    let body = json!({ "cookies": req.query_pairs().into_iter().collect::<HashMap<_, _>>() });
    let body = serde_json::to_vec(&body).unwrap_or_default();
    immediate(ResponseDirective::with_cookies(body, &cookies, "application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multiple_semicolon_separated_cookies() {
        let req = crate::httpbin::tests_support::descriptor_with_header(
            "GET",
            "/cookies",
            ("Cookie", "a=1; b=2"),
        );
        let parsed = parse_cookies(&req);
        assert_eq!(parsed.get("a").map(String::as_str), Some("1"));
        assert_eq!(parsed.get("b").map(String::as_str), Some("2"));
    }
}
