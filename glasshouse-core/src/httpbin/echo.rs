//! The method-shaped echo routes (spec §4.7): `/get`, `/post`, `/put`,
//! `/patch`, `/delete`, `/anything`, plus the minimal-echo trio
//! `/headers`, `/ip`, `/user-agent`.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::analytics::ip_without_port;
use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

fn url_for(req: &RequestDescriptor) -> String {
    let host = req.header("host").unwrap_or("glasshouse");
    if req.query.is_empty() {
        format!("https://{host}{}", req.path)
    } else {
        format!("https://{host}{}?{}", req.path, req.query)
    }
}

/// `origin, method, url, args, headers` — present on every method-shaped
/// route regardless of whether the body fields below also apply.
pub(super) fn base_fields(req: &RequestDescriptor) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("origin".into(), json!(ip_without_port(&req.ip)));
    map.insert("method".into(), json!(req.method));
    map.insert("url".into(), json!(url_for(req)));
    map.insert("args".into(), json!(req.query_pairs().into_iter().collect::<HashMap<_, _>>()));
    map.insert(
        "headers".into(),
        json!(req.normalized_headers().into_iter().collect::<HashMap<_, _>>()),
    );
    map
}

/// `data, json, files={}, form={}` — POST-shaped methods and `/anything`
/// additionally echo these (spec §4.7).
fn with_body_fields(req: &RequestDescriptor, mut map: Map<String, Value>) -> Map<String, Value> {
    let data = String::from_utf8_lossy(&req.body).into_owned();
    let parsed_json = serde_json::from_slice::<Value>(&req.body).ok();
    map.insert("data".into(), json!(data));
    map.insert("json".into(), json!(parsed_json));
    map.insert("files".into(), json!({}));
    map.insert("form".into(), json!({}));
    map
}

fn echo_response(map: Map<String, Value>) -> ResponseDirective {
    ResponseDirective::json(serde_json::to_vec(&Value::Object(map)).unwrap_or_default())
}

/// The `/get` response body, exposed as a plain function so `/delay`
/// (spec §4.7: "returns the `/get` body" after sleeping) can reuse it
/// without going through another handler indirection.
pub(super) fn get_directive(req: &RequestDescriptor) -> ResponseDirective {
    echo_response(base_fields(req))
}

pub fn get(req: &RequestDescriptor) -> HandlerFuture {
    immediate(get_directive(req))
}

pub fn with_body(req: &RequestDescriptor) -> HandlerFuture {
    immediate(echo_response(with_body_fields(req, base_fields(req))))
}

/// `/headers`, `/ip`, `/user-agent` are "Minimal echo + FingerprintBlock"
/// per spec §4.7 — each body carries the same `tls` block `/api/*` uses.
pub fn headers(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "headers": req.normalized_headers().into_iter().collect::<HashMap<_, _>>(),
        "tls": super::api::tls_json(req),
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn ip(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "origin": ip_without_port(&req.ip),
        "tls": super::api::tls_json(req),
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn user_agent(req: &RequestDescriptor) -> HandlerFuture {
    let body = json!({
        "user-agent": req.user_agent,
        "tls": super::api::tls_json(req),
    });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}
