//! Component (F): the request router / response builder. Maps
//! `(path, method)` to a handler; exact-path matches win over prefix
//! matches (spec §4.6). Every protocol engine (HTTP/1.1, HTTP/2, HTTP/3)
//! shares this one router.

mod types;
mod wire;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub use types::{RequestDescriptor, ResolvedResponse, ResponseDirective, ResponseTag};
pub use wire::{request_id, response_time_ms, ALT_SVC, CORS_HEADERS, SERVER_NAME};

/// A handler's return value: boxed so `/delay` can `.await` a real sleep
/// without the `Handler` signature carrying an async-fn-in-fn-pointer
/// generic. Most handlers compute their [`ResponseDirective`]
/// synchronously and wrap it with [`immediate`].
pub type HandlerFuture = Pin<Box<dyn Future<Output = ResponseDirective> + Send>>;

/// A route handler: infallible per spec §7 — no error type crosses this
/// boundary, handler failures are caught by the engine and turned into a
/// 500 (see [`crate::http1`]/[`crate::http2`] response-emission code).
/// `Arc<dyn Fn>` rather than a bare fn pointer so the `/api/*` handlers
/// can close over the analytics sink; the stateless HTTPBin handlers
/// still register as plain top-level `fn`s, which coerce into this type
/// without the caller needing to know the difference.
pub type Handler = Arc<dyn Fn(&RequestDescriptor) -> HandlerFuture + Send + Sync>;

/// Wraps an already-computed directive as a handler future. Every
/// handler but `/delay` uses this.
pub fn immediate(directive: ResponseDirective) -> HandlerFuture {
    Box::pin(std::future::ready(directive))
}

pub struct Route {
    pub path: &'static str,
    pub handler: Handler,
}

impl Route {
    pub fn new(path: &'static str, handler: impl Fn(&RequestDescriptor) -> HandlerFuture + Send + Sync + 'static) -> Self {
        Self { path, handler: Arc::new(handler) }
    }
}

/// The shared router: an exact-path table plus a prefix table, exact
/// match always winning (spec §4.6).
pub struct Router {
    exact: Vec<Route>,
    prefix: Vec<Route>,
    /// Header name whose presence flags a request as "admin", triggering
    /// `access-control-allow-*: *` on the response (spec §4.4 step 6,
    /// §6 `cors_key`).
    cors_key: String,
}

impl Router {
    pub fn new(exact: Vec<Route>, prefix: Vec<Route>, cors_key: impl Into<String>) -> Self {
        Self { exact, prefix, cors_key: cors_key.into() }
    }

    pub async fn dispatch(&self, req: &RequestDescriptor) -> ResponseDirective {
        if let Some(route) = self.exact.iter().find(|r| r.path == req.path) {
            return (route.handler)(req).await;
        }
        if let Some(route) = self.prefix.iter().find(|r| req.path.starts_with(r.path)) {
            return (route.handler)(req).await;
        }
        not_found()
    }

    /// Whether this request carries the configured `cors_key` header,
    /// marking it an "admin" request (spec §4.4 step 6, §6).
    pub fn is_admin(&self, req: &RequestDescriptor) -> bool {
        req.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(&self.cors_key))
    }
}

fn not_found() -> ResponseDirective {
    ResponseDirective::with_status(br#"{"error":"not found"}"#.to_vec(), 404, "application/json")
}
