//! Component (G): the HTTPBin-style echo surface (spec §4.7). Every
//! handler here is infallible and stateless except the `/api/search-*`
//! and `/api/request-count` pair, which close over the analytics sink.

mod api;
mod bytes;
mod compression;
mod cookies;
mod delay;
mod echo;
mod redirect;
mod static_bodies;
mod status;
mod stream;

use std::sync::Arc;

use crate::analytics::{AnalyticsHandle, FingerprintKind};
use crate::router::{Route, Router};

/// Builds the full HTTPBin + `/api/*` route table. `analytics` is `None`
/// when the service was started without a configured sink (spec §6
/// `log_to_db`); the search/request-count endpoints then answer 503
/// rather than panicking or silently fabricating data.
pub fn build_router(cors_key: impl Into<String>, analytics: Option<Arc<AnalyticsHandle>>) -> Router {
    let mut exact = vec![
        Route::new("/get", echo::get),
        Route::new("/post", echo::with_body),
        Route::new("/put", echo::with_body),
        Route::new("/patch", echo::with_body),
        Route::new("/delete", echo::with_body),
        Route::new("/anything", echo::with_body),
        Route::new("/headers", echo::headers),
        Route::new("/ip", echo::ip),
        Route::new("/user-agent", echo::user_agent),
        Route::new("/gzip", compression::gzip),
        Route::new("/deflate", compression::deflate),
        Route::new("/brotli", compression::brotli),
        Route::new("/cookies", cookies::cookies),
        Route::new("/image/jpeg", static_bodies::image_jpeg),
        Route::new("/image/png", static_bodies::image_png),
        Route::new("/image/gif", static_bodies::image_gif),
        Route::new("/image/webp", static_bodies::image_webp),
        Route::new("/image/svg", static_bodies::image_svg),
        Route::new("/html", static_bodies::html),
        Route::new("/xml", static_bodies::xml),
        Route::new("/json", static_bodies::json),
        Route::new("/robots.txt", static_bodies::robots),
        Route::new("/deny", static_bodies::deny),
        Route::new("/redirect-to", redirect::to),
        Route::new("/sse", stream::sse),
        Route::new("/api/all", api::all),
        Route::new("/api/tls", api::tls),
        Route::new("/api/clean", api::clean),
        Route::new("/api/raw", api::raw),
        Route::new("/api/sni", api::sni),
    ];

    let mut prefix = vec![
        Route::new("/anything", echo::with_body),
        Route::new("/cookies/set", cookies::set),
        Route::new("/bytes/", bytes::bytes),
        Route::new("/base64/", bytes::base64_decode),
        Route::new("/redirect/", redirect::chain),
        Route::new("/status/", status::status),
        Route::new("/delay/", delay::delay),
        Route::new("/stream/", stream::stream),
        Route::new("/sse/", stream::sse),
    ];

    if let Some(analytics) = analytics {
        for kind in [
            FingerprintKind::Ja3,
            FingerprintKind::Ja4,
            FingerprintKind::Ja4h,
            FingerprintKind::H2,
            FingerprintKind::PeetPrint,
            FingerprintKind::UserAgent,
        ] {
            let path: &'static str = match kind {
                FingerprintKind::Ja3 => "/api/search-ja3",
                FingerprintKind::Ja4 => "/api/search-ja4",
                FingerprintKind::Ja4h => "/api/search-ja4h",
                FingerprintKind::H2 => "/api/search-h2",
                FingerprintKind::PeetPrint => "/api/search-peetprint",
                FingerprintKind::UserAgent => "/api/search-useragent",
            };
            exact.push(Route::new(path, api::search(kind, analytics.clone())));
        }
        exact.push(Route::new("/api/request-count", api::request_count(analytics)));
    }

    // `/bytes/`, `/anything/` etc need the bare path (no trailing
    // segment) to also resolve — httpbin treats `/anything` and
    // `/anything/foo` identically.
    prefix.insert(0, Route::new("/anything/", echo::with_body));

    Router::new(exact, prefix, cors_key)
}
