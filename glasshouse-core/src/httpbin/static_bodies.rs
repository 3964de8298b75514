//! Static and near-static bodies (spec §4.7): `/image/*`, `/html`,
//! `/xml`, `/json`, `/robots.txt`, `/deny`.

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

// Minimal valid byte sequences for each format — small enough to embed,
// still parse as the format they claim to be.
const JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00, 0x01, 0x01, 0x00, 0x00, 0x01,
    0x00, 0x01, 0x00, 0x00, 0xFF, 0xD9,
];
const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];
const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00\x21\xf9\x04\x01\x00\x00\x00\x00\x2c\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02\x44\x01\x00\x3b";
const WEBP: &[u8] = b"RIFF\x1a\x00\x00\x00WEBPVP8L\x0d\x00\x00\x00\x2f\x00\x00\x00\x10\x88\x88\x08\x00\x00";
const SVG: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="1" height="1"/>"#;

pub fn image_jpeg(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(JPEG, "image/jpeg"))
}

pub fn image_png(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(PNG, "image/png"))
}

pub fn image_gif(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(GIF, "image/gif"))
}

pub fn image_webp(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(WEBP, "image/webp"))
}

pub fn image_svg(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(SVG, "image/svg+xml"))
}

pub fn html(req: &RequestDescriptor) -> HandlerFuture {
    let hash = &req.tls.tls.ja3_hash;
    let body = format!(
        "<!DOCTYPE html><html><head><title>glasshouse</title></head><body><h1>{hash}</h1></body></html>"
    );
    immediate(ResponseDirective::new(body.into_bytes(), "text/html"))
}

pub fn xml(req: &RequestDescriptor) -> HandlerFuture {
    let hash = &req.tls.tls.ja3_hash;
    let body = format!(r#"<?xml version="1.0" encoding="UTF-8"?><response><ja3>{hash}</ja3></response>"#);
    immediate(ResponseDirective::new(body.into_bytes(), "application/xml"))
}

pub fn json(req: &RequestDescriptor) -> HandlerFuture {
    let body = serde_json::json!({ "ja3_hash": req.tls.tls.ja3_hash });
    immediate(ResponseDirective::json(serde_json::to_vec(&body).unwrap_or_default()))
}

pub fn robots(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(&b"User-agent: *\nDisallow: /deny\n"[..], "text/plain"))
}

pub fn deny(_: &RequestDescriptor) -> HandlerFuture {
    immediate(ResponseDirective::new(
        &b"YOU SHOULDN'T BE HERE\n"[..],
        "text/plain",
    ))
}
