//! `/gzip`, `/deflate`, `/brotli` (spec §4.7): the `/get` echo body plus
//! a marker field, compressed, with `Content-Encoding` set through the
//! router's `encoding:` tag (so no protocol engine needs to know these
//! routes exist — it just sees an already-resolved header).

use std::io::Write;

use serde_json::{json, Value};

use crate::router::{immediate, HandlerFuture, RequestDescriptor, ResponseDirective};

pub fn gzip(req: &RequestDescriptor) -> HandlerFuture {
    let body = gzip_compress(&marked_body(req, "gzipped"));
    immediate(ResponseDirective::with_encoding(body, "gzip", "application/json"))
}

pub fn deflate(req: &RequestDescriptor) -> HandlerFuture {
    // spec §4.7: zlib wrapper (RFC 1950), not raw deflate.
    let body = zlib_compress(&marked_body(req, "deflated"));
    immediate(ResponseDirective::with_encoding(body, "deflate", "application/json"))
}

pub fn brotli(req: &RequestDescriptor) -> HandlerFuture {
    let body = brotli_compress(&marked_body(req, "brotli"));
    immediate(ResponseDirective::with_encoding(body, "br", "application/json"))
}

fn marked_body(req: &RequestDescriptor, marker: &str) -> Vec<u8> {
    let mut map = super::echo::base_fields(req);
    map.insert(marker.to_string(), json!(true));
    serde_json::to_vec(&Value::Object(map)).unwrap_or_default()
}

fn gzip_compress(data: &[u8]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

fn zlib_compress(data: &[u8]) -> Vec<u8> {
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    let _ = encoder.write_all(data);
    encoder.finish().unwrap_or_default()
}

fn brotli_compress(data: &[u8]) -> Vec<u8> {
    let mut writer = brotli::CompressorWriter::new(Vec::new(), 4096, 5, 22);
    let _ = writer.write_all(data);
    let _ = writer.flush();
    writer.into_inner()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zlib_output_starts_with_the_rfc1950_header() {
        let out = zlib_compress(b"hello world");
        // 0x78 0x9c is zlib's default-compression header byte pair.
        assert_eq!(&out[..2], &[0x78, 0x9c]);
    }

    #[test]
    fn gzip_output_starts_with_the_gzip_magic_bytes() {
        let out = gzip_compress(b"hello world");
        assert_eq!(&out[..2], &[0x1f, 0x8b]);
    }
}
