use crate::fingerprint::FingerprintBlock;
use crate::http2::H2Frame;

/// The request shape every protocol engine builds before calling the
/// router, per spec §3. Identical regardless of whether the underlying
/// transport was HTTP/1.1, HTTP/2, or HTTP/3.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub ip: String,
    pub http_version: String,
    pub method: String,
    pub path: String,
    pub query: String,
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub tls: FingerprintBlock,
    pub h2_frames: Option<Vec<H2Frame>>,
}

impl RequestDescriptor {
    /// Headers rendered as `"Name: Value"` pairs in wire order, the shape
    /// the fingerprint kernel's JA4H input expects.
    pub fn header_lines(&self) -> Vec<String> {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect()
    }

    /// Headers with HTTP/2's mandatory lowercase names restored to the
    /// title case HTTPBin's echo endpoints expect, repeated names merged
    /// with `"; "` (spec §4.7 "Header normalisation").
    pub fn normalized_headers(&self) -> Vec<(String, String)> {
        let mut merged: Vec<(String, String)> = Vec::new();
        for (name, value) in &self.headers {
            let title = title_case(name);
            if let Some(existing) = merged.iter_mut().find(|(n, _)| *n == title) {
                existing.1 = format!("{}; {}", existing.1, value);
            } else {
                merged.push((title, value.clone()));
            }
        }
        merged
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.query
            .split('&')
            .filter(|p| !p.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect()
    }
}

fn title_case(name: &str) -> String {
    name.split('-')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join("-")
}

/// What a handler returns: raw body bytes plus a content-type tag that
/// doubles as an in-band signalling channel for redirects and cookies
/// (spec §3). This is the infallible contract the router promises its
/// callers (spec §7): no handler-side error type ever crosses it.
#[derive(Debug, Clone)]
pub struct ResponseDirective {
    pub body: Vec<u8>,
    pub content_type_tag: String,
}

impl ResponseDirective {
    pub fn new(body: impl Into<Vec<u8>>, content_type_tag: impl Into<String>) -> Self {
        Self { body: body.into(), content_type_tag: content_type_tag.into() }
    }

    pub fn json(body: impl Into<Vec<u8>>) -> Self {
        Self::new(body, "application/json")
    }

    pub fn redirect(status: u16, location: &str) -> Self {
        Self::new(Vec::new(), format!("redirect:{status}:{location}"))
    }

    pub fn with_cookies(body: impl Into<Vec<u8>>, cookies: &[String], real_mime: &str) -> Self {
        Self::new(body, format!("set-cookies:{}:{real_mime}", cookies.join("|")))
    }

    /// A response carrying an explicit status code (e.g. `/status/{c}`),
    /// the one case spec §3's two in-band tags don't cover on their own —
    /// extended here with a third `status:` prefix following the same
    /// in-band signalling convention.
    pub fn with_status(body: impl Into<Vec<u8>>, status: u16, real_mime: &str) -> Self {
        Self::new(body, format!("status:{status}:{real_mime}"))
    }

    /// A response whose body has already been compressed (`/gzip`,
    /// `/deflate`, `/brotli`): the engine must emit `Content-Encoding`
    /// separately from the real `Content-Type` (spec §4.4 step 6, §4.7).
    pub fn with_encoding(body: impl Into<Vec<u8>>, encoding: &str, real_mime: &str) -> Self {
        Self::new(body, format!("encoding:{encoding}:{real_mime}"))
    }

    /// Parses `content_type_tag` into its effective form: a plain
    /// content-type, a redirect, a cookie-setting response, an
    /// explicit-status response, or a pre-compressed response.
    pub fn parse_tag(&self) -> ResponseTag {
        if let Some(rest) = self.content_type_tag.strip_prefix("redirect:") {
            if let Some((status, location)) = rest.split_once(':') {
                if let Ok(status) = status.parse::<u16>() {
                    return ResponseTag::Redirect(status, location.to_string());
                }
            }
            return ResponseTag::Plain("text/plain".to_string());
        }
        if let Some(rest) = self.content_type_tag.strip_prefix("set-cookies:") {
            if let Some((cookies, mime)) = rest.rsplit_once(':') {
                let cookies = cookies.split('|').map(str::to_string).collect();
                return ResponseTag::SetCookies(cookies, mime.to_string());
            }
        }
        if let Some(rest) = self.content_type_tag.strip_prefix("status:") {
            if let Some((status, mime)) = rest.split_once(':') {
                if let Ok(status) = status.parse::<u16>() {
                    return ResponseTag::Status(status, mime.to_string());
                }
            }
        }
        if let Some(rest) = self.content_type_tag.strip_prefix("encoding:") {
            if let Some((encoding, mime)) = rest.split_once(':') {
                return ResponseTag::Encoded(encoding.to_string(), mime.to_string());
            }
        }
        ResponseTag::Plain(self.content_type_tag.clone())
    }

    /// Resolves this directive into wire-ready parts (status, real
    /// content-type, extra headers, body), shared by every protocol
    /// engine so the in-band tag grammar is parsed in exactly one place.
    pub fn resolve(self) -> ResolvedResponse {
        let tag = self.parse_tag();
        match tag {
            ResponseTag::Plain(mime) => {
                ResolvedResponse { status: 200, content_type: mime, extra_headers: Vec::new(), body: self.body }
            }
            ResponseTag::Redirect(status, location) => ResolvedResponse {
                status,
                content_type: "text/plain".to_string(),
                extra_headers: vec![("location".to_string(), location)],
                body: Vec::new(),
            },
            ResponseTag::SetCookies(cookies, mime) => ResolvedResponse {
                status: 200,
                content_type: mime,
                extra_headers: cookies.into_iter().map(|c| ("set-cookie".to_string(), c)).collect(),
                body: self.body,
            },
            ResponseTag::Status(status, mime) => {
                ResolvedResponse { status, content_type: mime, extra_headers: Vec::new(), body: self.body }
            }
            ResponseTag::Encoded(encoding, mime) => ResolvedResponse {
                status: 200,
                content_type: mime,
                extra_headers: vec![("content-encoding".to_string(), encoding)],
                body: self.body,
            },
        }
    }
}

/// Wire-ready parts of a resolved [`ResponseDirective`] (spec §4.4 step 6
/// / §4.3): a status code, the real content-type, any extra headers the
/// in-band tag implied (`Location`, `Set-Cookie`, `Content-Encoding`),
/// and the body bytes.
#[derive(Debug, Clone)]
pub struct ResolvedResponse {
    pub status: u16,
    pub content_type: String,
    pub extra_headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// The decoded form of a [`ResponseDirective`]'s content-type tag. Spec
/// §9 recommends this exact shape — `ResponseDirective { Body | Redirect
/// | WithCookies }` — as the cleaner rewrite of the in-band string tags;
/// engines consume this enum rather than re-parsing the tag themselves.
#[derive(Debug, Clone)]
pub enum ResponseTag {
    Plain(String),
    Redirect(u16, String),
    SetCookies(Vec<String>, String),
    Status(u16, String),
    Encoded(String, String),
}
