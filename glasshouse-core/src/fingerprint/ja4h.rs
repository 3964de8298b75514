use sha2::{Digest, Sha256};

const EMPTY_HASH: &str = "000000000000";
const EMPTY_LITERAL: &str = "none";

/// Computes `(ja4h, ja4h_r)` per spec §4.2.4, from the method, the HTTP
/// version string, and the ordered `"Name: Value"` header list as decoded
/// off the wire (HTTP/2 lowercase names are fine — they get lowercased
/// again here regardless).
pub fn compute(method: &str, http_version: &str, headers: &[String]) -> (String, String) {
    let m2 = method.chars().take(2).collect::<String>().to_lowercase();
    let v2 = version_code(http_version);

    let pairs: Vec<(String, String)> = headers
        .iter()
        .filter_map(|h| h.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let mut names: Vec<String> = pairs
        .iter()
        .filter(|(name, _)| {
            let lower = name.to_lowercase();
            lower != "cookie" && lower != "referer"
        })
        .map(|(name, _)| name.to_lowercase())
        .collect();
    let hc = names.len().min(99);
    names.sort();
    let names_joined = names.join(",");

    let mut cookie_values: Vec<String> = pairs
        .iter()
        .filter(|(name, _)| name.to_lowercase() == "cookie")
        .map(|(_, value)| value.clone())
        .collect();
    cookie_values.sort();
    let cookies_joined = cookie_values.join(";");

    let hhash = truncated_sha256(&names_joined);
    let chash = truncated_sha256(&cookies_joined);

    let ja4h = format!("{m2}{v2}{hc:02}_{hhash}_{chash}");
    let ja4h_r = format!(
        "{m2}{v2}{hc:02}_{}_{}",
        literal_or_none(&names_joined),
        literal_or_none(&cookies_joined),
    );
    (ja4h, ja4h_r)
}

fn literal_or_none(s: &str) -> &str {
    if s.is_empty() {
        EMPTY_LITERAL
    } else {
        s
    }
}

fn version_code(http_version: &str) -> &'static str {
    match http_version {
        "HTTP/0.9" | "0.9" => "09",
        "HTTP/1.0" | "1.0" => "10",
        "HTTP/1.1" | "http/1.1" | "1.1" => "11",
        "HTTP/2" | "h2" | "2" => "2",
        "HTTP/3" | "h3" | "3" => "3",
        _ => "00",
    }
}

fn truncated_sha256(input: &str) -> String {
    if input.is_empty() {
        return EMPTY_HASH.to_string();
    }
    let digest = Sha256::digest(input.as_bytes());
    hex::encode(digest)[..12].to_string()
}
