use tokio_rustls::rustls::crypto::ring::kx_group;
use tokio_rustls::rustls::crypto::SupportedKxGroup;

/// Elliptic curves (key exchange groups) supported by rustls (ring provider)
/// for ECDHE key exchange.
pub fn supported_curves() -> Vec<&'static str> {
    vec![
        // X25519 (Curve25519) - preferred for performance
        "X25519",
        // NIST curves
        "secp256r1", // P-256
        "secp384r1", // P-384
        "secp521r1", // P-521
    ]
}

/// Check if a curve name is supported by rustls.
pub fn is_curve_supported(name: &str) -> bool {
    supported_curves().contains(&name)
}

/// Resolves a curve name to its rustls `SupportedKxGroup`.
pub fn resolve_curve(name: &str) -> Option<&'static dyn SupportedKxGroup> {
    Some(match name {
        "X25519" => kx_group::X25519,
        "secp256r1" => kx_group::SECP256R1,
        "secp384r1" => kx_group::SECP384R1,
        "secp521r1" => kx_group::SECP521R1,
        _ => return None,
    })
}
