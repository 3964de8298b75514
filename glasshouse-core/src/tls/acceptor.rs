use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::sync::Arc;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::server::WebPkiClientVerifier;
use tokio_rustls::rustls::{RootCertStore, ServerConfig, SupportedProtocolVersion};
use tokio_rustls::TlsAcceptor;

use crate::config::{ClientAuth, SessionResumptionConfig, TlsConfig, TlsOptions, TlsVersion};
use crate::error::{GlassError, Result};

use super::cipher_suites::{is_cipher_suite_supported, resolve_cipher_suite};
use super::curves::{is_curve_supported, resolve_curve};
use super::session_resumption::configure_session_resumption;

/// Validates a `TlsOptions` document before it is used to build a
/// `ServerConfig`. `versions` and `min_version`/`max_version` are mutually
/// exclusive knobs over the same thing — pick one.
pub fn validate_tls_options(options: &TlsOptions) -> std::result::Result<(), String> {
    if (options.min_version.is_some() || options.max_version.is_some())
        && !options.versions.is_empty()
    {
        return Err(
            "versions conflicts with min_version/max_version; set one or the other".to_string(),
        );
    }

    if let (Some(min), Some(max)) = (options.min_version, options.max_version) {
        if version_rank(min) > version_rank(max) {
            return Err("min_version must be <= max_version".to_string());
        }
    }

    for suite in &options.cipher_suites {
        if suite.is_empty() || !is_cipher_suite_supported(suite) {
            return Err(format!("unsupported cipher suite: {suite}"));
        }
    }

    for curve in &options.curve_preferences {
        if curve.is_empty() || !is_curve_supported(curve) {
            return Err(format!("unsupported curve: {curve}"));
        }
    }

    Ok(())
}

fn version_rank(v: TlsVersion) -> u8 {
    match v {
        TlsVersion::V1_2 => 2,
        TlsVersion::V1_3 => 3,
    }
}

fn protocol_versions(options: &TlsOptions) -> Vec<&'static SupportedProtocolVersion> {
    let wanted: Vec<TlsVersion> = if options.min_version.is_some() || options.max_version.is_some()
    {
        let min = options.min_version.map(version_rank).unwrap_or(2);
        let max = options.max_version.map(version_rank).unwrap_or(3);
        [TlsVersion::V1_2, TlsVersion::V1_3]
            .into_iter()
            .filter(|v| {
                let r = version_rank(*v);
                r >= min && r <= max
            })
            .collect()
    } else if options.versions.is_empty() {
        vec![TlsVersion::V1_2, TlsVersion::V1_3]
    } else {
        options.versions.clone()
    };

    wanted
        .into_iter()
        .map(|v| match v {
            TlsVersion::V1_2 => &tokio_rustls::rustls::version::TLS12,
            TlsVersion::V1_3 => &tokio_rustls::rustls::version::TLS13,
        })
        .collect()
}

/// Builds a `ServerConfig` from a certificate chain, key, and the TLS
/// knobs shared by both the startup path (`build_rustls`) and the hot
/// reload path (`ServerCertsKeys::build_rustls`).
pub(crate) fn build_server_config(
    certs: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    options: &TlsOptions,
    client_auth: &ClientAuth,
    session_resumption: &SessionResumptionConfig,
) -> Result<ServerConfig> {
    validate_tls_options(options).map_err(GlassError::Config)?;

    let mut provider = ring::default_provider();
    if !options.cipher_suites.is_empty() {
        provider.cipher_suites = options
            .cipher_suites
            .iter()
            .filter_map(|s| resolve_cipher_suite(s))
            .collect();
    }
    if !options.curve_preferences.is_empty() {
        provider.kx_groups = options
            .curve_preferences
            .iter()
            .filter_map(|s| resolve_curve(s))
            .collect();
    }

    let versions = protocol_versions(options);

    let builder = ServerConfig::builder_with_provider(Arc::new(provider))
        .with_protocol_versions(&versions)
        .map_err(|e| GlassError::Tls(format!("Failed to build TLS config: {e}")))?;

    let mut server = match client_auth {
        ClientAuth::Disabled => builder
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| GlassError::Tls(format!("Failed to build TLS config: {e}")))?,
        ClientAuth::Required { ca_cert_path } => {
            let ca_bytes = std::fs::read(ca_cert_path)
                .map_err(|e| GlassError::Tls(format!("Failed to read client CA certificate: {e}")))?;
            let ca_certs = CertificateDer::pem_slice_iter(&ca_bytes)
                .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
                .map_err(|e| {
                    GlassError::Tls(format!("Failed to parse client CA certificates: {e}"))
                })?;
            let mut roots = RootCertStore::empty();
            for ca in ca_certs {
                roots
                    .add(ca)
                    .map_err(|e| GlassError::Tls(format!("Failed to add CA certificate: {e}")))?;
            }
            let verifier = WebPkiClientVerifier::builder(Arc::new(roots))
                .build()
                .map_err(|e| GlassError::Tls(format!("Failed to build client verifier: {e}")))?;
            builder
                .with_client_cert_verifier(verifier)
                .with_single_cert(certs, key)
                .map_err(|e| GlassError::Tls(format!("Failed to build TLS config: {e}")))?
        }
    };

    configure_session_resumption(&mut server, session_resumption);

    Ok(server)
}

/// Builds a TLS acceptor from configuration: cipher suites, curve
/// preferences, protocol versions, optional mTLS client verification, and
/// session resumption.
pub fn build_rustls(cfg: &TlsConfig) -> Result<TlsAcceptor> {
    let certs = {
        let bytes = std::fs::read(&cfg.cert_path)
            .map_err(|e| GlassError::Tls(format!("Failed to read certificate: {e}")))?;
        CertificateDer::pem_slice_iter(&bytes)
            .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
            .map_err(|e| GlassError::Tls(format!("Failed to parse certificates: {e}")))?
    };

    let key = {
        let bytes = std::fs::read(&cfg.key_path)
            .map_err(|e| GlassError::Tls(format!("Failed to read key: {e}")))?;
        let mut keys: Vec<PrivateKeyDer<'static>> = PrivateKeyDer::pem_slice_iter(&bytes)
            .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
            .map_err(|e| GlassError::Tls(format!("Failed to parse private key: {e}")))?;
        let Some(k) = keys.pop() else {
            return Err(GlassError::NoPrivateKey);
        };
        k
    };

    let mut server = build_server_config(
        certs,
        key,
        &cfg.options,
        &cfg.client_auth,
        &cfg.session_resumption,
    )?;

    if !cfg.alpn.is_empty() {
        server.alpn_protocols = cfg.alpn.iter().map(|s| s.as_bytes().to_vec()).collect();
    } else {
        server.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
    }

    Ok(TlsAcceptor::from(Arc::new(server)))
}
