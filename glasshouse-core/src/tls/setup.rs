use crate::config::TlsConfig;
use crate::error::Result;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use super::{build_cert_reloader, build_rustls};

pub struct TlsSetup {
    /// TLS acceptor wrapped in Arc<RwLock> for thread-safe hot reload.
    pub acceptor: Arc<RwLock<Option<TlsAcceptor>>>,
}

/// Sets up TLS with certificate hot reload.
///
/// Builds the initial acceptor synchronously, then spawns a background task
/// that watches the certificate/key files and swaps in a freshly built
/// acceptor whenever they change.
pub async fn setup_tls_with_hot_reload(tls_config: &TlsConfig) -> Result<TlsSetup> {
    let initial_acceptor = build_rustls(tls_config)?;
    let tls_acceptor = Arc::new(RwLock::new(Some(initial_acceptor)));

    let mut reloader_rx = build_cert_reloader(tls_config).await?;
    let alpn = tls_config.alpn.clone();
    let options = tls_config.options.clone();
    let session_resumption = tls_config.session_resumption.clone();

    let tls_acceptor_for_update = Arc::clone(&tls_acceptor);
    tokio::spawn(async move {
        loop {
            if reloader_rx.changed().await.is_err() {
                break;
            }
            let certs_keys = reloader_rx.borrow().clone();
            match certs_keys {
                Some(certs_keys) => match certs_keys.build_rustls(&alpn, &options, &session_resumption) {
                    Ok(new_acceptor) => {
                        info!("certificate reloaded successfully");
                        *tls_acceptor_for_update.write().await = Some(new_acceptor);
                    }
                    Err(e) => {
                        error!(error = %e, "failed to build TLS acceptor from reloaded certificates");
                    }
                },
                None => warn!("certificate reloader produced no certificates"),
            }
        }
    });

    Ok(TlsSetup { acceptor: tls_acceptor })
}
