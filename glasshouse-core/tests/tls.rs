#[path = "helpers.rs"]
mod helpers;

#[path = "tls/acceptor.rs"]
mod acceptor;
#[path = "tls/cipher_curve_signature.rs"]
mod cipher_curve_signature;
#[path = "tls/options.rs"]
mod options;
#[path = "tls/reloader.rs"]
mod reloader;
#[path = "tls/session_resumption.rs"]
mod session_resumption;
