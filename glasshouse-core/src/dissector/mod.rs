//! Component (A): the ClientHello dissector. Parses raw TLS handshake
//! bytes into a typed, order-preserving [`types::ClientHello`] without
//! delegating to an external TLS-parsing crate — the dissector is core to
//! this service, not ambient plumbing.

mod cursor;
pub mod grease;
mod parser;
pub mod types;

pub use grease::is_grease;
pub use parser::parse_client_hello;
pub use types::{ClientHello, Extension, KeyShare};
