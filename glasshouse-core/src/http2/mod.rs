//! Component (D): the HTTP/2 multiplexing engine (spec §4.4). The
//! hardest component in the system — a single frame-reading task feeds a
//! per-stream state machine and a connection-wide HPACK decoder, while
//! any number of request tasks build responses concurrently behind one
//! write mutex. The full ordered frame sequence feeds the Akamai H2
//! fingerprint (see [`akamai`]).

mod akamai;
mod connection;
mod frame;
mod stream;

pub use akamai::compute as compute_akamai_fingerprint;
pub use connection::run;
pub use frame::H2Frame;

/// The HTTP/2 connection preamble (spec §4.4 "Detection"). A connection
/// whose first bytes match this exactly is handed to the H2 engine;
/// everything else goes to the HTTP/1.1 line engine.
pub const H2_PREAMBLE: &[u8] = b"PRI * HTTP/2.0\r\n\r\nSM\r\n\r\n";
