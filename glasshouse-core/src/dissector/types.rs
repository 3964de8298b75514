/// Extension type IDs the dissector understands by name; anything else is
/// kept in `ClientHello::extensions` but not broken out into a typed field.
pub const EXT_SERVER_NAME: u16 = 0x0000;
pub const EXT_SUPPORTED_GROUPS: u16 = 0x000a;
pub const EXT_EC_POINT_FORMATS: u16 = 0x000b;
pub const EXT_SIGNATURE_ALGORITHMS: u16 = 0x000d;
pub const EXT_ALPN: u16 = 0x0010;
pub const EXT_PADDING: u16 = 0x0015;
pub const EXT_SESSION_TICKET: u16 = 0x0023;
pub const EXT_PRE_SHARED_KEY: u16 = 0x0029;
pub const EXT_PSK_KEY_EXCHANGE_MODES: u16 = 0x002d;
pub const EXT_SUPPORTED_VERSIONS: u16 = 0x002b;
pub const EXT_KEY_SHARE: u16 = 0x0033;
pub const EXT_APPLICATION_SETTINGS: u16 = 0x4469;

/// A single TLS extension as seen on the wire: type id plus raw payload,
/// order preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub ext_type: u16,
    pub data: Vec<u8>,
}

/// A named key share entry: `(group, key_exchange_bytes)`, order preserved.
pub type KeyShare = (u16, Vec<u8>);

/// The parsed ClientHello, per spec §3. Every ordered list here is kept in
/// wire order; GREASE values are flagged (see [`crate::dissector::grease`])
/// but never dropped — fingerprinting strips them later, not here.
#[derive(Debug, Clone)]
pub struct ClientHello {
    /// TLS record layer version (e.g. `0x0301` for a TLS 1.0-labelled
    /// record, commonly seen even on TLS 1.2/1.3 ClientHellos).
    pub record_version: u16,
    /// The legacy `client_version` field inside the Handshake body.
    pub handshake_version: u16,
    pub client_random: [u8; 32],
    pub session_id: Vec<u8>,
    pub cipher_suites: Vec<u16>,
    pub compression_methods: Vec<u8>,
    pub extensions: Vec<Extension>,

    pub sni: Option<String>,
    pub supported_versions: Vec<u16>,
    pub supported_groups: Vec<u16>,
    pub ec_point_formats: Vec<u8>,
    pub signature_algorithms: Vec<u16>,
    pub alpn: Vec<String>,
    pub key_shares: Vec<KeyShare>,
    pub psk_modes: Vec<u8>,
    pub application_settings: Vec<String>,

    pub raw: Vec<u8>,
}

impl ClientHello {
    /// The version used for fingerprinting purposes: the highest entry in
    /// `supported_versions` (TLS 1.3's real negotiated-version signal) when
    /// present, else the legacy `handshake_version`.
    pub fn negotiated_version(&self) -> u16 {
        self.supported_versions
            .iter()
            .copied()
            .filter(|v| !crate::dissector::grease::is_grease(*v))
            .max()
            .unwrap_or(self.handshake_version)
    }

    pub fn raw_hex(&self) -> String {
        hex::encode(&self.raw)
    }

    pub fn raw_b64(&self) -> String {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;
        STANDARD.encode(&self.raw)
    }

    /// Whether the extension-bound SNI host looks like a literal IP address
    /// rather than a domain name — used by JA4's sni_mode field.
    pub fn sni_is_ip(&self) -> bool {
        match &self.sni {
            Some(host) => host.parse::<std::net::IpAddr>().is_ok(),
            None => false,
        }
    }
}
