use crate::dissector::{is_grease, ClientHello};

/// Computes `(ja3, ja3_hash)` per spec §4.2.1.
///
/// `JA3 = "<ver>,<ciphers>,<exts>,<groups>,<ec_point_fmts>"`, each list
/// `-`-joined decimal, GREASE omitted entirely (not just from counts).
pub fn compute(hello: &ClientHello) -> (String, String) {
    let ver = hello.handshake_version;

    let ciphers = join_decimal_no_grease(&hello.cipher_suites);
    let exts = join_decimal_no_grease(
        &hello
            .extensions
            .iter()
            .map(|e| e.ext_type)
            .collect::<Vec<_>>(),
    );
    let groups = join_decimal_no_grease(&hello.supported_groups);
    let ec_point_fmts = hello
        .ec_point_formats
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-");

    let ja3 = format!("{ver},{ciphers},{exts},{groups},{ec_point_fmts}");
    let hash = format!("{:x}", md5::compute(ja3.as_bytes()));
    (ja3, hash)
}

fn join_decimal_no_grease(values: &[u16]) -> String {
    values
        .iter()
        .filter(|v| !is_grease(**v))
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dissector::Extension;

    fn hello_with(
        handshake_version: u16,
        cipher_suites: Vec<u16>,
        extensions: Vec<u16>,
        supported_groups: Vec<u16>,
        ec_point_formats: Vec<u8>,
    ) -> ClientHello {
        ClientHello {
            record_version: 0x0301,
            handshake_version,
            client_random: [0u8; 32],
            session_id: vec![],
            cipher_suites,
            compression_methods: vec![0],
            extensions: extensions
                .into_iter()
                .map(|ext_type| Extension { ext_type, data: vec![] })
                .collect(),
            sni: None,
            supported_versions: vec![],
            supported_groups,
            ec_point_formats,
            signature_algorithms: vec![],
            alpn: vec![],
            key_shares: vec![],
            psk_modes: vec![],
            application_settings: vec![],
            raw: vec![],
        }
    }

    #[test]
    fn canonical_scenario_a() {
        let hello = hello_with(
            771,
            vec![0xC02F, 0xC030],
            vec![0x0000, 0x000A, 0x000B],
            vec![0x001D, 0x0017],
            vec![0x00],
        );
        let (ja3, hash) = compute(&hello);
        assert_eq!(ja3, "771,49199-49200,0-10-11,29-23,0");
        assert_eq!(hash, format!("{:x}", md5::compute(ja3.as_bytes())));
    }

    #[test]
    fn grease_is_omitted_entirely() {
        let hello = hello_with(
            771,
            vec![0x0A0A, 0xC02F],
            vec![0x1A1A, 0x000A],
            vec![0x2A2A, 0x001D],
            vec![0x00],
        );
        let (ja3, _) = compute(&hello);
        assert_eq!(ja3, "771,49199,10,29,0");
    }
}
