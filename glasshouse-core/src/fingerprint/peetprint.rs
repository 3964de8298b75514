use crate::dissector::{is_grease, ClientHello};

/// Computes `(peetprint, peetprint_hash)` per spec §4.2.3.
///
/// `peetprint = "<groups>|<alpns>|<sigalgs>|<ext_ids_in_order>"`. Each
/// sublist is `-`-joined decimal and keeps GREASE stripped, same as the
/// rest of the fingerprint kernel — the parsed [`ClientHello`] is the only
/// place GREASE values are retained.
pub fn compute(hello: &ClientHello) -> (String, String) {
    let groups = join_decimal_no_grease(&hello.supported_groups);
    let alpns = hello.alpn.join("-");
    let sigalgs = join_decimal_no_grease(&hello.signature_algorithms);
    let ext_ids = join_decimal_no_grease(
        &hello
            .extensions
            .iter()
            .map(|e| e.ext_type)
            .collect::<Vec<_>>(),
    );

    let peetprint = format!("{groups}|{alpns}|{sigalgs}|{ext_ids}");
    let hash = format!("{:x}", md5::compute(peetprint.as_bytes()));
    (peetprint, hash)
}

fn join_decimal_no_grease(values: &[u16]) -> String {
    values
        .iter()
        .filter(|v| !is_grease(**v))
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("-")
}
