use crate::error::GlassError;

use super::cursor::Cursor;
use super::types::*;

const HANDSHAKE_CONTENT_TYPE: u8 = 0x16;
const CLIENT_HELLO_MSG_TYPE: u8 = 0x01;

/// Parses a raw ClientHello off the wire, starting at the TLS record
/// header. Returns `GlassError::Dissect` on any malformed length prefix or
/// truncation — this function never panics, per spec.
pub fn parse_client_hello(raw: &[u8]) -> Result<ClientHello, GlassError> {
    let mut c = Cursor::new(raw);

    let content_type = c.u8()?;
    if content_type != HANDSHAKE_CONTENT_TYPE {
        return Err(GlassError::Dissect(format!(
            "expected TLS handshake record (0x16), got {content_type:#04x}"
        )));
    }
    let record_version = c.u16()?;
    let record_len = c.u16()? as usize;
    let record_body = c.take(record_len)?;

    let mut hc = Cursor::new(record_body);
    let handshake_type = hc.u8()?;
    if handshake_type != CLIENT_HELLO_MSG_TYPE {
        return Err(GlassError::Dissect(format!(
            "expected ClientHello handshake message (0x01), got {handshake_type:#04x}"
        )));
    }
    let body_len = hc.u24()? as usize;
    let body = hc.take(body_len)?;

    let mut b = Cursor::new(body);
    let handshake_version = b.u16()?;

    let random_bytes = b.take(32)?;
    let mut client_random = [0u8; 32];
    client_random.copy_from_slice(random_bytes);

    let session_id_len = b.u8()? as usize;
    let session_id = b.take(session_id_len)?.to_vec();

    let cipher_suites_len = b.u16()? as usize;
    if cipher_suites_len % 2 != 0 {
        return Err(GlassError::Dissect("odd cipher_suites length".to_string()));
    }
    let cipher_bytes = b.take(cipher_suites_len)?;
    let cipher_suites = cipher_bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect();

    let compression_len = b.u8()? as usize;
    let compression_methods = b.take(compression_len)?.to_vec();

    let mut hello = ClientHello {
        record_version,
        handshake_version,
        client_random,
        session_id,
        cipher_suites,
        compression_methods,
        extensions: Vec::new(),
        sni: None,
        supported_versions: Vec::new(),
        supported_groups: Vec::new(),
        ec_point_formats: Vec::new(),
        signature_algorithms: Vec::new(),
        alpn: Vec::new(),
        key_shares: Vec::new(),
        psk_modes: Vec::new(),
        application_settings: Vec::new(),
        raw: raw.to_vec(),
    };

    // Extensions are optional: a ClientHello with no remaining bytes after
    // compression methods is legal (pre-TLS-1.2 or minimal test fixtures).
    if b.remaining() == 0 {
        return Ok(hello);
    }

    let extensions_len = b.u16()? as usize;
    let ext_bytes = b.take(extensions_len)?;
    let mut ec = Cursor::new(ext_bytes);

    while ec.remaining() > 0 {
        let ext_type = ec.u16()?;
        let ext_len = ec.u16()? as usize;
        let data = ec.take(ext_len)?.to_vec();

        parse_known_extension(&mut hello, ext_type, &data)?;
        hello.extensions.push(Extension { ext_type, data });
    }

    Ok(hello)
}

fn parse_known_extension(
    hello: &mut ClientHello,
    ext_type: u16,
    data: &[u8],
) -> Result<(), GlassError> {
    match ext_type {
        EXT_SERVER_NAME => hello.sni = parse_sni(data)?,
        EXT_SUPPORTED_VERSIONS => hello.supported_versions = parse_u16_list8(data)?,
        EXT_SUPPORTED_GROUPS => hello.supported_groups = parse_u16_list16(data)?,
        EXT_EC_POINT_FORMATS => hello.ec_point_formats = parse_u8_list8(data)?,
        EXT_SIGNATURE_ALGORITHMS => hello.signature_algorithms = parse_u16_list16(data)?,
        EXT_ALPN => hello.alpn = parse_protocol_name_list(data)?,
        EXT_APPLICATION_SETTINGS => hello.application_settings = parse_protocol_name_list(data)?,
        EXT_KEY_SHARE => hello.key_shares = parse_key_shares(data)?,
        EXT_PSK_KEY_EXCHANGE_MODES => hello.psk_modes = parse_u8_list8(data)?,
        _ => {}
    }
    Ok(())
}

fn parse_sni(data: &[u8]) -> Result<Option<String>, GlassError> {
    let mut c = Cursor::new(data);
    if c.remaining() == 0 {
        return Ok(None);
    }
    let list_len = c.u16()? as usize;
    let mut list = Cursor::new(c.take(list_len)?);
    while list.remaining() > 0 {
        let name_type = list.u8()?;
        let name_len = list.u16()? as usize;
        let name_bytes = list.take(name_len)?;
        if name_type == 0 {
            return Ok(Some(String::from_utf8_lossy(name_bytes).into_owned()));
        }
    }
    Ok(None)
}

fn parse_u16_list8(data: &[u8]) -> Result<Vec<u16>, GlassError> {
    let mut c = Cursor::new(data);
    let len = c.u8()? as usize;
    if len % 2 != 0 {
        return Err(GlassError::Dissect("odd u16 list length".to_string()));
    }
    let bytes = c.take(len)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|p| u16::from_be_bytes([p[0], p[1]]))
        .collect())
}

fn parse_u16_list16(data: &[u8]) -> Result<Vec<u16>, GlassError> {
    let mut c = Cursor::new(data);
    let len = c.u16()? as usize;
    if len % 2 != 0 {
        return Err(GlassError::Dissect("odd u16 list length".to_string()));
    }
    let bytes = c.take(len)?;
    Ok(bytes
        .chunks_exact(2)
        .map(|p| u16::from_be_bytes([p[0], p[1]]))
        .collect())
}

fn parse_u8_list8(data: &[u8]) -> Result<Vec<u8>, GlassError> {
    let mut c = Cursor::new(data);
    let len = c.u8()? as usize;
    Ok(c.take(len)?.to_vec())
}

fn parse_protocol_name_list(data: &[u8]) -> Result<Vec<String>, GlassError> {
    let mut c = Cursor::new(data);
    let list_len = c.u16()? as usize;
    let mut list = Cursor::new(c.take(list_len)?);
    let mut out = Vec::new();
    while list.remaining() > 0 {
        let len = list.u8()? as usize;
        let bytes = list.take(len)?;
        out.push(String::from_utf8_lossy(bytes).into_owned());
    }
    Ok(out)
}

fn parse_key_shares(data: &[u8]) -> Result<Vec<KeyShare>, GlassError> {
    let mut c = Cursor::new(data);
    if c.remaining() == 0 {
        return Ok(Vec::new());
    }
    let list_len = c.u16()? as usize;
    let mut list = Cursor::new(c.take(list_len)?);
    let mut out = Vec::new();
    while list.remaining() > 0 {
        let group = list.u16()?;
        let len = list.u16()? as usize;
        let payload = list.take(len)?.to_vec();
        out.push((group, payload));
    }
    Ok(out)
}
