use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::error::{GlassError, Result};

pub const FRAME_DATA: u8 = 0x0;
pub const FRAME_HEADERS: u8 = 0x1;
pub const FRAME_PRIORITY: u8 = 0x2;
pub const FRAME_RST_STREAM: u8 = 0x3;
pub const FRAME_SETTINGS: u8 = 0x4;
pub const FRAME_PUSH_PROMISE: u8 = 0x5;
pub const FRAME_PING: u8 = 0x6;
pub const FRAME_GOAWAY: u8 = 0x7;
pub const FRAME_WINDOW_UPDATE: u8 = 0x8;
pub const FRAME_CONTINUATION: u8 = 0x9;

pub const FLAG_END_STREAM: u8 = 0x1;
pub const FLAG_ACK: u8 = 0x1;
pub const FLAG_END_HEADERS: u8 = 0x4;
pub const FLAG_PADDED: u8 = 0x8;
pub const FLAG_PRIORITY: u8 = 0x20;

pub const DEFAULT_MAX_FRAME_SIZE: u32 = 16_384;

pub const ERR_NO_ERROR: u32 = 0x0;
pub const ERR_PROTOCOL_ERROR: u32 = 0x1;

/// A frame exactly as read off (or about to be written to) the wire:
/// 9-byte header plus payload, stripped of the stream-id reserved bit.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub frame_type: u8,
    pub flags: u8,
    pub stream_id: u32,
    pub payload: Vec<u8>,
}

pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<RawFrame> {
    let mut header = [0u8; 9];
    reader
        .read_exact(&mut header)
        .await
        .map_err(GlassError::Io)?;

    let length = u32::from_be_bytes([0, header[0], header[1], header[2]]);
    if length > DEFAULT_MAX_FRAME_SIZE * 4 {
        return Err(GlassError::Internal(format!("H2 frame too large: {length}")));
    }
    let frame_type = header[3];
    let flags = header[4];
    let stream_id = u32::from_be_bytes([header[5], header[6], header[7], header[8]]) & 0x7fff_ffff;

    let mut payload = vec![0u8; length as usize];
    reader
        .read_exact(&mut payload)
        .await
        .map_err(GlassError::Io)?;

    Ok(RawFrame { frame_type, flags, stream_id, payload })
}

pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    frame_type: u8,
    flags: u8,
    stream_id: u32,
    payload: &[u8],
) -> Result<()> {
    let len = payload.len() as u32;
    let mut header = [0u8; 9];
    header[0..3].copy_from_slice(&len.to_be_bytes()[1..]);
    header[3] = frame_type;
    header[4] = flags;
    header[5..9].copy_from_slice(&(stream_id & 0x7fff_ffff).to_be_bytes());

    writer.write_all(&header).await.map_err(GlassError::Io)?;
    writer.write_all(payload).await.map_err(GlassError::Io)?;
    Ok(())
}

#[derive(Debug, Clone, Default)]
pub struct PriorityInfo {
    pub weight: u8,
    pub depends_on: u32,
    pub exclusive: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GoAwayInfo {
    pub last_stream_id: u32,
    pub err_code: u32,
    pub debug: String,
}

/// The captured-frame shape of spec §3: everything fingerprinting (and
/// introspection endpoints) need from a frame, independent of its wire
/// encoding. This is what accumulates in `Connection::connection_frames`
/// and `Stream::captured_frames`.
#[derive(Debug, Clone, Default)]
pub struct H2Frame {
    pub frame_type: u8,
    pub stream_id: u32,
    pub length: u32,
    pub flags: Vec<String>,
    pub settings: Option<Vec<String>>,
    pub headers: Option<Vec<String>>,
    pub priority: Option<PriorityInfo>,
    pub window_increment: Option<u32>,
    pub data_len: Option<u32>,
    pub goaway: Option<GoAwayInfo>,
}

impl H2Frame {
    pub fn type_name(&self) -> &'static str {
        frame_type_name(self.frame_type)
    }
}

pub fn frame_type_name(frame_type: u8) -> &'static str {
    match frame_type {
        FRAME_DATA => "DATA",
        FRAME_HEADERS => "HEADERS",
        FRAME_PRIORITY => "PRIORITY",
        FRAME_RST_STREAM => "RST_STREAM",
        FRAME_SETTINGS => "SETTINGS",
        FRAME_PUSH_PROMISE => "PUSH_PROMISE",
        FRAME_PING => "PING",
        FRAME_GOAWAY => "GOAWAY",
        FRAME_WINDOW_UPDATE => "WINDOW_UPDATE",
        FRAME_CONTINUATION => "CONTINUATION",
        _ => "UNKNOWN",
    }
}

fn flag_names(frame_type: u8, flags: u8) -> Vec<String> {
    let mut names = Vec::new();
    if flags & FLAG_END_STREAM != 0 && matches!(frame_type, FRAME_DATA | FRAME_HEADERS) {
        names.push("END_STREAM".to_string());
    }
    if flags & FLAG_ACK != 0 && matches!(frame_type, FRAME_SETTINGS | FRAME_PING) {
        names.push("ACK".to_string());
    }
    if flags & FLAG_END_HEADERS != 0 && matches!(frame_type, FRAME_HEADERS | FRAME_CONTINUATION) {
        names.push("END_HEADERS".to_string());
    }
    if flags & FLAG_PADDED != 0 && matches!(frame_type, FRAME_DATA | FRAME_HEADERS) {
        names.push("PADDED".to_string());
    }
    if flags & FLAG_PRIORITY != 0 && frame_type == FRAME_HEADERS {
        names.push("PRIORITY".to_string());
    }
    names
}

/// Parses the `SETTINGS` payload into ordered `"Name = Value"` strings.
pub fn parse_settings_payload(payload: &[u8]) -> Vec<String> {
    payload
        .chunks_exact(6)
        .map(|chunk| {
            let id = u16::from_be_bytes([chunk[0], chunk[1]]);
            let value = u32::from_be_bytes([chunk[2], chunk[3], chunk[4], chunk[5]]);
            format!("{} = {value}", settings_param_name(id))
        })
        .collect()
}

fn settings_param_name(id: u16) -> String {
    match id {
        0x1 => "HEADER_TABLE_SIZE".to_string(),
        0x2 => "ENABLE_PUSH".to_string(),
        0x3 => "MAX_CONCURRENT_STREAMS".to_string(),
        0x4 => "INITIAL_WINDOW_SIZE".to_string(),
        0x5 => "MAX_FRAME_SIZE".to_string(),
        0x6 => "MAX_HEADER_LIST_SIZE".to_string(),
        other => format!("UNKNOWN({other:#06x})"),
    }
}

/// Strips HEADERS padding/priority prefix bytes, returning the remaining
/// header-block fragment plus the parsed priority info, if present.
fn split_headers_payload(
    payload: &[u8],
    flags: u8,
) -> Result<(Option<PriorityInfo>, &[u8])> {
    let mut pos = 0usize;
    let mut pad_len = 0usize;

    if flags & FLAG_PADDED != 0 {
        let b = *payload
            .first()
            .ok_or_else(|| GlassError::Internal("truncated HEADERS padding".to_string()))?;
        pad_len = b as usize;
        pos += 1;
    }

    let priority = if flags & FLAG_PRIORITY != 0 {
        let bytes = payload
            .get(pos..pos + 5)
            .ok_or_else(|| GlassError::Internal("truncated HEADERS priority".to_string()))?;
        let raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let exclusive = raw & 0x8000_0000 != 0;
        let depends_on = raw & 0x7fff_ffff;
        let weight = bytes[4];
        pos += 5;
        Some(PriorityInfo { weight, depends_on, exclusive })
    } else {
        None
    };

    let end = payload
        .len()
        .checked_sub(pad_len)
        .filter(|&end| end >= pos)
        .ok_or_else(|| GlassError::Internal("HEADERS padding exceeds frame length".to_string()))?;

    Ok((priority, &payload[pos..end]))
}

/// Builds a captured `H2Frame` from a raw wire frame. Header-block bytes
/// are decoded separately (by the connection-wide HPACK decoder) and
/// passed in via `decoded_headers`; callers pass `None` for non-HEADERS
/// frames.
pub fn capture(raw: &RawFrame, decoded_headers: Option<Vec<String>>) -> Result<H2Frame> {
    let mut frame = H2Frame {
        frame_type: raw.frame_type,
        stream_id: raw.stream_id,
        length: raw.payload.len() as u32,
        flags: flag_names(raw.frame_type, raw.flags),
        ..Default::default()
    };

    match raw.frame_type {
        FRAME_SETTINGS if raw.flags & FLAG_ACK == 0 => {
            frame.settings = Some(parse_settings_payload(&raw.payload));
        }
        FRAME_HEADERS => {
            let (priority, _) = split_headers_payload(&raw.payload, raw.flags)?;
            frame.priority = priority;
            frame.headers = decoded_headers;
        }
        FRAME_DATA => {
            frame.data_len = Some(raw.payload.len() as u32);
        }
        FRAME_PRIORITY => {
            let bytes = raw
                .payload
                .get(0..5)
                .ok_or_else(|| GlassError::Internal("truncated PRIORITY frame".to_string()))?;
            let depends_raw = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            frame.priority = Some(PriorityInfo {
                weight: bytes[4],
                depends_on: depends_raw & 0x7fff_ffff,
                exclusive: depends_raw & 0x8000_0000 != 0,
            });
        }
        FRAME_WINDOW_UPDATE => {
            let bytes = raw.payload.get(0..4).ok_or_else(|| {
                GlassError::Internal("truncated WINDOW_UPDATE frame".to_string())
            })?;
            let increment = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) & 0x7fff_ffff;
            frame.window_increment = Some(increment);
        }
        FRAME_GOAWAY => {
            let bytes = raw
                .payload
                .get(0..8)
                .ok_or_else(|| GlassError::Internal("truncated GOAWAY frame".to_string()))?;
            let last_stream_id =
                u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) & 0x7fff_ffff;
            let err_code = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
            let debug = String::from_utf8_lossy(&raw.payload[8..]).into_owned();
            frame.goaway = Some(GoAwayInfo { last_stream_id, err_code, debug });
        }
        _ => {}
    }

    Ok(frame)
}

/// Extracts the raw header-block fragment for HPACK decoding (HEADERS
/// frames only; padding/priority prefix already stripped).
pub fn header_block_fragment(raw: &RawFrame) -> Result<Vec<u8>> {
    let (_, fragment) = split_headers_payload(&raw.payload, raw.flags)?;
    Ok(fragment.to_vec())
}
