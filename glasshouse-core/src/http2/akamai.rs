use super::frame::{
    frame_type_name, GoAwayInfo, H2Frame, FRAME_HEADERS, FRAME_PRIORITY, FRAME_SETTINGS,
    FRAME_WINDOW_UPDATE,
};

const PSEUDO_HEADER_LETTERS: &[(&str, char)] = &[
    (":method", 'm'),
    (":authority", 'a'),
    (":scheme", 's'),
    (":path", 'p'),
];

/// Derives the Akamai H2 fingerprint from a connection's captured frame
/// sequence (spec §3, §4.4 step 3): `connection_frames ++
/// stream.captured_frames` for the requesting stream, taken as a fresh
/// snapshot copy.
///
/// Shape: `<settings>|<window_update>|<priorities>|<pseudo_header_order>`,
/// the community-standard four-field Akamai fingerprint —
/// - settings: `id:value` pairs in the order the SETTINGS frame listed
///   them, `;`-joined; `0` if no SETTINGS frame was observed.
/// - window_update: the first connection-level WINDOW_UPDATE increment
///   seen, or `0`.
/// - priorities: `streamid:exclusive:depends_on:weight` for every
///   PRIORITY frame (standalone or HEADERS+PRIORITY) in order, `,`-joined;
///   `0` if none.
/// - pseudo_header_order: the single-letter order (`m`/`a`/`s`/`p`) of
///   pseudo-headers as they appeared in the first HEADERS frame's decoded
///   header list.
pub fn compute(frames: &[H2Frame]) -> String {
    let settings = settings_field(frames);
    let window_update = window_update_field(frames);
    let priorities = priorities_field(frames);
    let pseudo_order = pseudo_header_order_field(frames);

    format!("{settings}|{window_update}|{priorities}|{pseudo_order}")
}

fn settings_field(frames: &[H2Frame]) -> String {
    let Some(frame) = frames
        .iter()
        .find(|f| f.frame_type == FRAME_SETTINGS && f.settings.is_some())
    else {
        return "0".to_string();
    };
    let Some(settings) = &frame.settings else {
        return "0".to_string();
    };
    if settings.is_empty() {
        return "0".to_string();
    }
    settings
        .iter()
        .filter_map(|entry| entry.split_once(" = "))
        .map(|(name, value)| format!("{}:{value}", settings_id(name)))
        .collect::<Vec<_>>()
        .join(";")
}

fn settings_id(name: &str) -> u16 {
    match name {
        "HEADER_TABLE_SIZE" => 0x1,
        "ENABLE_PUSH" => 0x2,
        "MAX_CONCURRENT_STREAMS" => 0x3,
        "INITIAL_WINDOW_SIZE" => 0x4,
        "MAX_FRAME_SIZE" => 0x5,
        "MAX_HEADER_LIST_SIZE" => 0x6,
        _ => 0x0,
    }
}

fn window_update_field(frames: &[H2Frame]) -> String {
    frames
        .iter()
        .find(|f| f.frame_type == FRAME_WINDOW_UPDATE && f.stream_id == 0)
        .and_then(|f| f.window_increment)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "0".to_string())
}

fn priorities_field(frames: &[H2Frame]) -> String {
    let entries: Vec<String> = frames
        .iter()
        .filter(|f| {
            (f.frame_type == FRAME_PRIORITY || f.frame_type == FRAME_HEADERS) && f.priority.is_some()
        })
        .map(|f| {
            let p = f.priority.as_ref().expect("filtered on priority.is_some()");
            format!("{}:{}:{}:{}", f.stream_id, p.exclusive as u8, p.depends_on, p.weight)
        })
        .collect();
    if entries.is_empty() {
        "0".to_string()
    } else {
        entries.join(",")
    }
}

fn pseudo_header_order_field(frames: &[H2Frame]) -> String {
    let Some(headers) = frames
        .iter()
        .find(|f| f.frame_type == FRAME_HEADERS)
        .and_then(|f| f.headers.as_ref())
    else {
        return String::new();
    };

    headers
        .iter()
        .filter_map(|line| line.split_once(':').map(|(name, _)| name.trim()))
        .filter_map(|name| {
            PSEUDO_HEADER_LETTERS
                .iter()
                .find(|(pseudo, _)| *pseudo == format!(":{name}").as_str() || *pseudo == name)
                .map(|(_, letter)| *letter)
        })
        .collect()
}

/// `GOAWAY` frames are not part of the Akamai fingerprint input but are
/// captured for introspection (`/api/all`, `/api/raw`); this accessor
/// keeps that read out of the fingerprint derivation proper.
pub fn last_goaway(frames: &[H2Frame]) -> Option<&GoAwayInfo> {
    frames
        .iter()
        .rev()
        .find_map(|f| f.goaway.as_ref())
}

pub fn frame_type_names(frames: &[H2Frame]) -> Vec<&'static str> {
    frames.iter().map(|f| frame_type_name(f.frame_type)).collect()
}
