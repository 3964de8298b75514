use std::sync::{Arc, Mutex};

use bytes::Bytes;
use tokio::sync::mpsc;

use super::frame::H2Frame;

/// Per spec §3's capacity floor ("bounded channel, >= 10 chunks"); the
/// reader task drops overflow chunks silently rather than block.
pub const BODY_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    HalfClosedRemote,
    HalfClosedLocal,
    Closed,
}

/// One HTTP/2 stream's state as tracked by the frame-reader task.
///
/// Per spec §9's open write-discipline question, `captured_frames` is
/// appended to by the reader and read (as a cloned snapshot) by the
/// request task handling this stream concurrently. Resolved here by
/// guarding the slice with a per-stream lock, rather than making the
/// reader the sole producer of a side-channel snapshot: the lock is held
/// only for the duration of a push/clone, never across an `.await`.
pub struct Stream {
    pub id: u32,
    pub state: StreamState,
    pub captured_frames: Arc<Mutex<Vec<H2Frame>>>,
    pub body_tx: Option<mpsc::Sender<Bytes>>,
    pub body_closed: bool,
}

impl Stream {
    pub fn new(id: u32) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(BODY_CHANNEL_CAPACITY);
        (
            Self {
                id,
                state: StreamState::Open,
                captured_frames: Arc::new(Mutex::new(Vec::new())),
                body_tx: Some(tx),
                body_closed: false,
            },
            rx,
        )
    }

    /// Appends a just-captured frame. The reader task is the only caller.
    pub fn record(&mut self, frame: H2Frame) {
        self.captured_frames
            .lock()
            .expect("stream frame lock poisoned")
            .push(frame);
    }

    /// A fresh, independent copy of this stream's captured frames so far,
    /// for a request task to thread into its `h2_frames` snapshot.
    pub fn frames_snapshot(&self) -> Vec<H2Frame> {
        self.captured_frames
            .lock()
            .expect("stream frame lock poisoned")
            .clone()
    }

    /// Forwards a DATA payload chunk to the stream's consumer task,
    /// dropping it silently if the channel is saturated (spec §4.4,
    /// §9 "Body channel capacity").
    pub fn push_body_chunk(&mut self, chunk: Bytes) {
        if let Some(tx) = &self.body_tx {
            let _ = tx.try_send(chunk);
        }
    }

    /// Closes the body channel exactly once, per the `Stream` invariant
    /// in spec §3.
    pub fn close_body(&mut self) {
        if !self.body_closed {
            self.body_tx = None;
            self.body_closed = true;
        }
    }

    pub fn on_end_stream_received(&mut self) {
        self.close_body();
        self.state = match self.state {
            StreamState::Open => StreamState::HalfClosedRemote,
            StreamState::HalfClosedLocal => StreamState::Closed,
            other => other,
        };
    }

    pub fn on_end_stream_sent(&mut self) {
        self.state = match self.state {
            StreamState::Open => StreamState::HalfClosedLocal,
            StreamState::HalfClosedRemote => StreamState::Closed,
            other => other,
        };
    }

    pub fn reset(&mut self) {
        self.close_body();
        self.state = StreamState::Closed;
    }

    pub fn is_closed(&self) -> bool {
        self.state == StreamState::Closed
    }
}
