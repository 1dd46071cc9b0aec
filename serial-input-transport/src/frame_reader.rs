//! Frame extraction from a raw byte stream
//!
//! The reader hunts for the sync marker one byte at a time, discarding
//! everything before it, then takes the next [`FRAME_LEN`] bytes as the
//! payload. It never re-synchronizes inside a payload: a `0xFF` among those
//! three bytes is payload, not a new frame start.

use tracing::trace;

use crate::error::TransportError;
use crate::wire::{Frame, FRAME_LEN, SYNC_MARKER};
use crate::Transport;

pub struct FrameReader<T> {
    transport: T,
    frames_read: u64,
    bytes_discarded: u64,
}

impl<T: Transport> FrameReader<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            frames_read: 0,
            bytes_discarded: 0,
        }
    }

    /// Block until the next sync marker, then read the frame after it.
    ///
    /// Any transport failure, whether during the hunt or mid-payload, is
    /// returned as-is; nothing is retried at this layer.
    pub fn next_frame(&mut self) -> Result<Frame, TransportError> {
        self.wait_for_sync()?;

        let mut payload = [0u8; FRAME_LEN];
        self.transport.read_exact(&mut payload)?;
        self.frames_read += 1;

        Ok(Frame::from_bytes(payload))
    }

    /// Lazy, endless sequence of frames. Each item advances the stream.
    pub fn frames(&mut self) -> impl Iterator<Item = Result<Frame, TransportError>> + '_ {
        std::iter::from_fn(move || Some(self.next_frame()))
    }

    fn wait_for_sync(&mut self) -> Result<(), TransportError> {
        trace!("Waiting for sync marker");
        let mut byte = [0u8; 1];
        loop {
            self.transport.read_exact(&mut byte)?;
            if byte[0] == SYNC_MARKER {
                return Ok(());
            }
            self.bytes_discarded += 1;
            trace!("Discarded byte 0x{:02X} before sync", byte[0]);
        }
    }

    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    pub fn bytes_discarded(&self) -> u64 {
        self.bytes_discarded
    }

    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_inner(self) -> T {
        self.transport
    }
}
