//! Transport over any `std::io::Read`
//!
//! Used to replay captured serial traffic from a file, and by tests.

use std::io::{self, Read};

use crate::error::TransportError;
use crate::Transport;

/// Byte source backed by a reader; end of input reads as a closed link
pub struct ReaderTransport<R> {
    reader: Option<R>,
}

impl<R: Read> ReaderTransport<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: Read> Transport for ReaderTransport<R> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let reader = self.reader.as_mut().ok_or(TransportError::Closed)?;
        reader.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => TransportError::Closed,
            _ => TransportError::Io(e),
        })
    }

    fn close(&mut self) -> Result<(), TransportError> {
        self.reader = None;
        Ok(())
    }
}
