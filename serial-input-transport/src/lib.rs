//! Serial link layer for the serial input bridge
//!
//! Turns an unstructured byte stream into decoded button events:
//!
//! - [`wire`]: packet layout (sync marker + 3-byte frame) and decoding
//! - [`FrameReader`]: sync hunting and frame extraction over any [`Transport`]
//! - [`TransportGuard`]: closes the link exactly once on every exit path
//! - Backends: [`SerialTransport`] (serial port) and [`ReaderTransport`]
//!   (any `std::io::Read`, used for replaying captures)

pub mod error;
pub mod frame_reader;
pub mod guard;
pub mod wire;

mod reader;
mod serial;

pub use error::TransportError;
pub use frame_reader::FrameReader;
pub use guard::TransportGuard;
pub use reader::ReaderTransport;
pub use serial::{list_ports, SerialSettings, SerialTransport};
pub use wire::{ButtonEvent, Frame, FRAME_LEN, PACKET_LEN, SYNC_MARKER};

/// Byte source the frame reader pulls from
///
/// Reads block until the requested bytes arrive or the link fails. Backends
/// that need a bounded or cancellable read implement that here, below the
/// frame reader, so decoding and dispatch stay unaware of it.
pub trait Transport {
    /// Fill `buf` completely, blocking as long as necessary
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError>;

    /// Release the underlying link
    fn close(&mut self) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        (**self).read_exact(buf)
    }

    fn close(&mut self) -> Result<(), TransportError> {
        (**self).close()
    }
}
