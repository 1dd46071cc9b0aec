//! The read loop: wait for sync, read a frame, decode, dispatch.
//!
//! Single-threaded and blocking. The transport read is the only place the
//! loop waits; it ends when the link fails, the device fails, or an
//! interrupt is requested. The transport is owned through a
//! [`TransportGuard`], so it is closed exactly once however the loop ends.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serial_input_transport::{FrameReader, Transport, TransportError, TransportGuard};
use thiserror::Error;
use tracing::{debug, warn};

use crate::device::{DeviceError, InputSink};
use crate::dispatch::{Dispatch, Dispatcher};
use crate::table::ButtonTable;

/// Why the loop stopped
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Serial link failed: {0}")]
    Transport(#[source] TransportError),
    #[error("Virtual device failed: {0}")]
    Device(#[from] DeviceError),
    #[error("Interrupted by user")]
    InterruptRequested,
}

impl From<TransportError> for BridgeError {
    fn from(e: TransportError) -> Self {
        if e.is_interrupt() {
            BridgeError::InterruptRequested
        } else {
            BridgeError::Transport(e)
        }
    }
}

/// Counters reported at shutdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub frames: u64,
    pub dropped: u64,
    pub emissions: u64,
    pub discarded_bytes: u64,
}

pub struct Bridge<'a, T: Transport, D: InputSink + ?Sized> {
    reader: FrameReader<TransportGuard<T>>,
    dispatcher: Dispatcher<'a, D>,
    running: Arc<AtomicBool>,
    stats: BridgeStats,
}

impl<'a, T: Transport, D: InputSink + ?Sized> Bridge<'a, T, D> {
    /// Take ownership of `transport`; `running` is cleared to request a stop
    pub fn new(
        transport: T,
        table: &'a ButtonTable,
        device: &'a mut D,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            reader: FrameReader::new(TransportGuard::new(transport)),
            dispatcher: Dispatcher::new(table, device),
            running,
            stats: BridgeStats::default(),
        }
    }

    /// Run until something stops the loop. Only ever returns an error;
    /// [`BridgeError::InterruptRequested`] is the clean way out.
    pub fn run(&mut self) -> Result<Infallible, BridgeError> {
        loop {
            self.step()?;
        }
    }

    /// Read and dispatch exactly one frame
    pub fn step(&mut self) -> Result<Dispatch, BridgeError> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(BridgeError::InterruptRequested);
        }

        let frame = self.reader.next_frame();
        self.stats.discarded_bytes = self.reader.bytes_discarded();
        let frame = frame?;

        let event = frame.decode();
        debug!(
            "Received frame {:02X?}: button {}, value {}",
            frame.as_bytes(),
            event.index,
            event.value
        );

        let outcome = self.dispatcher.dispatch(event)?;
        self.stats.frames += 1;
        self.stats.emissions += outcome.emissions();
        if let Dispatch::Dropped(_) = outcome {
            self.stats.dropped += 1;
        }

        Ok(outcome)
    }

    /// Run until the loop stops, pass the reason to `report`, then close the
    /// transport. The reason is always reported while the link is still open.
    pub fn run_and_close<F>(&mut self, report: F) -> BridgeError
    where
        F: FnOnce(&BridgeError),
    {
        let reason = match self.run() {
            Ok(never) => match never {},
            Err(e) => e,
        };
        report(&reason);
        if let Err(e) = self.close() {
            warn!("Failed to close serial link: {}", e);
        }
        reason
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    /// Close the transport now rather than on drop, surfacing any error
    pub fn close(&mut self) -> Result<(), TransportError> {
        self.reader.get_mut().close()
    }

    pub fn is_closed(&self) -> bool {
        self.reader.get_ref().is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::device::LogSink;
    use serial_input_transport::ReaderTransport;

    #[test]
    fn test_stop_requested_before_first_read() {
        let table = ButtonTable::default();
        let mut sink = LogSink::new();
        let running = Arc::new(AtomicBool::new(false));
        let mut bridge = Bridge::new(
            ReaderTransport::new(&[0xFF, 0x00, 0x01, 0x00][..]),
            &table,
            &mut sink,
            running,
        );

        assert!(matches!(bridge.run(), Err(BridgeError::InterruptRequested)));
        assert_eq!(bridge.stats().frames, 0);
    }

    #[test]
    fn test_stats_count_dropped_and_discarded() {
        let table = ButtonTable::default();
        let mut sink = LogSink::new();
        let bytes = [0x00, 0xFF, 0x04, 0x01, 0x00, 0xFF, 0x40, 0x01, 0x00];
        let mut bridge = Bridge::new(
            ReaderTransport::new(&bytes[..]),
            &table,
            &mut sink,
            Arc::new(AtomicBool::new(true)),
        );

        let err = bridge.run().unwrap_err();
        assert!(matches!(err, BridgeError::Transport(TransportError::Closed)));
        assert_eq!(
            bridge.stats(),
            BridgeStats {
                frames: 2,
                dropped: 1,
                emissions: 2,
                discarded_bytes: 1,
            }
        );
        drop(bridge);
        assert_eq!(sink.emitted(), 2);
    }

    #[test]
    fn test_interrupt_from_transport() {
        struct Interrupted;
        impl Transport for Interrupted {
            fn read_exact(&mut self, _buf: &mut [u8]) -> Result<(), TransportError> {
                Err(TransportError::Interrupted)
            }
            fn close(&mut self) -> Result<(), TransportError> {
                Ok(())
            }
        }

        let table = ButtonTable::new(vec![crate::table::ButtonEntry::discrete(
            Capability::from_name("KEY_Q").unwrap(),
        )])
        .unwrap();
        let mut sink = LogSink::new();
        let mut bridge = Bridge::new(
            Interrupted,
            &table,
            &mut sink,
            Arc::new(AtomicBool::new(true)),
        );
        assert!(matches!(bridge.step(), Err(BridgeError::InterruptRequested)));
    }
}
