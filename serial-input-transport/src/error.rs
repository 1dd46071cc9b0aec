//! Transport error types

use thiserror::Error;

/// Errors that can occur while reading from the serial link
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to open serial port {port}: {source}")]
    Open {
        port: String,
        #[source]
        source: serialport::Error,
    },

    #[error("Failed to enumerate serial ports: {0}")]
    Enumerate(#[source] serialport::Error),

    #[error("Serial link closed")]
    Closed,

    #[error("I/O error on serial link: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interrupted while waiting for data")]
    Interrupted,
}

impl TransportError {
    /// True if the read was abandoned because termination was requested
    pub fn is_interrupt(&self) -> bool {
        matches!(self, TransportError::Interrupted)
    }
}
