//! Serial port backend

use std::io::{self, Read};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use crate::error::TransportError;
use crate::Transport;

/// Port parameters, fixed for the lifetime of the link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialSettings {
    /// Device path (`/dev/rfcomm0`, `/dev/ttyACM0`) or port name (`COM5`)
    pub port: String,
    pub baud_rate: u32,
    /// How often a blocked read wakes up to check for an interrupt request
    pub poll_interval: Duration,
}

/// Blocking serial link.
///
/// The port is opened with `poll_interval` as its read timeout, but timeouts
/// never reach the caller: the read simply resumes, so a read waits
/// indefinitely for data. The only way out of a blocked read is a failure on
/// the port or the shared `running` flag being cleared.
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    name: String,
    running: Arc<AtomicBool>,
}

impl SerialTransport {
    pub fn open(
        settings: &SerialSettings,
        running: Arc<AtomicBool>,
    ) -> Result<Self, TransportError> {
        let port = serialport::new(settings.port.as_str(), settings.baud_rate)
            .timeout(settings.poll_interval)
            .open()
            .map_err(|source| TransportError::Open {
                port: settings.port.clone(),
                source,
            })?;

        info!(
            "Opened serial port {} at {} baud",
            settings.port, settings.baud_rate
        );

        Ok(Self {
            port: Some(port),
            name: settings.port.clone(),
            running,
        })
    }
}

impl Transport for SerialTransport {
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), TransportError> {
        let port = self.port.as_mut().ok_or(TransportError::Closed)?;

        let mut filled = 0;
        while filled < buf.len() {
            match port.read(&mut buf[filled..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => filled += n,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
                    ) =>
                {
                    if !self.running.load(Ordering::SeqCst) {
                        return Err(TransportError::Interrupted);
                    }
                }
                Err(e) => return Err(TransportError::Io(e)),
            }
        }

        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        if let Some(port) = self.port.take() {
            drop(port);
            info!("Closed serial port {}", self.name);
        } else {
            debug!("Serial port {} already closed", self.name);
        }
        Ok(())
    }
}

/// Names of the serial ports present on this machine
pub fn list_ports() -> Result<Vec<String>, TransportError> {
    let ports = serialport::available_ports().map_err(TransportError::Enumerate)?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}
