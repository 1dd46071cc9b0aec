//! Virtual input device using evdev/uinput
//!
//! Creates a virtual device that appears to the system as a mouse/keyboard
//! combo carrying exactly the capabilities in the button table.

use evdev::{
    uinput::{VirtualDevice, VirtualDeviceBuilder},
    AttributeSet, EventType, InputEvent, Key, RelativeAxisType,
};
use thiserror::Error;
use tracing::info;

use crate::capability::Capability;
use crate::table::ButtonTable;

/// Errors from virtual device operations
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to create virtual device: {0}")]
    CreateDevice(#[source] std::io::Error),
    #[error("Failed to emit {capability}: {source}")]
    EmitEvent {
        capability: Capability,
        #[source]
        source: std::io::Error,
    },
}

/// Anything input events can be emitted on
pub trait InputSink {
    /// Emit one event and make it visible to readers immediately
    fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError>;
}

impl<S: InputSink + ?Sized> InputSink for &mut S {
    fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError> {
        (**self).emit(capability, value)
    }
}

impl<S: InputSink + ?Sized> InputSink for Box<S> {
    fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError> {
        (**self).emit(capability, value)
    }
}

/// uinput-backed virtual device
pub struct VirtualInputDevice {
    device: VirtualDevice,
}

impl VirtualInputDevice {
    /// Create the device with every capability in `table`.
    ///
    /// uinput fixes the capability set at creation, so this must happen
    /// before the first emission.
    pub fn new(name: &str, table: &ButtonTable) -> Result<Self, DeviceError> {
        let mut keys = AttributeSet::<Key>::new();
        let mut axes = AttributeSet::<RelativeAxisType>::new();
        for capability in table.capabilities() {
            match capability {
                Capability::Relative(axis) => axes.insert(axis),
                Capability::Button(key) | Capability::Key(key) => keys.insert(key),
            }
        }

        let mut builder = VirtualDeviceBuilder::new()
            .map_err(DeviceError::CreateDevice)?
            .name(name);

        if keys.iter().next().is_some() {
            builder = builder
                .with_keys(&keys)
                .map_err(DeviceError::CreateDevice)?;
        }
        if axes.iter().next().is_some() {
            builder = builder
                .with_relative_axes(&axes)
                .map_err(DeviceError::CreateDevice)?;
        }

        let device = builder.build().map_err(DeviceError::CreateDevice)?;

        Ok(Self { device })
    }

    /// Get the device path (e.g., /dev/input/eventX)
    pub fn device_path(&mut self) -> Option<std::path::PathBuf> {
        self.device
            .enumerate_dev_nodes_blocking()
            .ok()?
            .next()?
            .ok()
    }
}

impl InputSink for VirtualInputDevice {
    fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError> {
        let event = match capability {
            Capability::Relative(axis) => InputEvent::new(EventType::RELATIVE, axis.0, value),
            Capability::Button(key) | Capability::Key(key) => {
                InputEvent::new(EventType::KEY, key.code(), value)
            }
        };

        // evdev appends the SYN_REPORT
        self.device
            .emit(&[event])
            .map_err(|source| DeviceError::EmitEvent { capability, source })
    }
}

/// Sink for `--dry-run`: logs emissions instead of touching uinput
#[derive(Debug, Default)]
pub struct LogSink {
    emitted: u64,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}

impl InputSink for LogSink {
    fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError> {
        self.emitted += 1;
        info!("emit {} = {}", capability, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_sink_counts() {
        let mut sink = LogSink::new();
        sink.emit(Capability::Key(Key::KEY_Q), 1).unwrap();
        sink.emit(Capability::Key(Key::KEY_Q), 0).unwrap();
        assert_eq!(sink.emitted(), 2);
    }

    #[test]
    #[ignore] // Requires uinput access (run with: cargo test -- --ignored)
    fn test_create_device() {
        let table = ButtonTable::default();
        let mut device = VirtualInputDevice::new("Test Serial Input", &table).unwrap();
        device
            .emit(Capability::Relative(RelativeAxisType::REL_X), 5)
            .unwrap();
    }
}
