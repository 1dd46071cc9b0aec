//! Serial Input Bridge
//!
//! Reads compact button events from a serial link and replays them on a
//! Linux virtual input device, as relative axis motion or key taps.

pub mod bridge;
pub mod capability;
pub mod config;
pub mod device;
pub mod dispatch;
pub mod table;

pub use bridge::{Bridge, BridgeError, BridgeStats};
pub use capability::{Capability, UnknownCapability};
pub use config::{BridgeConfig, ButtonConfig, SerialConfig};
pub use device::{DeviceError, InputSink, LogSink, VirtualInputDevice};
pub use dispatch::{Dispatch, Dispatcher};
pub use table::{ButtonEntry, ButtonKind, ButtonTable, OutOfRangeIndex, TableError};
