//! Configuration for the serial input bridge
//!
//! Supports TOML serialization for persistent config storage. Buttons are
//! listed in wire-index order and refer to capabilities by event-code name:
//!
//! ```toml
//! [[buttons]]
//! capability = "REL_X"
//!
//! [[buttons]]
//! capability = "BTN_LEFT"
//! kind = "Continuous"   # optional; inferred from the capability otherwise
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serial_input_transport::SerialSettings;

use crate::capability::Capability;
use crate::table::{ButtonEntry, ButtonKind, ButtonTable, TableError};

/// Serial link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path or port name
    #[serde(default = "default_port")]
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
    /// How often a blocked read checks for Ctrl+C, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

// Bluetooth SPP link (HC-06 bound to rfcomm0). A USB link is typically
// /dev/ttyACM0 at 115200.
fn default_port() -> String {
    "/dev/rfcomm0".to_string()
}
fn default_baud_rate() -> u32 {
    9600
}
fn default_poll_interval() -> u64 {
    100
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            baud_rate: default_baud_rate(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl SerialConfig {
    pub fn settings(&self) -> SerialSettings {
        SerialSettings {
            port: self.port.clone(),
            baud_rate: self.baud_rate,
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }
}

/// One button table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonConfig {
    pub capability: Capability,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ButtonKind>,
}

impl ButtonConfig {
    pub fn entry(&self) -> ButtonEntry {
        ButtonEntry {
            capability: self.capability,
            kind: self
                .kind
                .unwrap_or_else(|| ButtonKind::default_for(self.capability)),
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Name for the virtual input device
    #[serde(default = "default_device_name")]
    pub device_name: String,
    #[serde(default)]
    pub serial: SerialConfig,
    /// Button table, in wire-index order
    #[serde(default = "default_buttons")]
    pub buttons: Vec<ButtonConfig>,
}

fn default_device_name() -> String {
    "Serial Input Bridge".to_string()
}

fn default_buttons() -> Vec<ButtonConfig> {
    ButtonTable::default()
        .entries()
        .iter()
        .map(|e| ButtonConfig {
            capability: e.capability,
            kind: None,
        })
        .collect()
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            serial: SerialConfig::default(),
            buttons: default_buttons(),
        }
    }
}

impl BridgeConfig {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("serial-input-bridge")
            .join("bridge.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: BridgeConfig = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to a file
    pub fn save(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build and validate the button table
    pub fn button_table(&self) -> Result<ButtonTable, TableError> {
        ButtonTable::new(self.buttons.iter().map(ButtonConfig::entry).collect())
    }
}
