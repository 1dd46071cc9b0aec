//! Button table: wire index to capability
//!
//! The position of an entry in the table is the button index carried on the
//! wire. The table is built once at startup and is also the full capability
//! set the virtual device is created with.

use std::collections::HashMap;

use evdev::{Key, RelativeAxisType};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capability::Capability;

/// Largest table the one-byte wire index can address
pub const MAX_BUTTONS: usize = 256;

/// How a button's value is turned into emissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonKind {
    /// Emit the raw value once (axis motion, momentary button state)
    Continuous,
    /// Emit the value as a press, then 0 as the release
    Discrete,
}

impl ButtonKind {
    /// Kind used when the config does not name one: relative axes report
    /// motion, buttons and keys are tapped
    pub fn default_for(capability: Capability) -> Self {
        match capability {
            Capability::Relative(_) => ButtonKind::Continuous,
            Capability::Button(_) | Capability::Key(_) => ButtonKind::Discrete,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEntry {
    pub capability: Capability,
    pub kind: ButtonKind,
}

impl ButtonEntry {
    pub const fn continuous(capability: Capability) -> Self {
        Self {
            capability,
            kind: ButtonKind::Continuous,
        }
    }

    pub const fn discrete(capability: Capability) -> Self {
        Self {
            capability,
            kind: ButtonKind::Discrete,
        }
    }
}

/// Reasons a table is rejected at startup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("Button table is empty")]
    Empty,
    #[error("Capability {capability} is assigned to both button {first} and button {second}")]
    Duplicate {
        capability: Capability,
        first: usize,
        second: usize,
    },
    #[error("Button table has {0} entries, but button indices only go up to 255")]
    TooLarge(usize),
}

/// A decoded button index with no table entry
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("Button index {index} is out of range (table has {len} entries)")]
pub struct OutOfRangeIndex {
    pub index: u8,
    pub len: usize,
}

/// Validated, non-empty mapping from button index to capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonTable {
    entries: Vec<ButtonEntry>,
}

impl ButtonTable {
    pub fn new(entries: Vec<ButtonEntry>) -> Result<Self, TableError> {
        if entries.is_empty() {
            return Err(TableError::Empty);
        }
        if entries.len() > MAX_BUTTONS {
            return Err(TableError::TooLarge(entries.len()));
        }

        // Keyed by what reaches the device, not by family
        let mut seen: HashMap<(u16, u16), usize> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            let (event_type, code) = entry.capability.event_code();
            if let Some(&first) = seen.get(&(event_type.0, code)) {
                return Err(TableError::Duplicate {
                    capability: entry.capability,
                    first,
                    second: index,
                });
            }
            seen.insert((event_type.0, code), index);
        }

        Ok(Self { entries })
    }

    /// Entry for a wire index
    pub fn get(&self, index: u8) -> Result<&ButtonEntry, OutOfRangeIndex> {
        self.entries.get(usize::from(index)).ok_or(OutOfRangeIndex {
            index,
            len: self.entries.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// A validated table is never empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ButtonEntry] {
        &self.entries
    }

    /// Capabilities in index order
    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.entries.iter().map(|e| e.capability)
    }
}

impl Default for ButtonTable {
    /// The controller's stock layout: pointer axes and wheel first, then the
    /// left mouse button and the game keys
    fn default() -> Self {
        Self {
            entries: vec![
                ButtonEntry::continuous(Capability::Relative(RelativeAxisType::REL_X)),
                ButtonEntry::continuous(Capability::Relative(RelativeAxisType::REL_Y)),
                ButtonEntry::continuous(Capability::Relative(RelativeAxisType::REL_WHEEL)),
                ButtonEntry::discrete(Capability::Button(Key::BTN_LEFT)),
                ButtonEntry::discrete(Capability::Key(Key::KEY_E)),
                ButtonEntry::discrete(Capability::Key(Key::KEY_C)),
                ButtonEntry::discrete(Capability::Key(Key::KEY_2)),
                ButtonEntry::discrete(Capability::Key(Key::KEY_3)),
                ButtonEntry::discrete(Capability::Key(Key::KEY_Q)),
            ],
        }
    }
}
