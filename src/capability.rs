//! Capabilities the virtual device can emit
//!
//! Config files refer to capabilities by their kernel event-code names
//! (`REL_X`, `BTN_LEFT`, `KEY_Q`, see `linux/input-event-codes.h`). Only the
//! names listed here are accepted.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use evdev::{EventType, Key, RelativeAxisType};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An emit-able axis, button or key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Relative axis motion (pointer movement, wheel)
    Relative(RelativeAxisType),
    /// Momentary mouse or gamepad button
    Button(Key),
    /// Keyboard key
    Key(Key),
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown capability name: \"{0}\"")]
pub struct UnknownCapability(pub String);

const RELATIVE_AXES: &[(&str, RelativeAxisType)] = &[
    ("REL_X", RelativeAxisType::REL_X),
    ("REL_Y", RelativeAxisType::REL_Y),
    ("REL_Z", RelativeAxisType::REL_Z),
    ("REL_RX", RelativeAxisType::REL_RX),
    ("REL_RY", RelativeAxisType::REL_RY),
    ("REL_RZ", RelativeAxisType::REL_RZ),
    ("REL_HWHEEL", RelativeAxisType::REL_HWHEEL),
    ("REL_DIAL", RelativeAxisType::REL_DIAL),
    ("REL_WHEEL", RelativeAxisType::REL_WHEEL),
    ("REL_MISC", RelativeAxisType::REL_MISC),
];

const BUTTONS: &[(&str, Key)] = &[
    ("BTN_LEFT", Key::BTN_LEFT),
    ("BTN_RIGHT", Key::BTN_RIGHT),
    ("BTN_MIDDLE", Key::BTN_MIDDLE),
    ("BTN_SIDE", Key::BTN_SIDE),
    ("BTN_EXTRA", Key::BTN_EXTRA),
    ("BTN_FORWARD", Key::BTN_FORWARD),
    ("BTN_BACK", Key::BTN_BACK),
    ("BTN_SOUTH", Key::BTN_SOUTH),
    ("BTN_EAST", Key::BTN_EAST),
    ("BTN_NORTH", Key::BTN_NORTH),
    ("BTN_WEST", Key::BTN_WEST),
    ("BTN_TL", Key::BTN_TL),
    ("BTN_TR", Key::BTN_TR),
    ("BTN_SELECT", Key::BTN_SELECT),
    ("BTN_START", Key::BTN_START),
    ("BTN_MODE", Key::BTN_MODE),
    ("BTN_THUMBL", Key::BTN_THUMBL),
    ("BTN_THUMBR", Key::BTN_THUMBR),
];

const KEYS: &[(&str, Key)] = &[
    ("KEY_ESC", Key::KEY_ESC),
    ("KEY_1", Key::KEY_1),
    ("KEY_2", Key::KEY_2),
    ("KEY_3", Key::KEY_3),
    ("KEY_4", Key::KEY_4),
    ("KEY_5", Key::KEY_5),
    ("KEY_6", Key::KEY_6),
    ("KEY_7", Key::KEY_7),
    ("KEY_8", Key::KEY_8),
    ("KEY_9", Key::KEY_9),
    ("KEY_0", Key::KEY_0),
    ("KEY_BACKSPACE", Key::KEY_BACKSPACE),
    ("KEY_TAB", Key::KEY_TAB),
    ("KEY_Q", Key::KEY_Q),
    ("KEY_W", Key::KEY_W),
    ("KEY_E", Key::KEY_E),
    ("KEY_R", Key::KEY_R),
    ("KEY_T", Key::KEY_T),
    ("KEY_Y", Key::KEY_Y),
    ("KEY_U", Key::KEY_U),
    ("KEY_I", Key::KEY_I),
    ("KEY_O", Key::KEY_O),
    ("KEY_P", Key::KEY_P),
    ("KEY_ENTER", Key::KEY_ENTER),
    ("KEY_LEFTCTRL", Key::KEY_LEFTCTRL),
    ("KEY_A", Key::KEY_A),
    ("KEY_S", Key::KEY_S),
    ("KEY_D", Key::KEY_D),
    ("KEY_F", Key::KEY_F),
    ("KEY_G", Key::KEY_G),
    ("KEY_H", Key::KEY_H),
    ("KEY_J", Key::KEY_J),
    ("KEY_K", Key::KEY_K),
    ("KEY_L", Key::KEY_L),
    ("KEY_LEFTSHIFT", Key::KEY_LEFTSHIFT),
    ("KEY_Z", Key::KEY_Z),
    ("KEY_X", Key::KEY_X),
    ("KEY_C", Key::KEY_C),
    ("KEY_V", Key::KEY_V),
    ("KEY_B", Key::KEY_B),
    ("KEY_N", Key::KEY_N),
    ("KEY_M", Key::KEY_M),
    ("KEY_LEFTALT", Key::KEY_LEFTALT),
    ("KEY_SPACE", Key::KEY_SPACE),
    ("KEY_F1", Key::KEY_F1),
    ("KEY_F2", Key::KEY_F2),
    ("KEY_F3", Key::KEY_F3),
    ("KEY_F4", Key::KEY_F4),
    ("KEY_F5", Key::KEY_F5),
    ("KEY_F6", Key::KEY_F6),
    ("KEY_F7", Key::KEY_F7),
    ("KEY_F8", Key::KEY_F8),
    ("KEY_F9", Key::KEY_F9),
    ("KEY_F10", Key::KEY_F10),
    ("KEY_F11", Key::KEY_F11),
    ("KEY_F12", Key::KEY_F12),
    ("KEY_UP", Key::KEY_UP),
    ("KEY_LEFT", Key::KEY_LEFT),
    ("KEY_RIGHT", Key::KEY_RIGHT),
    ("KEY_DOWN", Key::KEY_DOWN),
];

impl Capability {
    /// Event type and code written to the device. `Button` and `Key` share
    /// the `EV_KEY` space, so `Button(KEY_Q)` and `Key(KEY_Q)` are the same
    /// device capability.
    pub fn event_code(&self) -> (EventType, u16) {
        match self {
            Capability::Relative(axis) => (EventType::RELATIVE, axis.0),
            Capability::Button(key) | Capability::Key(key) => (EventType::KEY, key.code()),
        }
    }

    /// Look up a capability by its event-code name
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(&(_, axis)) = RELATIVE_AXES.iter().find(|(n, _)| *n == name) {
            return Some(Capability::Relative(axis));
        }
        if let Some(&(_, key)) = BUTTONS.iter().find(|(n, _)| *n == name) {
            return Some(Capability::Button(key));
        }
        KEYS.iter()
            .find(|(n, _)| *n == name)
            .map(|&(_, key)| Capability::Key(key))
    }

    /// Event-code name, if this capability is one of the named ones
    pub fn name(&self) -> Option<&'static str> {
        match self {
            Capability::Relative(axis) => RELATIVE_AXES
                .iter()
                .find(|(_, a)| a == axis)
                .map(|(n, _)| *n),
            Capability::Button(key) => BUTTONS.iter().find(|(_, k)| k == key).map(|(n, _)| *n),
            Capability::Key(key) => KEYS.iter().find(|(_, k)| k == key).map(|(n, _)| *n),
        }
    }

    /// Every capability accepted by [`Capability::from_name`]
    pub fn all_names() -> impl Iterator<Item = &'static str> {
        RELATIVE_AXES
            .iter()
            .map(|(n, _)| *n)
            .chain(BUTTONS.iter().map(|(n, _)| *n))
            .chain(KEYS.iter().map(|(n, _)| *n))
    }
}

// evdev's RelativeAxisType has no Hash impl
impl Hash for Capability {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let (event_type, code) = self.event_code();
        event_type.0.hash(state);
        code.hash(state);
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => match self {
                Capability::Relative(axis) => write!(f, "REL(0x{:02x})", axis.0),
                Capability::Button(key) | Capability::Key(key) => {
                    write!(f, "KEY(0x{:03x})", key.code())
                }
            },
        }
    }
}

impl FromStr for Capability {
    type Err = UnknownCapability;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::from_name(s).ok_or_else(|| UnknownCapability(s.to_string()))
    }
}

// Serialized as the bare event-code name, e.g. `capability = "KEY_Q"`

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self.name() {
            Some(name) => s.serialize_str(name),
            None => Err(serde::ser::Error::custom(format!(
                "capability {self} has no name"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for Capability {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let name = String::deserialize(d)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}
