//! Routing decoded events to the virtual device
//!
//! Resolves the button index against the table and picks the emission
//! pattern for the button's kind:
//!
//! - Continuous: one emission carrying the raw value
//! - Discrete: the raw value as a press, then 0 as the release, so a key is
//!   never left held after dispatch returns
//! - Unknown index: nothing is emitted and the event is dropped

use serial_input_transport::ButtonEvent;
use tracing::debug;

use crate::device::{DeviceError, InputSink};
use crate::table::{ButtonKind, ButtonTable, OutOfRangeIndex};

/// What a dispatch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continuous,
    Tapped,
    Dropped(OutOfRangeIndex),
}

impl Dispatch {
    /// Number of events written to the device
    pub fn emissions(&self) -> u64 {
        match self {
            Dispatch::Continuous => 1,
            Dispatch::Tapped => 2,
            Dispatch::Dropped(_) => 0,
        }
    }
}

/// Borrows the button table and the device for the lifetime of the loop
pub struct Dispatcher<'a, D: InputSink + ?Sized> {
    table: &'a ButtonTable,
    device: &'a mut D,
}

impl<'a, D: InputSink + ?Sized> Dispatcher<'a, D> {
    pub fn new(table: &'a ButtonTable, device: &'a mut D) -> Self {
        Self { table, device }
    }

    /// Emit the event. All emissions have completed when this returns.
    ///
    /// Out-of-range indices are not an error. A failed emission is, and is
    /// returned immediately.
    pub fn dispatch(&mut self, event: ButtonEvent) -> Result<Dispatch, DeviceError> {
        let entry = match self.table.get(event.index) {
            Ok(entry) => *entry,
            Err(out_of_range) => {
                debug!("Dropping event: {}", out_of_range);
                return Ok(Dispatch::Dropped(out_of_range));
            }
        };

        let value = i32::from(event.value);
        match entry.kind {
            ButtonKind::Continuous => {
                self.device.emit(entry.capability, value)?;
                Ok(Dispatch::Continuous)
            }
            ButtonKind::Discrete => {
                self.device.emit(entry.capability, value)?;
                self.device.emit(entry.capability, 0)?;
                Ok(Dispatch::Tapped)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::table::ButtonEntry;
    use evdev::{Key, RelativeAxisType};

    const AXIS_X: Capability = Capability::Relative(RelativeAxisType::REL_X);
    const KEY_Q: Capability = Capability::Key(Key::KEY_Q);

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<(Capability, i32)>,
    }

    impl InputSink for RecordingSink {
        fn emit(&mut self, capability: Capability, value: i32) -> Result<(), DeviceError> {
            self.events.push((capability, value));
            Ok(())
        }
    }

    fn table() -> ButtonTable {
        ButtonTable::new(vec![
            ButtonEntry::continuous(AXIS_X),
            ButtonEntry::discrete(KEY_Q),
        ])
        .unwrap()
    }

    #[test]
    fn test_continuous_passes_value_through() {
        let table = table();
        let mut sink = RecordingSink::default();
        let outcome = Dispatcher::new(&table, &mut sink)
            .dispatch(ButtonEvent::new(0, 10))
            .unwrap();
        assert_eq!(outcome, Dispatch::Continuous);
        assert_eq!(sink.events, [(AXIS_X, 10)]);
    }

    #[test]
    fn test_continuous_negative() {
        let table = table();
        let mut sink = RecordingSink::default();
        Dispatcher::new(&table, &mut sink)
            .dispatch(ButtonEvent::new(0, -1))
            .unwrap();
        assert_eq!(sink.events, [(AXIS_X, -1)]);
    }

    #[test]
    fn test_discrete_press_then_release() {
        let table = table();
        let mut sink = RecordingSink::default();
        let outcome = Dispatcher::new(&table, &mut sink)
            .dispatch(ButtonEvent::new(1, 1))
            .unwrap();
        assert_eq!(outcome, Dispatch::Tapped);
        assert_eq!(sink.events, [(KEY_Q, 1), (KEY_Q, 0)]);
    }

    #[test]
    fn test_discrete_always_releases() {
        let table = table();
        let mut sink = RecordingSink::default();
        let mut dispatcher = Dispatcher::new(&table, &mut sink);
        dispatcher.dispatch(ButtonEvent::new(1, 0)).unwrap();
        dispatcher.dispatch(ButtonEvent::new(1, -5)).unwrap();
        assert_eq!(
            sink.events,
            [(KEY_Q, 0), (KEY_Q, 0), (KEY_Q, -5), (KEY_Q, 0)]
        );
    }

    #[test]
    fn test_out_of_range_dropped() {
        let table = table();
        let mut sink = RecordingSink::default();
        let outcome = Dispatcher::new(&table, &mut sink)
            .dispatch(ButtonEvent::new(2, 1))
            .unwrap();
        assert_eq!(
            outcome,
            Dispatch::Dropped(OutOfRangeIndex { index: 2, len: 2 })
        );
        assert_eq!(outcome.emissions(), 0);
        assert!(sink.events.is_empty());
    }

    #[test]
    fn test_emit_failure_propagates() {
        struct FailingSink;
        impl InputSink for FailingSink {
            fn emit(&mut self, capability: Capability, _value: i32) -> Result<(), DeviceError> {
                Err(DeviceError::EmitEvent {
                    capability,
                    source: std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone"),
                })
            }
        }

        let table = table();
        let mut sink = FailingSink;
        let result = Dispatcher::new(&table, &mut sink).dispatch(ButtonEvent::new(1, 1));
        assert!(matches!(result, Err(DeviceError::EmitEvent { .. })));
    }
}
