//! Wire format
//!
//! Every event travels as a 4-byte packet:
//!
//! ```text
//! [0xFF] [button_index: u8] [value_lo] [value_hi]
//! ```
//!
//! The value is a little-endian, two's-complement `i16`. There is no checksum,
//! length field or escaping: `0xFF` may legitimately appear inside the payload
//! (e.g. a value of -1), and the reader does not try to detect that.

/// Byte that marks the start of a frame
pub const SYNC_MARKER: u8 = 0xFF;

/// Payload length following the sync marker
pub const FRAME_LEN: usize = 3;

/// Sync marker plus payload
pub const PACKET_LEN: usize = FRAME_LEN + 1;

/// The 3-byte payload following a sync marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; FRAME_LEN]);

impl Frame {
    pub const fn from_bytes(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.0
    }

    /// Split the payload into button index and signed value.
    ///
    /// Total over every possible payload; the index is not checked against
    /// any button table here.
    pub fn decode(&self) -> ButtonEvent {
        ButtonEvent {
            index: self.0[0],
            value: i16::from_le_bytes([self.0[1], self.0[2]]),
        }
    }
}

impl From<[u8; FRAME_LEN]> for Frame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

/// A decoded frame: which button, and what it reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ButtonEvent {
    pub index: u8,
    pub value: i16,
}

impl ButtonEvent {
    pub const fn new(index: u8, value: i16) -> Self {
        Self { index, value }
    }

    /// Encode as a payload frame (sender side)
    pub fn encode(&self) -> Frame {
        let [lo, hi] = self.value.to_le_bytes();
        Frame([self.index, lo, hi])
    }

    /// Encode as a full packet, sync marker first
    pub fn to_packet(&self) -> [u8; PACKET_LEN] {
        let [index, lo, hi] = self.encode().0;
        [SYNC_MARKER, index, lo, hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_positive_value() {
        let frame = Frame::from_bytes([0x00, 0x0A, 0x00]);
        assert_eq!(frame.decode(), ButtonEvent::new(0, 10));
    }

    #[test]
    fn test_decode_negative_value() {
        // -1 is all ones, so both value bytes collide with the sync marker
        let frame = Frame::from_bytes([0x00, 0xFF, 0xFF]);
        assert_eq!(frame.decode(), ButtonEvent::new(0, -1));
    }

    #[test]
    fn test_decode_little_endian() {
        let frame = Frame::from_bytes([0x02, 0x34, 0x12]);
        assert_eq!(frame.decode().value, 0x1234);
    }

    #[test]
    fn test_decode_extremes() {
        assert_eq!(Frame::from_bytes([0, 0xFF, 0x7F]).decode().value, i16::MAX);
        assert_eq!(Frame::from_bytes([0, 0x00, 0x80]).decode().value, i16::MIN);
        assert_eq!(Frame::from_bytes([0xFF, 0, 0]).decode().index, 255);
    }

    #[test]
    fn test_encode_matches_firmware_layout() {
        // Firmware writes the index, then value & 0xFF, then value >> 8
        let event = ButtonEvent::new(2, -300);
        let lsb = (-300i32 & 0xFF) as u8;
        let msb = ((-300i32 >> 8) & 0xFF) as u8;
        assert_eq!(event.encode().as_bytes(), &[2, lsb, msb]);
    }

    #[test]
    fn test_roundtrip_boundaries() {
        for event in [
            ButtonEvent::new(0, 0),
            ButtonEvent::new(8, 1),
            ButtonEvent::new(255, i16::MIN),
            ButtonEvent::new(128, i16::MAX),
        ] {
            assert_eq!(event.encode().decode(), event);
        }
    }

    #[test]
    fn test_roundtrip_every_value() {
        for index in [0u8, 1, 8, 0x7F, 0xFE, 0xFF] {
            for value in i16::MIN..=i16::MAX {
                let event = ButtonEvent::new(index, value);
                assert_eq!(event.encode().decode(), event);
            }
        }
    }

    #[test]
    fn test_decode_every_payload() {
        // Decode is total: every 3-byte payload maps back to itself
        for index in 0..=u8::MAX {
            for lo in 0..=u8::MAX {
                for hi in 0..=u8::MAX {
                    let frame = Frame::from_bytes([index, lo, hi]);
                    assert_eq!(frame.decode().encode(), frame);
                }
            }
        }
    }

    #[test]
    fn test_packet_starts_with_sync() {
        let packet = ButtonEvent::new(1, 1).to_packet();
        assert_eq!(packet, [SYNC_MARKER, 0x01, 0x01, 0x00]);
    }
}
