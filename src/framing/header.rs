//! The 4-byte frame header: `{ size: int<3>, sequence_number: int<1> }`.

use byteorder::{ByteOrder, LittleEndian};

/// Payload bytes before a frame must be split (`0xFFFFFF`, the max a 24-bit
/// length field can hold).
pub const MAX_FRAME_PAYLOAD_LEN: usize = 0xFF_FFFF;

pub const FRAME_HEADER_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub payload_len: usize,
    pub sequence_number: u8,
}

impl FrameHeader {
    pub fn decode(bytes: &[u8; FRAME_HEADER_LEN]) -> Self {
        let payload_len = LittleEndian::read_u24(&bytes[..3]) as usize;
        FrameHeader {
            payload_len,
            sequence_number: bytes[3],
        }
    }

    pub fn encode(self) -> [u8; FRAME_HEADER_LEN] {
        let mut out = [0u8; FRAME_HEADER_LEN];
        LittleEndian::write_u24(&mut out[..3], self.payload_len as u32);
        out[3] = self.sequence_number;
        out
    }
}
