//! Message writer: frames one or two logical messages for one transport
//! write, and tracks how many bytes the transport has actually consumed.
//!
//! Grounded on `MySqlStream::write`/`send` in `sqlx_core::mysql::stream`,
//! which reserves a 4-byte header slot, encodes the packet, then backfills
//! `{ size, seqnum }` — generalised here to split oversize payloads into
//! multiple frames instead of assuming `MAX_PACKET_SIZE` never exceeded.

use crate::framing::header::{FrameHeader, FRAME_HEADER_LEN, MAX_FRAME_PAYLOAD_LEN};

/// Frames `payload` starting at `initial_seqnum`, returning the framed bytes
/// and the next sequence number to use.
///
/// Splits the payload into frames of at most `MAX_FRAME_PAYLOAD_LEN` bytes;
/// a payload whose length is an exact multiple of that bound gets one extra
/// zero-length terminating frame, per the wire protocol's convention that a
/// full-size frame always implies "more to come".
pub fn frame_message(payload: &[u8], initial_seqnum: u8) -> (Vec<u8>, u8) {
    let mut out = Vec::with_capacity(payload.len() + FRAME_HEADER_LEN * 2);
    let mut seqnum = initial_seqnum;
    let mut offset = 0;

    loop {
        let remaining = payload.len() - offset;
        let chunk_len = remaining.min(MAX_FRAME_PAYLOAD_LEN);

        let header = FrameHeader {
            payload_len: chunk_len,
            sequence_number: seqnum,
        };
        out.extend_from_slice(&header.encode());
        out.extend_from_slice(&payload[offset..offset + chunk_len]);

        seqnum = seqnum.wrapping_add(1);
        offset += chunk_len;

        if chunk_len < MAX_FRAME_PAYLOAD_LEN {
            break;
        }
    }

    (out, seqnum)
}

/// Number of frames `frame_message` will emit for a payload of length `len`.
/// Always `len / MAX_FRAME_PAYLOAD_LEN + 1`: an exact multiple gets the
/// trailing zero-length terminator frame, a remainder gets its own partial
/// frame — either way that's one frame beyond the full chunks.
pub fn frame_count(len: usize) -> usize {
    len / MAX_FRAME_PAYLOAD_LEN + 1
}

/// Owns the bytes pending on the wire for a connection's current write and
/// how much of it the transport has already taken.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    pending: Vec<u8>,
    consumed: usize,
}

impl WriteBuffer {
    pub fn new() -> Self {
        WriteBuffer::default()
    }

    /// Queues one logical message for write, returning the next sequence
    /// number (for a second pipelined message, if any).
    pub fn queue_message(&mut self, payload: &[u8], initial_seqnum: u8) -> u8 {
        let (framed, next_seqnum) = frame_message(payload, initial_seqnum);
        self.pending.extend_from_slice(&framed);
        next_seqnum
    }

    /// The bytes still to be handed to the transport.
    pub fn pending(&self) -> &[u8] {
        &self.pending[self.consumed..]
    }

    pub fn is_empty(&self) -> bool {
        self.pending().is_empty()
    }

    /// Called by the driver after a `write` effect reports `n` bytes sent.
    pub fn advance(&mut self, n: usize) {
        self.consumed += n;
        if self.consumed == self.pending.len() {
            self.pending.clear();
            self.consumed = 0;
        }
    }

    /// Clears any unsent bytes and resets for the next command.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.consumed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::header::FrameHeader;

    #[test]
    fn splits_oversize_payload_into_frames_with_incrementing_seqnum() {
        let payload = vec![0xAB; MAX_FRAME_PAYLOAD_LEN + 3];
        let (framed, next_seqnum) = frame_message(&payload, 5);

        let h1 = FrameHeader::decode(framed[0..4].try_into().unwrap());
        assert_eq!(h1.payload_len, MAX_FRAME_PAYLOAD_LEN);
        assert_eq!(h1.sequence_number, 5);

        let h2_offset = 4 + MAX_FRAME_PAYLOAD_LEN;
        let h2 = FrameHeader::decode(framed[h2_offset..h2_offset + 4].try_into().unwrap());
        assert_eq!(h2.payload_len, 3);
        assert_eq!(h2.sequence_number, 6);

        assert_eq!(next_seqnum, 7);
        assert_eq!(frame_count(payload.len()), 2);
    }

    #[test]
    fn small_payload_is_one_frame() {
        let (framed, next_seqnum) = frame_message(b"SELECT 1", 0);
        assert_eq!(framed.len(), 4 + 8);
        assert_eq!(next_seqnum, 1);
    }

    #[test]
    fn write_buffer_advances_and_resets() {
        let mut wb = WriteBuffer::new();
        wb.queue_message(b"hi", 0);
        assert_eq!(wb.pending().len(), 6);
        wb.advance(3);
        assert_eq!(wb.pending().len(), 3);
        wb.advance(3);
        assert!(wb.is_empty());
    }
}
