//! Read buffer and message reader: accumulates frames belonging to one
//! logical message, enforcing monotonic sequence numbers and a buffer size
//! cap, and preserves bytes belonging to the next message across calls.
//!
//! Grounded on `MySqlStream::read` in `sqlx_core::mysql::stream` (header
//! peek, `packet_len`/`seq_no` bookkeeping, copy into `packet_buf`), but
//! reworked from "read from an async socket" into "assemble from bytes the
//! driver has already appended", since this layer is sans-I/O: growing the
//! buffer and removing frame headers in place are pure data-structure
//! operations here, with no `.await` anywhere.

use crate::error::{Error, Result};
use crate::framing::header::{FrameHeader, FRAME_HEADER_LEN, MAX_FRAME_PAYLOAD_LEN};

/// A growable contiguous buffer the driver appends freshly-read bytes into.
#[derive(Debug)]
pub struct ReadBuffer {
    data: Vec<u8>,
    /// End of valid (appended) bytes.
    filled: usize,
    max_size: usize,
}

impl ReadBuffer {
    pub fn new(initial_size: usize, max_size: usize) -> Self {
        ReadBuffer {
            data: vec![0; initial_size],
            filled: 0,
            max_size,
        }
    }

    /// The region the driver should read fresh transport bytes into.
    pub fn spare_capacity_mut(&mut self) -> &mut [u8] {
        if self.filled == self.data.len() {
            let new_len = (self.data.len() * 2).max(1).min(self.max_size);
            self.data.resize(new_len, 0);
        }
        &mut self.data[self.filled..]
    }

    pub fn spare_len(&self) -> usize {
        self.data.len() - self.filled
    }

    /// Called by the driver after a `read` effect reports `n` fresh bytes.
    pub fn commit(&mut self, n: usize) {
        self.filled += n;
    }

    fn ensure_total_capacity(&mut self, needed: usize) -> Result<()> {
        if needed > self.max_size {
            return Err(Error::MaxBufferSizeExceeded {
                max: self.max_size,
                needed,
            });
        }
        if needed > self.data.len() {
            self.data.resize(needed, 0);
        }
        Ok(())
    }

    /// Borrow of an already-assembled message's bytes, as reported by a
    /// [`ReadProgress::Message`].
    pub fn message(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Drops every byte already consumed into delivered messages, shifting
    /// any trailing bytes (belonging to the next message) to the front.
    pub fn compact(&mut self, keep_from: usize) {
        if keep_from == 0 {
            return;
        }
        self.data.copy_within(keep_from..self.filled, 0);
        self.filled -= keep_from;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    ReadingHeader,
    ReadingBody,
}

/// Result of one `MessageReader::poll` call.
#[derive(Debug)]
pub enum ReadProgress {
    /// Not enough bytes buffered yet; the driver must issue a `read` effect
    /// and append at least this many more bytes before retrying.
    NeedMoreData { at_least: usize },
    /// A full logical message is assembled at `data[offset..offset + len]`.
    Message { offset: usize, len: usize },
}

/// Assembles one logical message's worth of frames out of a [`ReadBuffer`].
#[derive(Debug)]
pub struct MessageReader {
    state: ReaderState,
    expected_seqnum: u8,
    remaining_frame_bytes: usize,
    message_offset: usize,
    message_size: usize,
    cursor: usize,
}

impl MessageReader {
    /// Starts assembling a new logical message at `offset`, expecting the
    /// command's next sequence number.
    pub fn new(offset: usize, expected_seqnum: u8) -> Self {
        MessageReader {
            state: ReaderState::ReadingHeader,
            expected_seqnum,
            remaining_frame_bytes: 0,
            message_offset: offset,
            message_size: 0,
            cursor: offset,
        }
    }

    pub fn expected_seqnum(&self) -> u8 {
        self.expected_seqnum
    }

    /// Drives frame assembly as far as the bytes already in `buf` allow.
    pub fn poll(&mut self, buf: &mut ReadBuffer) -> Result<ReadProgress> {
        loop {
            match self.state {
                ReaderState::ReadingHeader => {
                    let available = buf.filled - self.cursor;
                    if available < FRAME_HEADER_LEN {
                        return Ok(ReadProgress::NeedMoreData {
                            at_least: FRAME_HEADER_LEN - available,
                        });
                    }

                    let header_bytes: [u8; FRAME_HEADER_LEN] = buf.data
                        [self.cursor..self.cursor + FRAME_HEADER_LEN]
                        .try_into()
                        .expect("slice is exactly FRAME_HEADER_LEN bytes");
                    let header = FrameHeader::decode(&header_bytes);

                    if header.sequence_number != self.expected_seqnum {
                        return Err(Error::SequenceNumberMismatch {
                            expected: self.expected_seqnum,
                            actual: header.sequence_number,
                        });
                    }
                    self.expected_seqnum = self.expected_seqnum.wrapping_add(1);

                    buf.ensure_total_capacity(self.message_offset + self.message_size + header.payload_len)?;

                    // Remove the header in place: shift the remaining valid
                    // bytes left by FRAME_HEADER_LEN, fusing this frame's
                    // payload onto the end of the message region.
                    buf.data.copy_within(self.cursor + FRAME_HEADER_LEN..buf.filled, self.cursor);
                    buf.filled -= FRAME_HEADER_LEN;

                    self.remaining_frame_bytes = header.payload_len;
                    self.state = ReaderState::ReadingBody;
                }
                ReaderState::ReadingBody => {
                    let available = buf.filled - self.cursor;
                    if available < self.remaining_frame_bytes {
                        return Ok(ReadProgress::NeedMoreData {
                            at_least: self.remaining_frame_bytes - available,
                        });
                    }

                    self.message_size += self.remaining_frame_bytes;
                    self.cursor += self.remaining_frame_bytes;

                    if self.remaining_frame_bytes == MAX_FRAME_PAYLOAD_LEN {
                        self.state = ReaderState::ReadingHeader;
                        continue;
                    }

                    return Ok(ReadProgress::Message {
                        offset: self.message_offset,
                        len: self.message_size,
                    });
                }
            }
        }
    }

    /// Offset of the first byte not yet consumed by this message (either
    /// the end of the assembled message, or mid-frame if still in
    /// progress) — this is where the next message's reader should start.
    pub fn cursor(&self) -> usize {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framing::writer::frame_message;

    /// Mimics a driver looping `spare_capacity_mut`/`commit` across as many
    /// reads as it takes to land every byte, since a single call only grows
    /// the buffer once the spare region is entirely used up.
    fn append(buf: &mut ReadBuffer, mut bytes: &[u8]) {
        while !bytes.is_empty() {
            let spare = buf.spare_capacity_mut();
            let n = spare.len().min(bytes.len());
            spare[..n].copy_from_slice(&bytes[..n]);
            buf.commit(n);
            bytes = &bytes[n..];
        }
    }

    #[test]
    fn assembles_a_single_frame_message() {
        let mut buf = ReadBuffer::new(64, 1024);
        let (framed, _) = frame_message(b"hello", 0);
        append(&mut buf, &framed);

        let mut reader = MessageReader::new(0, 0);
        match reader.poll(&mut buf).unwrap() {
            ReadProgress::Message { offset, len } => {
                assert_eq!(&buf.data[offset..offset + len], b"hello");
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn reassembles_oversize_message_across_frames() {
        let mut buf = ReadBuffer::new(64, MAX_FRAME_PAYLOAD_LEN * 2 + 64);
        let payload = {
            let mut v = vec![0u8; MAX_FRAME_PAYLOAD_LEN + 3];
            for (i, b) in v.iter_mut().enumerate() {
                *b = (i % 251) as u8;
            }
            v
        };
        let (framed, _) = frame_message(&payload, 0);
        append(&mut buf, &framed);

        let mut reader = MessageReader::new(0, 0);
        match reader.poll(&mut buf).unwrap() {
            ReadProgress::Message { offset, len } => {
                assert_eq!(len, payload.len());
                assert_eq!(&buf.data[offset..offset + len], &payload[..]);
            }
            other => panic!("expected Message, got {other:?}"),
        }
    }

    #[test]
    fn needs_more_data_when_buffer_short() {
        let mut buf = ReadBuffer::new(64, 1024);
        append(&mut buf, &[0x03, 0x00]); // incomplete header
        let mut reader = MessageReader::new(0, 0);
        match reader.poll(&mut buf).unwrap() {
            ReadProgress::NeedMoreData { at_least } => assert_eq!(at_least, 2),
            other => panic!("expected NeedMoreData, got {other:?}"),
        }
    }

    #[test]
    fn sequence_number_mismatch_is_fatal_with_no_partial_message() {
        let mut buf = ReadBuffer::new(64, 1024);
        let (framed, _) = frame_message(b"x", 3); // seqnum 3, reader expects 0
        append(&mut buf, &framed);
        let mut reader = MessageReader::new(0, 0);
        let err = reader.poll(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::SequenceNumberMismatch {
                expected: 0,
                actual: 3
            }
        ));
    }

    #[test]
    fn preserves_bytes_belonging_to_the_next_message() {
        let mut buf = ReadBuffer::new(64, 1024);
        let (mut framed, next_seqnum) = frame_message(b"first", 0);
        let (framed2, _) = frame_message(b"second", next_seqnum);
        framed.extend_from_slice(&framed2);
        append(&mut buf, &framed);

        let mut reader = MessageReader::new(0, 0);
        let (offset, len) = match reader.poll(&mut buf).unwrap() {
            ReadProgress::Message { offset, len } => (offset, len),
            other => panic!("expected Message, got {other:?}"),
        };
        assert_eq!(&buf.data[offset..offset + len], b"first");

        let mut reader2 = MessageReader::new(reader.cursor(), reader.expected_seqnum());
        match reader2.poll(&mut buf).unwrap() {
            ReadProgress::Message { offset, len } => {
                assert_eq!(&buf.data[offset..offset + len], b"second");
            }
            other => panic!("expected Message, got {other:?}"),
        }

        // max_buffer_size_exceeded still fires if growth would pass the cap
        let mut tiny = ReadBuffer::new(4, 4);
        let (small_framed, _) = frame_message(b"too long for this cap", 0);
        append_truncated(&mut tiny, &small_framed);
        let mut reader3 = MessageReader::new(0, 0);
        assert!(matches!(
            reader3.poll(&mut tiny),
            Err(Error::MaxBufferSizeExceeded { .. })
        ));
    }

    fn append_truncated(buf: &mut ReadBuffer, bytes: &[u8]) {
        // Simulate the transport having delivered only what fits so far.
        let n = buf.spare_len().min(bytes.len());
        buf.spare_capacity_mut()[..n].copy_from_slice(&bytes[..n]);
        buf.commit(n);
    }
}
