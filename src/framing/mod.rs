//! Frame-level transport: the 4-byte header, reassembly of frames into one
//! logical message, and splitting an outgoing message back into frames.
//!
//! This is the layer directly above raw bytes and directly below
//! [`crate::protocol`]; nothing here understands what a message means, only
//! how many bytes belong to it.

mod header;
mod reader;
mod writer;

pub use header::{FrameHeader, FRAME_HEADER_LEN, MAX_FRAME_PAYLOAD_LEN};
pub use reader::{MessageReader, ReadBuffer, ReadProgress};
pub use writer::{frame_count, frame_message, WriteBuffer};
