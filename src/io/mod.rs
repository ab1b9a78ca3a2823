//! The binary codec: a deserialisation cursor over `&[u8]` and a
//! serialisation cursor over `Vec<u8>`, plus the length-encoded integer and
//! string helpers the wire format needs.
//!
//! Grounded on `sqlx_core::io::{Buf, BufMut}` and
//! `sqlx_core::mysql::io::BufExt`, merged into one module since this crate
//! has only one wire protocol to serve.

mod de;
mod lenenc;
mod ser;

pub use de::Deserializer;
pub use lenenc::lenenc_int_len;
pub use ser::Serializer;
