//! Serialisation cursor: builds one logical message's payload bytes.
//!
//! Framing (splitting into `0xFFFFFF`-byte frames and writing headers) is a
//! separate concern, handled by [`crate::framing::MessageWriter`] — this
//! type only ever emits a flat payload, mirroring the separation between
//! `sqlx_core::io::BufMut` (raw encoding) and `MySqlStream::write` (framing)
//! in the teacher crate.

use byteorder::{ByteOrder, LittleEndian};

use crate::io::lenenc::lenenc_int_len;

#[derive(Debug, Default)]
pub struct Serializer {
    buf: Vec<u8>,
}

impl Serializer {
    pub fn new() -> Self {
        Serializer::default()
    }

    pub fn with_capacity(cap: usize) -> Self {
        Serializer {
            buf: Vec::with_capacity(cap),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn u16(&mut self, v: u16) {
        let mut tmp = [0u8; 2];
        LittleEndian::write_u16(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn u24(&mut self, v: u32) {
        let mut tmp = [0u8; 3];
        LittleEndian::write_u24(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn u32(&mut self, v: u32) {
        let mut tmp = [0u8; 4];
        LittleEndian::write_u32(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn u64(&mut self, v: u64) {
        let mut tmp = [0u8; 8];
        LittleEndian::write_u64(&mut tmp, v);
        self.buf.extend_from_slice(&tmp);
    }

    pub fn bytes(&mut self, v: &[u8]) {
        self.buf.extend_from_slice(v);
    }

    pub fn zeros(&mut self, n: usize) {
        self.buf.resize(self.buf.len() + n, 0);
    }

    pub fn str(&mut self, v: &str) {
        self.buf.extend_from_slice(v.as_bytes());
    }

    pub fn str_null(&mut self, v: &str) {
        self.str(v);
        self.u8(0);
    }

    /// Minimal-form `int<lenenc>`.
    pub fn int_lenenc(&mut self, v: u64) {
        match lenenc_int_len(v) {
            1 => self.u8(v as u8),
            3 => {
                self.u8(0xFC);
                self.u16(v as u16);
            }
            4 => {
                self.u8(0xFD);
                self.u24(v as u32);
            }
            _ => {
                self.u8(0xFE);
                self.u64(v);
            }
        }
    }

    pub fn bytes_lenenc(&mut self, v: &[u8]) {
        self.int_lenenc(v.len() as u64);
        self.bytes(v);
    }

    pub fn str_lenenc(&mut self, v: &str) {
        self.bytes_lenenc(v.as_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::Deserializer;

    #[test]
    fn lenenc_round_trips_through_deserializer() {
        for v in [0u64, 5, 0xFA, 0xFB, 250, 0xFFFF, 1 << 16, u64::MAX] {
            let mut s = Serializer::new();
            s.int_lenenc(v);
            let bytes = s.finish();
            let mut d = Deserializer::new(&bytes);
            assert_eq!(d.int_lenenc().unwrap(), Some(v));
            d.check_extra_bytes().unwrap();
        }
    }

    #[test]
    fn encode_uses_minimal_form() {
        let mut s = Serializer::new();
        s.int_lenenc(5);
        assert_eq!(s.finish(), vec![5]);
    }
}
