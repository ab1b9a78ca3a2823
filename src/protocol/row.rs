//! Text and binary resultset row decoding.
//!
//! Grounded on `sqlx_core::mysql::protocol::row::Row`'s byte-range approach,
//! but reworked to copy column values out (`Vec<u8>`) rather than borrowing
//! ranges into a shared buffer, since a row here outlives the read buffer it
//! was parsed from (the buffer gets reused for the next message).

use crate::error::Result;
use crate::io::Deserializer;
use crate::protocol::column::FieldType;

pub type RowValue = Option<Vec<u8>>;

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub values: Vec<RowValue>,
}

impl Row {
    pub fn decode_text(buf: &[u8], num_columns: usize) -> Result<Self> {
        let mut d = Deserializer::new(buf);
        let mut values = Vec::with_capacity(num_columns);
        for _ in 0..num_columns {
            values.push(d.bytes_lenenc()?.map(|b| b.to_vec()));
        }
        d.check_extra_bytes()?;
        Ok(Row { values })
    }

    pub fn decode_binary(buf: &[u8], column_types: &[FieldType]) -> Result<Self> {
        let mut d = Deserializer::new(buf);

        let header = d.u8()?;
        if header != 0x00 {
            return Err(protocol_value_err!("expected binary row header 0x00, got 0x{header:02x}"));
        }

        // NULL-bitmap: (num_columns + 7 + 2) / 8 bytes; column i's bit lives
        // at offset i + 2 (the first two bits are reserved).
        let null_bitmap_len = (column_types.len() + 7 + 2) / 8;
        let null_bitmap = d.bytes(null_bitmap_len)?;
        let is_null = |i: usize| -> bool {
            let bit = i + 2;
            (null_bitmap[bit / 8] >> (bit % 8)) & 1 != 0
        };

        let mut values = Vec::with_capacity(column_types.len());
        for (i, ty) in column_types.iter().enumerate() {
            if is_null(i) {
                values.push(None);
                continue;
            }

            let value = if ty.is_lenenc_string() {
                d.bytes_lenenc()?.unwrap_or(&[]).to_vec()
            } else {
                match *ty {
                    FieldType::LONGLONG => d.bytes(8)?.to_vec(),
                    FieldType::LONG | FieldType::INT24 => d.bytes(4)?.to_vec(),
                    FieldType::SHORT | FieldType::YEAR => d.bytes(2)?.to_vec(),
                    FieldType::TINY => d.bytes(1)?.to_vec(),
                    FieldType::DOUBLE => d.bytes(8)?.to_vec(),
                    FieldType::FLOAT => d.bytes(4)?.to_vec(),
                    other => {
                        return Err(protocol_value_err!(
                            "unsupported binary column type 0x{:02x}",
                            other.0
                        ))
                    }
                }
            };
            values.push(Some(value));
        }

        d.check_extra_bytes()?;
        Ok(Row { values })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_2_one_text_row() {
        // 02 00 00 03 01 35 -> payload (stripped of frame header): 01 35
        let row = Row::decode_text(&[0x01, 0x35], 1).unwrap();
        assert_eq!(row.values, vec![Some(b"5".to_vec())]);
    }

    #[test]
    fn text_row_handles_null() {
        let row = Row::decode_text(&[0xfb], 1).unwrap();
        assert_eq!(row.values, vec![None]);
    }

    #[test]
    fn binary_row_decodes_tiny_int_and_null() {
        let mut s = crate::io::Serializer::new();
        s.u8(0x00);
        // null bitmap, 2 columns -> (2+7+2)/8 = 1 byte; column 1 is NULL,
        // bit offset = 1+2 = 3
        s.u8(0b0000_1000);
        s.u8(42); // column 0: TINY
        let bytes = s.finish();

        let row = Row::decode_binary(&bytes, &[FieldType::TINY, FieldType::TINY]).unwrap();
        assert_eq!(row.values, vec![Some(vec![42]), None]);
    }
}
