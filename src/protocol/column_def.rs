//! Column definition packet, sent once per column ahead of a resultset.

use crate::error::Result;
use crate::io::Deserializer;
use crate::protocol::column::{FieldFlags, FieldType};

#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub catalog: String,
    pub schema: String,
    pub table: String,
    pub org_table: String,
    pub name: String,
    pub org_name: String,
    pub collation_id: u16,
    pub column_length: u32,
    pub r#type: FieldType,
    pub flags: FieldFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let mut d = Deserializer::new(buf);

        let catalog = d.str_lenenc()?.unwrap_or_default().to_owned();
        let schema = d.str_lenenc()?.unwrap_or_default().to_owned();
        let table = d.str_lenenc()?.unwrap_or_default().to_owned();
        let org_table = d.str_lenenc()?.unwrap_or_default().to_owned();
        let name = d.str_lenenc()?.unwrap_or_default().to_owned();
        let org_name = d.str_lenenc()?.unwrap_or_default().to_owned();

        // length of fixed-length fields below, always 0x0c
        let _fixed_len = d.int_lenenc()?;

        let collation_id = d.u16()?;
        let column_length = d.u32()?;
        let r#type = FieldType(d.u8()?);
        let flags = FieldFlags::from_bits_truncate(d.u16()?);
        let decimals = d.u8()?;

        // two filler bytes
        let _ = d.bytes(2)?;

        Ok(ColumnDefinition {
            catalog,
            schema,
            table,
            org_table,
            name,
            org_name,
            collation_id,
            column_length,
            r#type,
            flags,
            decimals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_minimal_column_definition() {
        let mut s = crate::io::Serializer::new();
        s.str_lenenc("def");
        s.str_lenenc("");
        s.str_lenenc("");
        s.str_lenenc("");
        s.str_lenenc("f1");
        s.str_lenenc("");
        s.int_lenenc(0x0c);
        s.u16(63);
        s.u32(1);
        s.u8(FieldType::TINY.0);
        s.u16(0);
        s.u8(0);
        s.bytes(&[0, 0]);
        let bytes = s.finish();

        let c = ColumnDefinition::decode(&bytes).unwrap();
        assert_eq!(c.catalog, "def");
        assert_eq!(c.name, "f1");
        assert_eq!(c.r#type, FieldType::TINY);
    }
}
