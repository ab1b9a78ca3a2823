//! `COM_STMT_EXECUTE`: binds parameter values to a prepared statement.

use crate::io::Serializer;
use crate::protocol::column::FieldType;
use crate::protocol::opcode::Command;

bitflags::bitflags! {
    pub struct CursorType: u8 {
        const NO_CURSOR = 0;
        const READ_ONLY = 1;
        const FOR_UPDATE = 2;
        const SCROLLABLE = 4;
    }
}

/// One bound parameter's value, in the binary protocol's representation.
#[derive(Debug, Clone)]
pub enum ParamValue {
    Null,
    Tiny(i8),
    Short(i16),
    Long(i32),
    LongLong(i64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
}

impl ParamValue {
    fn field_type(&self) -> FieldType {
        match self {
            ParamValue::Null => FieldType::NULL,
            ParamValue::Tiny(_) => FieldType::TINY,
            ParamValue::Short(_) => FieldType::SHORT,
            ParamValue::Long(_) => FieldType::LONG,
            ParamValue::LongLong(_) => FieldType::LONGLONG,
            ParamValue::Float(_) => FieldType::FLOAT,
            ParamValue::Double(_) => FieldType::DOUBLE,
            ParamValue::Bytes(_) => FieldType::VAR_STRING,
        }
    }

    fn write_value(&self, s: &mut Serializer) {
        match self {
            ParamValue::Null => {}
            ParamValue::Tiny(v) => s.u8(*v as u8),
            ParamValue::Short(v) => s.u16(*v as u16),
            ParamValue::Long(v) => s.u32(*v as u32),
            ParamValue::LongLong(v) => s.u64(*v as u64),
            ParamValue::Float(v) => s.bytes(&v.to_le_bytes()),
            ParamValue::Double(v) => s.bytes(&v.to_le_bytes()),
            ParamValue::Bytes(v) => s.bytes_lenenc(v),
        }
    }
}

pub fn encode(statement_id: u32, cursor: CursorType, params: &[ParamValue]) -> Vec<u8> {
    let mut s = Serializer::new();
    s.u8(Command::StmtExecute.opcode());
    s.u32(statement_id);
    s.u8(cursor.bits());
    s.u32(1); // iteration_count, always 1

    if !params.is_empty() {
        let null_bitmap_len = params.len().div_ceil(8);
        let mut null_bitmap = vec![0u8; null_bitmap_len];
        for (i, p) in params.iter().enumerate() {
            if matches!(p, ParamValue::Null) {
                null_bitmap[i / 8] |= 1 << (i % 8);
            }
        }
        s.bytes(&null_bitmap);

        s.u8(1); // new-params-bind-flag
        for p in params {
            s.u8(p.field_type().0);
            s.u8(0); // unsigned flag; signed-only support for now
        }
        for p in params {
            p.write_value(&mut s);
        }
    }

    s.finish()
}
