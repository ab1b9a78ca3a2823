//! Column types (`enum_field_types`) and per-field flags.

/// The wire's `type` byte in a column definition.
///
/// Kept as a newtype over `u8` rather than a closed enum, the way the
/// teacher's `TypeId` does it: the server is free to report any of the
/// values below, and named constants read better at call sites than a
/// bare integer without forcing us to reject a value we don't otherwise
/// care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldType(pub u8);

impl FieldType {
    pub const DECIMAL: FieldType = FieldType(0x00);
    pub const TINY: FieldType = FieldType(0x01);
    pub const SHORT: FieldType = FieldType(0x02);
    pub const LONG: FieldType = FieldType(0x03);
    pub const FLOAT: FieldType = FieldType(0x04);
    pub const DOUBLE: FieldType = FieldType(0x05);
    pub const NULL: FieldType = FieldType(0x06);
    pub const TIMESTAMP: FieldType = FieldType(0x07);
    pub const LONGLONG: FieldType = FieldType(0x08);
    pub const INT24: FieldType = FieldType(0x09);
    pub const DATE: FieldType = FieldType(0x0a);
    pub const TIME: FieldType = FieldType(0x0b);
    pub const DATETIME: FieldType = FieldType(0x0c);
    pub const YEAR: FieldType = FieldType(0x0d);
    pub const VARCHAR: FieldType = FieldType(0x0f);
    pub const BIT: FieldType = FieldType(0x10);
    pub const NEWDECIMAL: FieldType = FieldType(0xf6);
    pub const ENUM: FieldType = FieldType(0xf7);
    pub const SET: FieldType = FieldType(0xf8);
    pub const TINY_BLOB: FieldType = FieldType(0xf9);
    pub const MEDIUM_BLOB: FieldType = FieldType(0xfa);
    pub const LONG_BLOB: FieldType = FieldType(0xfb);
    pub const BLOB: FieldType = FieldType(0xfc);
    pub const VAR_STRING: FieldType = FieldType(0xfd);
    pub const STRING: FieldType = FieldType(0xfe);
    pub const GEOMETRY: FieldType = FieldType(0xff);

    /// Whether the binary row protocol represents this type as a
    /// length-encoded string rather than a fixed-width integer/float.
    pub fn is_lenenc_string(self) -> bool {
        matches!(
            self,
            FieldType::DECIMAL
                | FieldType::NEWDECIMAL
                | FieldType::VARCHAR
                | FieldType::BIT
                | FieldType::ENUM
                | FieldType::SET
                | FieldType::TINY_BLOB
                | FieldType::MEDIUM_BLOB
                | FieldType::LONG_BLOB
                | FieldType::BLOB
                | FieldType::VAR_STRING
                | FieldType::STRING
                | FieldType::GEOMETRY
                | FieldType::DATE
                | FieldType::TIME
                | FieldType::DATETIME
                | FieldType::TIMESTAMP
        )
    }
}

bitflags::bitflags! {
    pub struct FieldFlags: u16 {
        const NOT_NULL = 1;
        const PRIMARY_KEY = 2;
        const UNIQUE_KEY = 4;
        const MULTIPLE_KEY = 8;
        const BLOB = 16;
        const UNSIGNED = 32;
        const ZEROFILL = 64;
        const BINARY = 128;
        const ENUM = 256;
        const AUTO_INCREMENT = 512;
        const TIMESTAMP = 1024;
        const SET = 2048;
        const NO_DEFAULT_VALUE = 4096;
        const ON_UPDATE_NOW = 8192;
        const NUM = 32768;
    }
}
