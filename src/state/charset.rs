//! The connection's current character set.

/// A known server collation: its id, the charset name used in `SET NAMES`,
/// and whether it's a multi-byte encoding (affects `next_char_fn`-style
/// scanning needed by escaping logic).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    pub collation_id: u16,
    pub name: String,
}

impl Charset {
    pub fn new(collation_id: u16, name: impl Into<String>) -> Self {
        Charset {
            collation_id,
            name: name.into(),
        }
    }
}

/// The default collation this core requests when the caller doesn't name
/// one: `utf8mb4_general_ci`.
pub const DEFAULT_COLLATION_ID: u16 = 45;
