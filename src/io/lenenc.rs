//! Length-encoded integer helpers shared by the (de)serialiser.
//!
//! Grounded on `sqlx_core::mysql::io::BufExt::get_uint_lenenc`, generalised
//! with an encoder and reworked to reject the reserved `0xFF` tag per
//! `SPEC_FULL.md` §9 (the open question on lenenc permissiveness).

/// Number of bytes `encode_lenenc_int` will write for `v`, i.e. the minimal
/// encoding length.
pub fn lenenc_int_len(v: u64) -> usize {
    if v < 0xFB {
        1
    } else if v <= 0xFFFF {
        3
    } else if v <= 0xFF_FFFF {
        4
    } else {
        9
    }
}
