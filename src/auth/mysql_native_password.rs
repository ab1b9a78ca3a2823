//! `mysql_native_password`: fast-track only, `SHA1(pw) XOR SHA1(challenge || SHA1(SHA1(pw)))`.
//!
//! Grounded on `scramble_sha1` in `sqlx_core::mysql::protocol::auth_plugin`,
//! ported from the `digest` 0.8-era `input`/`result_reset` API to 0.10's
//! `update`/`finalize_reset`.

use digest::Digest;
use sha1::Sha1;

use crate::error::Result;

pub const CHALLENGE_LEN: usize = 20;

pub fn scramble(password: &[u8], challenge: &[u8]) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Ok(Vec::new());
    }
    if challenge.len() != CHALLENGE_LEN {
        return Err(protocol_value_err!(
            "mysql_native_password challenge must be {CHALLENGE_LEN} bytes, got {}",
            challenge.len()
        ));
    }

    let mut hasher = Sha1::new();
    hasher.update(password);
    let pw_hash = hasher.finalize_reset();

    hasher.update(pw_hash);
    let pw_hash_hash = hasher.finalize_reset();

    hasher.update(challenge);
    hasher.update(pw_hash_hash);
    let seed_hash = hasher.finalize();

    let mut response = pw_hash.to_vec();
    for (b, s) in response.iter_mut().zip(seed_hash.iter()) {
        *b ^= s;
    }
    Ok(response)
}
