//! `caching_sha2_password`: fast-track (SHA-256 scramble) plus the
//! perform-full-auth fallback (plaintext over TLS, or RSA-OAEP over a
//! server-supplied public key on a plaintext channel).
//!
//! The fast-track scramble is grounded on `scramble_sha256` in
//! `sqlx_core::mysql::protocol::auth_plugin`; perform-full-auth has no
//! teacher counterpart and is grounded on
//! `original_source/include/mysql/impl/auth.hpp` and the MariaDB knowledge
//! base page cited in the teacher's doc comment for the SHA-1 variant.

use digest::Digest;
use rand::rngs::OsRng;
use rsa::{pkcs8::DecodePublicKey, PaddingScheme, PublicKey, RsaPublicKey};
use sha2::Sha256;

use crate::error::Result;

pub const CHALLENGE_LEN: usize = 20;

pub fn scramble_fast_track(password: &[u8], challenge: &[u8]) -> Result<Vec<u8>> {
    if password.is_empty() {
        return Ok(Vec::new());
    }
    if challenge.len() != CHALLENGE_LEN {
        return Err(protocol_value_err!(
            "caching_sha2_password challenge must be {CHALLENGE_LEN} bytes, got {}",
            challenge.len()
        ));
    }

    let mut hasher = Sha256::new();
    hasher.update(password);
    let pw_hash = hasher.finalize_reset();

    hasher.update(pw_hash);
    let pw_hash_hash = hasher.finalize_reset();

    hasher.update(pw_hash_hash);
    hasher.update(challenge);
    let seed_hash = hasher.finalize();

    let mut response = pw_hash.to_vec();
    for (b, s) in response.iter_mut().zip(seed_hash.iter()) {
        *b ^= s;
    }
    Ok(response)
}

/// Plaintext path of perform-full-auth, used only over a secure channel.
pub fn full_auth_plaintext(password: &[u8]) -> Vec<u8> {
    let mut out = password.to_vec();
    out.push(0);
    out
}

/// RSA-OAEP path of perform-full-auth, used when the channel is not secure.
///
/// `challenge` cycles to XOR against `password || 0x00` before encryption,
/// per the plugin's wire behaviour.
pub fn full_auth_rsa_oaep(password: &[u8], challenge: &[u8], server_public_key_pem: &str) -> Result<Vec<u8>> {
    if challenge.is_empty() {
        return Err(protocol_value_err!("caching_sha2_password full auth requires a non-empty challenge"));
    }

    let mut to_encrypt = password.to_vec();
    to_encrypt.push(0);
    for (i, b) in to_encrypt.iter_mut().enumerate() {
        *b ^= challenge[i % challenge.len()];
    }

    let public_key = RsaPublicKey::from_public_key_pem(server_public_key_pem)
        .map_err(|e| protocol_value_err!("invalid server public key: {e}"))?;

    let padding = PaddingScheme::new_oaep::<sha1::Sha1>();
    public_key
        .encrypt(&mut OsRng, padding, &to_encrypt)
        .map_err(|e| protocol_value_err!("RSA-OAEP encryption failed: {e}"))
}
