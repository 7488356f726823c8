//! Signed download links
//!
//! A signature is the base64 of the first 20 bytes of
//! `SHA-256(key \n file \n id \n exp)`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};

const SIGNATURE_LEN: usize = 20;

pub fn sign(key: &str, file: &str, id: u64, exp: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.update(b"\n");
    hasher.update(file.as_bytes());
    hasher.update(b"\n");
    hasher.update(id.to_string().as_bytes());
    hasher.update(b"\n");
    hasher.update(exp.to_string().as_bytes());
    let digest = hasher.finalize();
    STANDARD.encode(&digest[..SIGNATURE_LEN])
}

pub fn verify(key: &str, file: &str, id: u64, exp: i64, sig: &str) -> bool {
    sign(key, file, id, exp) == sig
}
