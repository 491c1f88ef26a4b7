//! Shared-secret digest over ordered parameter values.
//!
//! `base64(sha256(value_1 || value_2 || ... || value_n || secret))`, standard
//! alphabet with padding. There is no nonce or timestamp in the payload, so
//! this layer authenticates messages but does not prevent replays.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha1::Sha1;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Signs values in the given order with the shared secret.
pub fn sign<'a, I>(ordered_values: I, secret: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut payload = String::new();
    for value in ordered_values {
        payload.push_str(value);
    }
    payload.push_str(secret);
    STANDARD.encode(Sha256::digest(payload.as_bytes()))
}

/// Recomputes the digest and compares it with `claimed` in constant time.
pub fn verify<'a, I>(ordered_values: I, secret: &str, claimed: &str) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    let expected = sign(ordered_values, secret);
    constant_time_eq(expected.as_bytes(), claimed.as_bytes())
}

/// Non-secret locator embedded in callback URLs: lowercase hex SHA-1 of the
/// lowercased order secret.
pub fn integrity_token(order_secret: &str) -> String {
    let hash = Sha1::digest(order_secret.to_lowercase().as_bytes());
    hash.iter().map(|b| format!("{b:02x}")).collect()
}

/// Checks a token taken from a request path against an order secret.
/// The presented token is compared case-insensitively.
pub fn integrity_token_matches(order_secret: &str, presented: &str) -> bool {
    let expected = integrity_token(order_secret);
    constant_time_eq(
        expected.as_bytes(),
        presented.to_ascii_lowercase().as_bytes(),
    )
}

/// Both sides are hashed first so the comparison leaks neither content nor length.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    ha.ct_eq(&hb).into()
}
