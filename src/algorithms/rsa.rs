//! Generic RSA implementation

use alloc::vec::Vec;
use num_bigint::BigUint;

use super::pad::uint_to_be_pad;
use crate::errors::{Error, Result};
use crate::traits::PublicKeyParts;

/// ⚠️ Raw RSA encryption of m with the public key. No padding is performed.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Use this function with great care! Raw RSA should never be used without an appropriate padding
/// or signature scheme. See the [module-level documentation][crate::hazmat] for more information.
#[inline]
pub fn rsa_encrypt<K: PublicKeyParts>(key: &K, m: &BigUint) -> Result<BigUint> {
    Ok(m.modpow(key.e(), key.n()))
}

/// ⚠️ Performs raw RSA decryption with the private exponent `d`, no padding
/// and no blinding.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// Only meant for producing test vectors. Not constant time.
#[cfg_attr(not(feature = "hazmat"), allow(dead_code))]
#[inline]
pub fn rsa_decrypt(n: &BigUint, d: &BigUint, c: &BigUint) -> Result<BigUint> {
    if c >= n {
        return Err(Error::Verification);
    }
    Ok(c.modpow(d, n))
}

/// Applies the public key to a signature of exactly `key.size()` bytes and
/// returns the encoded message, left padded to the same length.
pub(crate) fn rsa_verify_primitive<K: PublicKeyParts>(key: &K, sig: &[u8]) -> Result<Vec<u8>> {
    if sig.len() != key.size() {
        return Err(Error::Verification);
    }

    let s = BigUint::from_bytes_be(sig);
    if &s >= key.n() {
        return Err(Error::Verification);
    }

    uint_to_be_pad(rsa_encrypt(key, &s)?, key.size())
}
