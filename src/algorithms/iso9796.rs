//! Hash recovery from ISO/IEC 9796-2 Active Authentication signatures.
//!
//! The chip signs with message recovery, so opening the signature with the
//! public key reveals the trailer. Its last byte is either `0xBC` (implicit
//! SHA-1) or, for the two-byte trailer `…‖0xCC`, the hash identifier right
//! before it.

use log::{trace, warn};
use num_bigint::BigUint;

use crate::config::HashFlagPolicy;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::RsaPublicKey;
use crate::traits::PublicKeyParts;

const TRAILER_EXPLICIT: u8 = 0xCC;

/// Recovers the hash algorithm used by an RSA Active Authentication
/// signature.
///
/// Returns `Ok(None)` when the recovered message is too short to carry a
/// trailer.
pub fn figure_out_rsa_hash_algorithm(
    pub_key: &RsaPublicKey,
    sig: &[u8],
    policy: HashFlagPolicy,
) -> Result<Option<HashAlgorithm>> {
    let s = BigUint::from_bytes_be(sig);
    let m = s.modpow(pub_key.e(), pub_key.n()).to_bytes_be();
    let m = m.strip_prefix(&[0u8]).unwrap_or(&m);

    if m.len() < 2 {
        trace!("recovered message of {} bytes carries no trailer", m.len());
        return Ok(None);
    }

    let mut flag = m[m.len() - 1];
    if flag == TRAILER_EXPLICIT {
        flag = m[m.len() - 2];
    }

    match (HashAlgorithm::from_iso9796_flag(flag), policy) {
        (Some(hash), _) => Ok(Some(hash)),
        (None, HashFlagPolicy::Compatible) => {
            warn!("unknown ISO/IEC 9796-2 hash flag {flag:#04x}, assuming SHA256");
            Ok(Some(HashAlgorithm::Sha256))
        }
        (None, HashFlagPolicy::Strict) => Err(Error::UnsupportedAlgorithm {
            reason: format!("unknown ISO/IEC 9796-2 hash flag {flag:#04x}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::invert;
    use num_traits::One;

    struct TestKey {
        public: RsaPublicKey,
        d: BigUint,
    }

    fn test_key() -> TestKey {
        let p = BigUint::from(1_000_000_007u64);
        let q = BigUint::from(998_244_353u64);
        let e = BigUint::from(65537u32);
        let phi = (&p - BigUint::one()) * (&q - BigUint::one());
        let d = invert(&e, &phi).unwrap();
        TestKey {
            public: RsaPublicKey::new(p * q, e).unwrap(),
            d,
        }
    }

    fn sign(key: &TestKey, msg: &[u8]) -> Vec<u8> {
        BigUint::from_bytes_be(msg)
            .modpow(&key.d, key.public.n())
            .to_bytes_be()
    }

    fn recover(msg: &[u8], policy: HashFlagPolicy) -> Result<Option<HashAlgorithm>> {
        let key = test_key();
        figure_out_rsa_hash_algorithm(&key.public, &sign(&key, msg), policy)
    }

    #[test]
    fn implicit_sha1_trailer() {
        let hash = recover(&[0x6A, 0x11, 0x22, 0xBC], HashFlagPolicy::Strict).unwrap();
        assert_eq!(hash, Some(HashAlgorithm::Sha1));
    }

    #[test]
    fn explicit_trailers() {
        for (flag, expected) in [
            (0x33, HashAlgorithm::Sha1),
            (0x34, HashAlgorithm::Sha256),
            (0x35, HashAlgorithm::Sha512),
            (0x36, HashAlgorithm::Sha384),
            (0x38, HashAlgorithm::Sha224),
        ] {
            let hash = recover(&[0x6A, 0x11, flag, 0xCC], HashFlagPolicy::Strict).unwrap();
            assert_eq!(hash, Some(expected));
        }
    }

    #[test]
    fn unknown_flag_depends_on_policy() {
        let msg = [0x6A, 0x11, 0x22, 0x99];
        assert_eq!(
            recover(&msg, HashFlagPolicy::Compatible).unwrap(),
            Some(HashAlgorithm::Sha256)
        );
        let err = recover(&msg, HashFlagPolicy::Strict).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::UnsupportedAlgorithm);
    }

    #[test]
    fn short_message_has_no_hash() {
        let key = test_key();
        for sig in [[0x00], [0x01]] {
            let hash =
                figure_out_rsa_hash_algorithm(&key.public, &sig, HashFlagPolicy::Compatible);
            assert_eq!(hash.unwrap(), None);
        }
    }
}
