//! PKCS#1 v1.5 signature padding as described in [RFC8017 § 8.2].
//!
//! Used for `sha*WithRSAEncryption` signatures on document signer
//! certificates and on the SOD signed attributes.
//!
//! [RFC8017 § 8.2]: https://datatracker.ietf.org/doc/html/rfc8017#section-8.2

use alloc::vec::Vec;
use subtle::ConstantTimeEq;

use super::rsa::rsa_verify_primitive;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::RsaPublicKey;
use crate::traits::PublicKeyParts;

#[cfg_attr(not(feature = "hazmat"), allow(dead_code))]
#[inline]
pub(crate) fn pkcs1v15_sign_pad(prefix: &[u8], hashed: &[u8], k: usize) -> Result<Vec<u8>> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 {
        return Err(Error::malformed("key too small for PKCS#1 v1.5 digest info"));
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut em = vec![0xff; k];
    em[0] = 0;
    em[1] = 1;
    em[k - t_len - 1] = 0;
    em[k - t_len..k - hash_len].copy_from_slice(prefix);
    em[k - hash_len..k].copy_from_slice(hashed);

    Ok(em)
}

#[inline]
pub(crate) fn pkcs1v15_sign_unpad(prefix: &[u8], hashed: &[u8], em: &[u8], k: usize) -> Result<()> {
    let hash_len = hashed.len();
    let t_len = prefix.len() + hashed.len();
    if k < t_len + 11 || em.len() != k {
        return Err(Error::Verification);
    }

    // EM = 0x00 || 0x01 || PS || 0x00 || T
    let mut ok = em[0].ct_eq(&0u8);
    ok &= em[1].ct_eq(&1u8);
    ok &= em[k - hash_len..k].ct_eq(hashed);
    ok &= em[k - t_len..k - hash_len].ct_eq(prefix);
    ok &= em[k - t_len - 1].ct_eq(&0u8);

    for el in em.iter().skip(2).take(k - t_len - 3) {
        ok &= el.ct_eq(&0xff)
    }

    if ok.unwrap_u8() != 1 {
        return Err(Error::Verification);
    }

    Ok(())
}

/// Verifies an `RSASSA-PKCS1-v1_5` signature over an already hashed message.
pub(crate) fn verify(
    pub_key: &RsaPublicKey,
    hash: HashAlgorithm,
    hashed: &[u8],
    sig: &[u8],
) -> Result<()> {
    if hashed.len() != hash.size() {
        return Err(Error::Verification);
    }

    let em = rsa_verify_primitive(pub_key, sig)?;
    pkcs1v15_sign_unpad(hash.asn1_prefix(), hashed, &em, pub_key.size())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_layout() {
        let hashed = [0xAA; 20];
        let prefix = HashAlgorithm::Sha1.asn1_prefix();
        let em = pkcs1v15_sign_pad(prefix, &hashed, 64).unwrap();
        assert_eq!(&em[..3], &[0x00, 0x01, 0xff]);
        assert_eq!(em[64 - 20 - prefix.len() - 1], 0x00);
        assert_eq!(&em[44..], &hashed);
        assert!(pkcs1v15_sign_unpad(prefix, &hashed, &em, 64).is_ok());
    }

    #[test]
    fn unpad_rejects_tampering() {
        let hashed = [0x55; 32];
        let prefix = HashAlgorithm::Sha256.asn1_prefix();
        let mut em = pkcs1v15_sign_pad(prefix, &hashed, 128).unwrap();
        em[5] = 0xfe;
        assert!(pkcs1v15_sign_unpad(prefix, &hashed, &em, 128).is_err());
    }

    #[test]
    fn test_sign_tiny_no_crash() {
        let res = pkcs1v15_sign_pad(HashAlgorithm::Sha256.asn1_prefix(), &[0u8; 32], 40);
        assert!(res.is_err());
    }
}
