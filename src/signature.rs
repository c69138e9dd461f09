//! Signature algorithms, signature normalization and verification.
//!
//! Document signers and CSCAs sign with RSA PKCS#1 v1.5, RSASSA-PSS or ECDSA.
//! [`SignatureAlgorithm`] is the closed set of schemes this crate accepts,
//! [`VerifyingKey`] binds a [`PublicKey`] to one of them and implements the
//! traits of the [`signature`] crate.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::{self, Debug, Formatter, LowerHex};
use der::asn1::Uint;
use der::{Decode, Encode, Tag, Tagged};
use log::trace;
use num_bigint::BigUint;
use num_traits::Zero;
use pkcs1::RsaPssParams;
use spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};

pub use ::signature::{hazmat::PrehashVerifier, SignatureEncoding, Verifier};

use crate::algorithms::pad::pad_be;
use crate::algorithms::{ecdsa, pkcs1v15, pss};
use crate::curve::NamedCurve;
use crate::encoding::EcdsaSigValue;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::{KeyAlgorithm, PublicKey};
use crate::oid;

/// A signature scheme together with its digest parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// `sha*WithRSAEncryption`
    RsaPkcs1v15(HashAlgorithm),
    /// `RSASSA-PSS`
    RsaPss {
        /// Message digest.
        hash: HashAlgorithm,
        /// Digest of the MGF1 mask generation function.
        mgf_hash: HashAlgorithm,
        /// Salt length in bytes.
        salt_len: usize,
    },
    /// `ecdsa-with-SHA*`
    Ecdsa(HashAlgorithm),
}

impl SignatureAlgorithm {
    /// Maps a signature `AlgorithmIdentifier` onto a scheme.
    ///
    /// Absent `RSASSA-PSS` parameters take the RFC 4055 defaults: SHA-1,
    /// MGF1 with SHA-1 and a 20 byte salt.
    pub fn from_algorithm_identifier(algorithm: &AlgorithmIdentifierOwned) -> Result<Self> {
        let oid = algorithm.oid;
        let scheme = match oid {
            oid::SHA1_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha1),
            oid::SHA224_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha224),
            oid::SHA256_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha256),
            oid::SHA384_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha384),
            oid::SHA512_WITH_RSA => SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha512),
            oid::ID_RSASSA_PSS => Self::pss_from_parameters(algorithm)?,
            oid::ECDSA_WITH_SHA1 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha1),
            oid::ECDSA_WITH_SHA224 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha224),
            oid::ECDSA_WITH_SHA256 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha256),
            oid::ECDSA_WITH_SHA384 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha384),
            oid::ECDSA_WITH_SHA512 => SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha512),
            oid => return Err(Error::UnsupportedSignatureAlgorithm { oid }),
        };
        trace!("signature algorithm {oid} is {scheme:?}");
        Ok(scheme)
    }

    fn pss_from_parameters(algorithm: &AlgorithmIdentifierOwned) -> Result<Self> {
        let encoded = match &algorithm.parameters {
            Some(any) if any.tag() != Tag::Null => Some(any.to_der()?),
            _ => None,
        };
        let params = match &encoded {
            Some(der) => RsaPssParams::from_der(der)?,
            None => RsaPssParams::default(),
        };

        if params.mask_gen.oid != oid::ID_MGF1 {
            return Err(Error::UnsupportedSignatureAlgorithm {
                oid: params.mask_gen.oid,
            });
        }
        let mgf_hash = match &params.mask_gen.parameters {
            Some(digest) => HashAlgorithm::from_oid(digest.oid)?,
            None => HashAlgorithm::Sha1,
        };

        Ok(SignatureAlgorithm::RsaPss {
            hash: HashAlgorithm::from_oid(params.hash.oid)?,
            mgf_hash,
            salt_len: usize::from(params.salt_len),
        })
    }

    /// Message digest of the scheme.
    pub fn hash(&self) -> HashAlgorithm {
        match *self {
            SignatureAlgorithm::RsaPkcs1v15(hash)
            | SignatureAlgorithm::RsaPss { hash, .. }
            | SignatureAlgorithm::Ecdsa(hash) => hash,
        }
    }

    /// Key family able to verify the scheme.
    pub fn key_algorithm(&self) -> KeyAlgorithm {
        match self {
            SignatureAlgorithm::RsaPkcs1v15(_) | SignatureAlgorithm::RsaPss { .. } => {
                KeyAlgorithm::Rsa
            }
            SignatureAlgorithm::Ecdsa(_) => KeyAlgorithm::Ecdsa,
        }
    }

    /// Algorithm label used in dispatcher and circuit names.
    pub fn label(&self) -> &'static str {
        match self {
            SignatureAlgorithm::RsaPkcs1v15(_) => "RSA",
            SignatureAlgorithm::RsaPss { .. } => "RSAPSS",
            SignatureAlgorithm::Ecdsa(_) => "ECDSA",
        }
    }
}

/// Raw signature bytes as they appear in a certificate or signer info.
#[derive(Clone, PartialEq, Eq)]
pub struct Signature {
    inner: Box<[u8]>,
}

impl SignatureEncoding for Signature {
    type Repr = Box<[u8]>;
}

impl TryFrom<&[u8]> for Signature {
    type Error = ::signature::Error;

    fn try_from(bytes: &[u8]) -> ::signature::Result<Self> {
        if bytes.is_empty() {
            return Err(::signature::Error::new());
        }
        Ok(Self {
            inner: bytes.into(),
        })
    }
}

impl From<Signature> for Box<[u8]> {
    fn from(signature: Signature) -> Box<[u8]> {
        signature.inner
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.inner
    }
}

impl LowerHex for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for byte in self.inner.iter() {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl Debug for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self:x})")
    }
}

/// A public key bound to the scheme it verifies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyingKey {
    key: PublicKey,
    algorithm: SignatureAlgorithm,
}

impl VerifyingKey {
    /// Binds `key` to `algorithm`. The key family must match the scheme.
    pub fn new(key: PublicKey, algorithm: SignatureAlgorithm) -> Result<Self> {
        if key.algorithm() != algorithm.key_algorithm() {
            return Err(Error::UnsupportedAlgorithm {
                reason: format!("{} key cannot verify {}", key.algorithm(), algorithm.label()),
            });
        }
        Ok(Self { key, algorithm })
    }

    /// The scheme.
    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Verifies a signature over a digest computed with
    /// [`SignatureAlgorithm::hash`].
    pub fn verify_digest(&self, digest: &[u8], sig: &[u8]) -> Result<()> {
        match (&self.key, self.algorithm) {
            (PublicKey::Rsa(key), SignatureAlgorithm::RsaPkcs1v15(hash)) => {
                pkcs1v15::verify(key, hash, digest, sig)
            }
            (
                PublicKey::Rsa(key),
                SignatureAlgorithm::RsaPss {
                    hash,
                    mgf_hash,
                    salt_len,
                },
            ) => pss::verify(key, digest, sig, hash, mgf_hash, Some(salt_len)),
            (PublicKey::Ec(key), SignatureAlgorithm::Ecdsa(_)) => {
                let (r, s) = split_ecdsa_signature(sig, key.curve().byte_len())?;
                ecdsa::verify_prehash(key.curve(), key.point(), digest, &r, &s)
            }
            _ => Err(Error::Verification),
        }
    }
}

impl AsRef<PublicKey> for VerifyingKey {
    fn as_ref(&self) -> &PublicKey {
        &self.key
    }
}

impl PrehashVerifier<Signature> for VerifyingKey {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> ::signature::Result<()> {
        self.verify_digest(prehash, signature.as_ref())
            .map_err(|e| e.into())
    }
}

impl Verifier<Signature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> ::signature::Result<()> {
        let digest = self.algorithm.hash().digest(msg);
        self.verify_digest(&digest, signature.as_ref())
            .map_err(|e| e.into())
    }
}

/// Splits an ECDSA signature into `(r, s)`.
///
/// Accepts a DER `Ecdsa-Sig-Value` or the fixed width `r‖s` concatenation.
pub(crate) fn split_ecdsa_signature(sig: &[u8], scalar_len: usize) -> Result<(BigUint, BigUint)> {
    if sig.first() == Some(&0x30) {
        if let Ok(value) = EcdsaSigValue::from_der(sig) {
            return Ok((
                BigUint::from_bytes_be(value.r.as_bytes()),
                BigUint::from_bytes_be(value.s.as_bytes()),
            ));
        }
    }

    if sig.is_empty() || sig.len() % 2 != 0 || sig.len() > 2 * scalar_len {
        return Err(Error::malformed("ECDSA signature is neither DER nor r||s"));
    }
    let (r, s) = sig.split_at(sig.len() / 2);
    Ok((BigUint::from_bytes_be(r), BigUint::from_bytes_be(s)))
}

/// Encodes `(r, s)` as a DER `Ecdsa-Sig-Value`.
pub fn encode_ecdsa_der(r: &BigUint, s: &BigUint) -> Result<Vec<u8>> {
    let value = EcdsaSigValue {
        r: Uint::new(&r.to_bytes_be())?,
        s: Uint::new(&s.to_bytes_be())?,
    };
    Ok(value.to_der()?)
}

/// Brings a signature into the shape consumed by the circuit.
///
/// RSA and RSA-PSS signatures pass through unchanged. ECDSA signatures are
/// decoded, `s` is replaced by `min(s, n - s)` and both scalars are
/// left-padded to the curve's scalar length, giving `r‖s`. Normalizing twice
/// yields the same bytes.
pub fn normalize_signature(
    sig: &[u8],
    algorithm: &SignatureAlgorithm,
    curve: Option<NamedCurve>,
) -> Result<Vec<u8>> {
    if algorithm.key_algorithm() == KeyAlgorithm::Rsa {
        return Ok(sig.to_vec());
    }

    let curve = curve.ok_or(Error::UnsupportedCurve)?;
    let n = curve.order();
    let len = curve.byte_len();
    let (r, s) = split_ecdsa_signature(sig, len)?;

    if r.is_zero() || s.is_zero() || r >= n || s >= n {
        return Err(Error::malformed("ECDSA scalar out of range"));
    }

    let s_neg = &n - &s;
    let s = if s > s_neg { s_neg } else { s };

    let mut out = pad_be(&r.to_bytes_be(), len);
    out.extend_from_slice(&pad_be(&s.to_bytes_be(), len));
    Ok(out)
}

/// Canonical key bytes of a `SubjectPublicKeyInfo`: the unpadded RSA modulus,
/// or `X‖Y` with each coordinate padded to the scalar length.
pub fn extract_canonical_public_key(spki: &SubjectPublicKeyInfoOwned) -> Result<Vec<u8>> {
    Ok(PublicKey::try_from(spki)?.canonical_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use der::asn1::Any;
    use hex_literal::hex;

    fn pss_identifier(params: Option<Any>) -> AlgorithmIdentifierOwned {
        AlgorithmIdentifierOwned {
            oid: oid::ID_RSASSA_PSS,
            parameters: params,
        }
    }

    #[test]
    fn pss_defaults() {
        let alg = SignatureAlgorithm::from_algorithm_identifier(&pss_identifier(None)).unwrap();
        assert_eq!(
            alg,
            SignatureAlgorithm::RsaPss {
                hash: HashAlgorithm::Sha1,
                mgf_hash: HashAlgorithm::Sha1,
                salt_len: 20
            }
        );
        assert_eq!(alg.label(), "RSAPSS");
    }

    #[test]
    fn pss_sha256_parameters() {
        let params = RsaPssParams::new::<sha2::Sha256>(32);
        let any = Any::from_der(&params.to_der().unwrap()).unwrap();
        let alg = SignatureAlgorithm::from_algorithm_identifier(&pss_identifier(Some(any))).unwrap();
        assert_eq!(
            alg,
            SignatureAlgorithm::RsaPss {
                hash: HashAlgorithm::Sha256,
                mgf_hash: HashAlgorithm::Sha256,
                salt_len: 32
            }
        );
    }

    #[test]
    fn unknown_signature_oid() {
        let alg = AlgorithmIdentifierOwned {
            oid: oid::ID_SHA256,
            parameters: None,
        };
        assert!(matches!(
            SignatureAlgorithm::from_algorithm_identifier(&alg),
            Err(Error::UnsupportedSignatureAlgorithm { .. })
        ));
    }

    #[test]
    fn normalize_flips_high_s() {
        let curve = NamedCurve::P256;
        let n = curve.order();
        let r = BigUint::from(5u8);
        let s = &n - BigUint::from(3u8);
        let mut raw = pad_be(&r.to_bytes_be(), 32);
        raw.extend_from_slice(&pad_be(&s.to_bytes_be(), 32));

        let alg = SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha256);
        let normalized = normalize_signature(&raw, &alg, Some(curve)).unwrap();
        assert_eq!(normalized.len(), 64);
        assert_eq!(normalized[31], 5);
        assert_eq!(normalized[63], 3);
        assert_eq!(
            normalize_signature(&normalized, &alg, Some(curve)).unwrap(),
            normalized
        );
    }

    #[test]
    fn normalize_accepts_der() {
        let curve = NamedCurve::BrainpoolP256r1;
        let der = encode_ecdsa_der(&BigUint::from(0x0102u16), &BigUint::from(7u8)).unwrap();
        let alg = SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha1);
        let normalized = normalize_signature(&der, &alg, Some(curve)).unwrap();
        assert_eq!(&normalized[30..32], &hex!("0102"));
        assert_eq!(normalized[63], 7);
    }

    #[test]
    fn normalize_needs_curve() {
        let alg = SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha256);
        assert!(matches!(
            normalize_signature(&[1; 64], &alg, None),
            Err(Error::UnsupportedCurve)
        ));
    }

    #[test]
    fn rsa_signatures_pass_through() {
        let alg = SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha256);
        assert_eq!(normalize_signature(&[9, 8, 7], &alg, None).unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn verifying_key_checks_family() {
        let curve = NamedCurve::P256;
        let key = crate::key::EcPublicKey::new(curve, curve.arithmetic().generator().clone())
            .unwrap();
        let alg = SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha256);
        assert!(VerifyingKey::new(PublicKey::Ec(key), alg).is_err());
    }

    #[test]
    fn ecdsa_verifying_key() {
        let curve = NamedCurve::P384;
        let d = BigUint::from(0x5eedu32);
        let arithmetic = curve.arithmetic();
        let q = arithmetic.mul(&d, arithmetic.generator());
        let key = PublicKey::Ec(crate::key::EcPublicKey::new(curve, q).unwrap());
        let alg = SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha384);

        let msg = b"tbsCertificate";
        let digest = alg.hash().digest(msg);
        let (r, s) = ecdsa::sign_prehash(curve, &d, &BigUint::from(31337u32), &digest).unwrap();
        let sig = Signature::try_from(encode_ecdsa_der(&r, &s).unwrap().as_slice()).unwrap();

        let verifier = VerifyingKey::new(key, alg).unwrap();
        assert!(verifier.verify(msg, &sig).is_ok());
        assert!(verifier.verify(b"other", &sig).is_err());
    }
}
