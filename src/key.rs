use alloc::vec::Vec;
use core::fmt;
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive};

use crate::algorithms::pad::pad_be;
use crate::curve::{AffinePoint, NamedCurve};
use crate::errors::{Error, Result};
use crate::traits::PublicKeyParts;

/// Represents the public part of an RSA key.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RsaPublicKey {
    /// Modulus: product of prime numbers `p` and `q`
    n: BigUint,
    /// Public exponent: power to which a plaintext message is raised in
    /// order to encrypt it.
    ///
    /// Typically 0x10001 (65537)
    e: BigUint,
}

impl PublicKeyParts for RsaPublicKey {
    fn n(&self) -> &BigUint {
        &self.n
    }

    fn e(&self) -> &BigUint {
        &self.e
    }
}

impl RsaPublicKey {
    /// Minimum value of the public exponent `e`.
    pub const MIN_PUB_EXPONENT: u64 = 2;

    /// Maximum value of the public exponent `e`.
    pub const MAX_PUB_EXPONENT: u64 = (1 << 33) - 1;

    /// Maximum size of the modulus `n` in bits. Document signers never exceed
    /// 4096-bit keys, some CSCAs go up to 8192.
    pub const MAX_SIZE: usize = 8192;

    /// Create a new public key from its components.
    pub fn new(n: BigUint, e: BigUint) -> Result<Self> {
        let k = Self { n, e };
        check_public(&k)?;
        Ok(k)
    }

    /// Big-endian modulus without a sign byte.
    pub fn modulus_bytes(&self) -> Vec<u8> {
        self.n.to_bytes_be()
    }

    /// Whether the public exponent equals `3`.
    pub fn has_exponent_three(&self) -> bool {
        self.e.to_u64() == Some(3)
    }
}

/// Check that the public key is well formed and has an exponent within acceptable bounds.
#[inline]
fn check_public(public_key: &impl PublicKeyParts) -> Result<()> {
    if public_key.n().bits() > RsaPublicKey::MAX_SIZE {
        return Err(Error::malformed("RSA modulus too large"));
    }
    if public_key.n() <= &BigUint::one() {
        return Err(Error::malformed("invalid RSA modulus"));
    }

    let e = public_key
        .e()
        .to_u64()
        .ok_or_else(|| Error::malformed("public exponent too large"))?;
    if e < RsaPublicKey::MIN_PUB_EXPONENT {
        return Err(Error::malformed("public exponent too small"));
    }
    if e > RsaPublicKey::MAX_PUB_EXPONENT {
        return Err(Error::malformed("public exponent too large"));
    }
    Ok(())
}

/// An elliptic curve public point bound to its curve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcPublicKey {
    curve: NamedCurve,
    point: AffinePoint,
}

impl EcPublicKey {
    /// Wraps a point, rejecting the identity and points off the curve.
    pub fn new(curve: NamedCurve, point: AffinePoint) -> Result<Self> {
        if point.is_identity() || !curve.arithmetic().is_on_curve(&point) {
            return Err(Error::malformed("point is not on the curve"));
        }
        Ok(Self { curve, point })
    }

    /// Decodes an SEC1 encoded point.
    pub fn from_sec1_bytes(curve: NamedCurve, bytes: &[u8]) -> Result<Self> {
        let point = curve.decode_point(bytes)?;
        Self::new(curve, point)
    }

    /// The curve this key lives on.
    pub fn curve(&self) -> NamedCurve {
        self.curve
    }

    /// The public point.
    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    fn coordinate(&self, pick_y: bool) -> Vec<u8> {
        match self.point.coordinates() {
            Some((x, y)) => {
                let v = if pick_y { y } else { x };
                pad_be(&v.to_bytes_be(), self.curve.byte_len())
            }
            None => Vec::new(),
        }
    }

    /// X coordinate, zero-padded to the scalar length.
    pub fn x_bytes(&self) -> Vec<u8> {
        self.coordinate(false)
    }

    /// Y coordinate, zero-padded to the scalar length.
    pub fn y_bytes(&self) -> Vec<u8> {
        self.coordinate(true)
    }

    /// Uncompressed SEC1 encoding.
    pub fn to_sec1_bytes(&self) -> Result<Vec<u8>> {
        self.curve.encode_point(&self.point)
    }
}

/// Algorithm family of a public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA, used with PKCS#1 v1.5 or PSS.
    Rsa,
    /// ECDSA over a prime curve.
    Ecdsa,
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::Ecdsa => "ECDSA",
        })
    }
}

/// Public key of a document signer, CSCA or Active Authentication chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicKey {
    /// RSA key.
    Rsa(RsaPublicKey),
    /// Elliptic curve key.
    Ec(EcPublicKey),
}

impl PublicKey {
    /// Algorithm family.
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            PublicKey::Rsa(_) => KeyAlgorithm::Rsa,
            PublicKey::Ec(_) => KeyAlgorithm::Ecdsa,
        }
    }

    /// Canonical key bytes: the unpadded RSA modulus, or `X‖Y` with both
    /// coordinates padded to the scalar length.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            PublicKey::Rsa(key) => key.modulus_bytes(),
            PublicKey::Ec(key) => {
                let mut out = key.x_bytes();
                out.extend_from_slice(&key.y_bytes());
                out
            }
        }
    }

    /// Modulus bits for RSA, field bits for EC.
    pub fn bits(&self) -> usize {
        match self {
            PublicKey::Rsa(key) => key.bits(),
            PublicKey::Ec(key) => key.curve().field_bits(),
        }
    }

    /// The curve of an EC key.
    pub fn curve(&self) -> Option<NamedCurve> {
        match self {
            PublicKey::Rsa(_) => None,
            PublicKey::Ec(key) => Some(key.curve()),
        }
    }

    /// Returns the RSA key, if this is one.
    pub fn as_rsa(&self) -> Option<&RsaPublicKey> {
        match self {
            PublicKey::Rsa(key) => Some(key),
            PublicKey::Ec(_) => None,
        }
    }
}

impl From<RsaPublicKey> for PublicKey {
    fn from(key: RsaPublicKey) -> Self {
        PublicKey::Rsa(key)
    }
}

impl From<EcPublicKey> for PublicKey {
    fn from(key: EcPublicKey) -> Self {
        PublicKey::Ec(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::FromPrimitive;

    fn default_exponent() -> BigUint {
        BigUint::from(65537u32)
    }

    #[test]
    fn test_check_public() {
        let n = BigUint::from_u64(0xC5B1_7D6B).unwrap();
        assert!(RsaPublicKey::new(n.clone(), default_exponent()).is_ok());
        assert!(RsaPublicKey::new(n.clone(), BigUint::one()).is_err());
        assert!(RsaPublicKey::new(n, BigUint::from_u64(1 << 34).unwrap()).is_err());
        assert!(RsaPublicKey::new(BigUint::one(), default_exponent()).is_err());
    }

    #[test]
    fn exponent_three() {
        let n = BigUint::from_u64(0xC5B1_7D6B).unwrap();
        let key = RsaPublicKey::new(n, BigUint::from_u64(3).unwrap()).unwrap();
        assert!(key.has_exponent_three());
        assert_eq!(key.size(), 4);
    }

    #[test]
    fn ec_canonical_bytes_are_padded() {
        let curve = NamedCurve::P521;
        let g = curve.arithmetic().generator().clone();
        let key = PublicKey::Ec(EcPublicKey::new(curve, g).unwrap());
        let bytes = key.canonical_bytes();
        assert_eq!(bytes.len(), 132);
        // gx of P-521 starts with a zero byte once padded
        assert_eq!(bytes[0], 0x00);
        assert_eq!(key.bits(), 521);
        assert_eq!(key.algorithm(), KeyAlgorithm::Ecdsa);
    }

    #[test]
    fn identity_is_rejected() {
        assert!(EcPublicKey::new(NamedCurve::P256, AffinePoint::Identity).is_err());
    }
}
