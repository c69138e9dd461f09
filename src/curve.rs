//! Registry of the elliptic curves found in document signer and CSCA keys.

mod params;
mod point;

pub use self::params::CurveParams;
pub use self::point::{AffinePoint, WeierstrassCurve};
pub(crate) use self::point::invert;

use alloc::vec::Vec;
use const_oid::ObjectIdentifier;
use num_bigint::BigUint;

use crate::algorithms::pad::pad_be;
use crate::errors::{Error, Result};
use crate::oid;

/// A closed set of prime curves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum NamedCurve {
    P192,
    P224,
    P256,
    P384,
    P521,
    BrainpoolP160r1,
    BrainpoolP160t1,
    BrainpoolP192r1,
    BrainpoolP192t1,
    BrainpoolP224r1,
    BrainpoolP224t1,
    BrainpoolP256r1,
    BrainpoolP256t1,
    BrainpoolP320r1,
    BrainpoolP320t1,
    BrainpoolP384r1,
    BrainpoolP384t1,
    BrainpoolP512r1,
    BrainpoolP512t1,
}

/// Explicit `SpecifiedECDomain` values as encoded in a certificate.
#[derive(Debug, Clone, Copy)]
pub struct ExplicitDomain<'a> {
    /// Field prime, big-endian.
    pub prime: &'a [u8],
    /// Coefficient `a`, big-endian.
    pub a: &'a [u8],
    /// Coefficient `b`, big-endian.
    pub b: &'a [u8],
    /// Encoded base point.
    pub generator: &'a [u8],
}

impl NamedCurve {
    /// Every supported curve, NIST first.
    pub const ALL: [NamedCurve; 19] = [
        NamedCurve::P192,
        NamedCurve::P224,
        NamedCurve::P256,
        NamedCurve::P384,
        NamedCurve::P521,
        NamedCurve::BrainpoolP160r1,
        NamedCurve::BrainpoolP160t1,
        NamedCurve::BrainpoolP192r1,
        NamedCurve::BrainpoolP192t1,
        NamedCurve::BrainpoolP224r1,
        NamedCurve::BrainpoolP224t1,
        NamedCurve::BrainpoolP256r1,
        NamedCurve::BrainpoolP256t1,
        NamedCurve::BrainpoolP320r1,
        NamedCurve::BrainpoolP320t1,
        NamedCurve::BrainpoolP384r1,
        NamedCurve::BrainpoolP384t1,
        NamedCurve::BrainpoolP512r1,
        NamedCurve::BrainpoolP512t1,
    ];

    /// Domain parameters.
    pub fn params(&self) -> &'static CurveParams {
        match self {
            NamedCurve::P192 => &params::P192,
            NamedCurve::P224 => &params::P224,
            NamedCurve::P256 => &params::P256,
            NamedCurve::P384 => &params::P384,
            NamedCurve::P521 => &params::P521,
            NamedCurve::BrainpoolP160r1 => &params::BRAINPOOL_P160R1,
            NamedCurve::BrainpoolP160t1 => &params::BRAINPOOL_P160T1,
            NamedCurve::BrainpoolP192r1 => &params::BRAINPOOL_P192R1,
            NamedCurve::BrainpoolP192t1 => &params::BRAINPOOL_P192T1,
            NamedCurve::BrainpoolP224r1 => &params::BRAINPOOL_P224R1,
            NamedCurve::BrainpoolP224t1 => &params::BRAINPOOL_P224T1,
            NamedCurve::BrainpoolP256r1 => &params::BRAINPOOL_P256R1,
            NamedCurve::BrainpoolP256t1 => &params::BRAINPOOL_P256T1,
            NamedCurve::BrainpoolP320r1 => &params::BRAINPOOL_P320R1,
            NamedCurve::BrainpoolP320t1 => &params::BRAINPOOL_P320T1,
            NamedCurve::BrainpoolP384r1 => &params::BRAINPOOL_P384R1,
            NamedCurve::BrainpoolP384t1 => &params::BRAINPOOL_P384T1,
            NamedCurve::BrainpoolP512r1 => &params::BRAINPOOL_P512R1,
            NamedCurve::BrainpoolP512t1 => &params::BRAINPOOL_P512T1,
        }
    }

    /// Named curve OID.
    pub fn oid(&self) -> ObjectIdentifier {
        match self {
            NamedCurve::P192 => oid::SECP192R1,
            NamedCurve::P224 => oid::SECP224R1,
            NamedCurve::P256 => oid::SECP256R1,
            NamedCurve::P384 => oid::SECP384R1,
            NamedCurve::P521 => oid::SECP521R1,
            NamedCurve::BrainpoolP160r1 => oid::BRAINPOOL_P160R1,
            NamedCurve::BrainpoolP160t1 => oid::BRAINPOOL_P160T1,
            NamedCurve::BrainpoolP192r1 => oid::BRAINPOOL_P192R1,
            NamedCurve::BrainpoolP192t1 => oid::BRAINPOOL_P192T1,
            NamedCurve::BrainpoolP224r1 => oid::BRAINPOOL_P224R1,
            NamedCurve::BrainpoolP224t1 => oid::BRAINPOOL_P224T1,
            NamedCurve::BrainpoolP256r1 => oid::BRAINPOOL_P256R1,
            NamedCurve::BrainpoolP256t1 => oid::BRAINPOOL_P256T1,
            NamedCurve::BrainpoolP320r1 => oid::BRAINPOOL_P320R1,
            NamedCurve::BrainpoolP320t1 => oid::BRAINPOOL_P320T1,
            NamedCurve::BrainpoolP384r1 => oid::BRAINPOOL_P384R1,
            NamedCurve::BrainpoolP384t1 => oid::BRAINPOOL_P384T1,
            NamedCurve::BrainpoolP512r1 => oid::BRAINPOOL_P512R1,
            NamedCurve::BrainpoolP512t1 => oid::BRAINPOOL_P512T1,
        }
    }

    /// Conventional lowercase name, e.g. `secp256r1` or `brainpoolP256r1`.
    pub fn name(&self) -> &'static str {
        match self {
            NamedCurve::P192 => "secp192r1",
            NamedCurve::P224 => "secp224r1",
            NamedCurve::P256 => "secp256r1",
            NamedCurve::P384 => "secp384r1",
            NamedCurve::P521 => "secp521r1",
            NamedCurve::BrainpoolP160r1 => "brainpoolP160r1",
            NamedCurve::BrainpoolP160t1 => "brainpoolP160t1",
            NamedCurve::BrainpoolP192r1 => "brainpoolP192r1",
            NamedCurve::BrainpoolP192t1 => "brainpoolP192t1",
            NamedCurve::BrainpoolP224r1 => "brainpoolP224r1",
            NamedCurve::BrainpoolP224t1 => "brainpoolP224t1",
            NamedCurve::BrainpoolP256r1 => "brainpoolP256r1",
            NamedCurve::BrainpoolP256t1 => "brainpoolP256t1",
            NamedCurve::BrainpoolP320r1 => "brainpoolP320r1",
            NamedCurve::BrainpoolP320t1 => "brainpoolP320t1",
            NamedCurve::BrainpoolP384r1 => "brainpoolP384r1",
            NamedCurve::BrainpoolP384t1 => "brainpoolP384t1",
            NamedCurve::BrainpoolP512r1 => "brainpoolP512r1",
            NamedCurve::BrainpoolP512t1 => "brainpoolP512t1",
        }
    }

    /// Looks up a named curve OID.
    pub fn from_oid(oid: ObjectIdentifier) -> Option<Self> {
        Self::ALL.into_iter().find(|curve| curve.oid() == oid)
    }

    /// Identifies a curve from explicit domain parameters.
    ///
    /// Prime and coefficients must match exactly. When the generator is
    /// present it must encode the curve's base point.
    pub fn from_explicit(domain: &ExplicitDomain<'_>) -> Option<Self> {
        let prime = BigUint::from_bytes_be(domain.prime);
        let a = BigUint::from_bytes_be(domain.a);
        let b = BigUint::from_bytes_be(domain.b);

        Self::ALL.into_iter().find(|curve| {
            let params = curve.params();
            BigUint::from_bytes_be(params.p) == prime
                && BigUint::from_bytes_be(params.a) == a
                && BigUint::from_bytes_be(params.b) == b
                && (domain.generator.is_empty() || curve.is_generator(domain.generator))
        })
    }

    /// Guesses the curve from the bit length of an uncompressed public point.
    ///
    /// Several curves share a field size, the encoded generator of an explicit
    /// domain picks among them. Without a matching generator the NIST curve of
    /// that size wins, then the Brainpool r1 curve.
    pub fn from_public_key_bits(bits: usize, generator: Option<&[u8]>) -> Option<Self> {
        let field_len = match bits {
            // P-521 points are sometimes counted without the leading zero bits.
            1050 => 66,
            bits if bits % 8 == 0 && bits > 8 && (bits / 8 - 1) % 2 == 0 => (bits / 8 - 1) / 2,
            _ => return None,
        };

        let mut candidates = Self::ALL
            .into_iter()
            .filter(|curve| curve.field_len() == field_len)
            .peekable();
        let first = *candidates.peek()?;

        if let Some(generator) = generator {
            if let Some(curve) = candidates.find(|curve| curve.is_generator(generator)) {
                return Some(curve);
            }
        }
        Some(first)
    }

    fn is_generator(&self, encoded: &[u8]) -> bool {
        let params = self.params();
        let mut gxy = Vec::with_capacity(params.gx.len() * 2);
        gxy.extend_from_slice(params.gx);
        gxy.extend_from_slice(params.gy);

        match encoded.first() {
            Some(0x04) => encoded[1..] == gxy[..],
            Some(0x02) | Some(0x03) => encoded[1..] == *params.gx,
            _ => crate::encoding::find_subslice(encoded, &gxy).is_some(),
        }
    }

    /// Length in bytes of a field element.
    pub fn field_len(&self) -> usize {
        self.params().p.len()
    }

    /// Length in bytes of a scalar, `ceil(bitlen(n) / 8)`.
    pub fn byte_len(&self) -> usize {
        self.order_bits().div_ceil(8)
    }

    /// Bit length of the group order.
    pub fn order_bits(&self) -> usize {
        BigUint::from_bytes_be(self.params().n).bits()
    }

    /// Bit length of the field prime.
    pub fn field_bits(&self) -> usize {
        BigUint::from_bytes_be(self.params().p).bits()
    }

    /// Group order.
    pub fn order(&self) -> BigUint {
        BigUint::from_bytes_be(self.params().n)
    }

    /// Big integer view of the domain parameters.
    pub fn arithmetic(&self) -> WeierstrassCurve {
        WeierstrassCurve::from(self.params())
    }

    /// Decodes an SEC1 point (`04‖X‖Y`, or `02/03‖X`) and checks it lies on
    /// the curve.
    pub fn decode_point(&self, bytes: &[u8]) -> Result<AffinePoint> {
        let len = self.field_len();
        let curve = self.arithmetic();

        let point = match bytes.first() {
            Some(0x04) if bytes.len() == 1 + 2 * len => AffinePoint::Point {
                x: BigUint::from_bytes_be(&bytes[1..1 + len]),
                y: BigUint::from_bytes_be(&bytes[1 + len..]),
            },
            Some(tag @ (0x02 | 0x03)) if bytes.len() == 1 + len => {
                let x = BigUint::from_bytes_be(&bytes[1..]);
                curve
                    .decompress(&x, *tag == 0x03)
                    .ok_or_else(|| Error::malformed("point is not on the curve"))?
            }
            _ => return Err(Error::malformed("invalid elliptic curve point encoding")),
        };

        if !curve.is_on_curve(&point) {
            return Err(Error::malformed("point is not on the curve"));
        }
        Ok(point)
    }

    /// Uncompressed SEC1 encoding of a finite point.
    pub fn encode_point(&self, point: &AffinePoint) -> Result<Vec<u8>> {
        let (x, y) = point
            .coordinates()
            .ok_or_else(|| Error::malformed("cannot encode the point at infinity"))?;
        let len = self.field_len();
        let mut out = Vec::with_capacity(1 + 2 * len);
        out.push(0x04);
        out.extend_from_slice(&pad_be(&x.to_bytes_be(), len));
        out.extend_from_slice(&pad_be(&y.to_bytes_be(), len));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_generator_has_prime_order() {
        for curve in NamedCurve::ALL {
            let arith = curve.arithmetic();
            assert!(arith.is_on_curve(arith.generator()), "{}", curve.name());
            assert!(
                arith.mul(arith.n(), arith.generator()).is_identity(),
                "{}",
                curve.name()
            );
        }
    }

    #[test]
    fn twisted_curves_share_the_field() {
        let r1 = NamedCurve::BrainpoolP256r1.arithmetic();
        let t1 = NamedCurve::BrainpoolP256t1.arithmetic();
        assert_eq!(r1.p(), t1.p());
        assert_eq!(r1.n(), t1.n());
        assert_eq!(&t1.a + 3u32, t1.p().clone());
    }

    #[test]
    fn byte_lengths() {
        assert_eq!(NamedCurve::P521.byte_len(), 66);
        assert_eq!(NamedCurve::P256.byte_len(), 32);
        assert_eq!(NamedCurve::BrainpoolP320r1.byte_len(), 40);
        assert_eq!(NamedCurve::BrainpoolP160r1.order_bits(), 160);
    }

    #[test]
    fn oid_lookup() {
        for curve in NamedCurve::ALL {
            assert_eq!(NamedCurve::from_oid(curve.oid()), Some(curve));
        }
        assert_eq!(NamedCurve::from_oid(oid::ID_PRIME_FIELD), None);
    }

    #[test]
    fn explicit_domain_lookup() {
        for curve in NamedCurve::ALL {
            let params = curve.params();
            let g = curve.encode_point(curve.arithmetic().generator()).unwrap();
            let domain = ExplicitDomain {
                prime: params.p,
                a: params.a,
                b: params.b,
                generator: &g,
            };
            assert_eq!(NamedCurve::from_explicit(&domain), Some(curve));
        }
    }

    #[test]
    fn bit_length_fallback() {
        let g = NamedCurve::BrainpoolP256t1
            .encode_point(NamedCurve::BrainpoolP256t1.arithmetic().generator())
            .unwrap();
        assert_eq!(
            NamedCurve::from_public_key_bits(520, Some(&g)),
            Some(NamedCurve::BrainpoolP256t1)
        );
        assert_eq!(NamedCurve::from_public_key_bits(520, None), Some(NamedCurve::P256));
        assert_eq!(NamedCurve::from_public_key_bits(392, None), Some(NamedCurve::P192));
        assert_eq!(NamedCurve::from_public_key_bits(1064, None), Some(NamedCurve::P521));
        assert_eq!(NamedCurve::from_public_key_bits(1050, None), Some(NamedCurve::P521));
        assert_eq!(
            NamedCurve::from_public_key_bits(1032, None),
            Some(NamedCurve::BrainpoolP512r1)
        );
        assert_eq!(NamedCurve::from_public_key_bits(100, None), None);
    }

    #[test]
    fn point_codec() {
        let curve = NamedCurve::P384;
        let g = curve.arithmetic().generator().clone();
        let encoded = curve.encode_point(&g).unwrap();
        assert_eq!(encoded.len(), 97);
        assert_eq!(curve.decode_point(&encoded).unwrap(), g);

        let mut compressed = vec![0x02];
        compressed.extend_from_slice(&encoded[1..49]);
        let (_, gy) = g.coordinates().unwrap();
        if num_integer::Integer::is_odd(gy) {
            compressed[0] = 0x03;
        }
        assert_eq!(curve.decode_point(&compressed).unwrap(), g);

        let mut off_curve = encoded.clone();
        off_curve[96] ^= 1;
        assert!(curve.decode_point(&off_curve).is_err());
    }
}
