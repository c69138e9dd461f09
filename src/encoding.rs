//! DER decoding of public keys, EC domain parameters and ICAO data group
//! wrappers.
//!
//! Certificates and CMS structures are handled by the `x509-cert` and `cms`
//! crates; this module covers what those leave to the application.

use alloc::vec::Vec;
use der::asn1::{Any, AnyRef, BitString, Null, OctetString, Uint};
use der::{Decode, Encode, Sequence, Tag, TagNumber, Tagged};
use num_bigint::BigUint;
use spki::{AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned};

use crate::curve::{ExplicitDomain, NamedCurve};
use crate::errors::{Error, Result};
use crate::key::{EcPublicKey, KeyAlgorithm, PublicKey, RsaPublicKey};
use crate::oid;

/// `FieldID` of an explicit curve.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct FieldId {
    /// `prime-field` for every curve this crate supports.
    pub field_type: ObjectIdentifier,
    /// `Prime-p` for prime fields.
    pub parameters: Any,
}

/// `Curve` coefficients of an explicit curve.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct CurveCoefficients {
    /// Coefficient `a` as a field element.
    pub a: OctetString,
    /// Coefficient `b` as a field element.
    pub b: OctetString,
    /// Optional generation seed.
    #[asn1(optional = "true")]
    pub seed: Option<BitString>,
}

/// `SpecifiedECDomain` from RFC 3279 / SEC 1.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct SpecifiedEcDomain {
    /// Always `1`.
    pub version: u8,
    /// Underlying field.
    pub field_id: FieldId,
    /// Curve coefficients.
    pub curve: CurveCoefficients,
    /// Encoded base point.
    pub base: OctetString,
    /// Order of the base point.
    pub order: Uint,
    /// Cofactor.
    #[asn1(optional = "true")]
    pub cofactor: Option<Uint>,
}

/// `ECParameters` as carried in `AlgorithmIdentifier.parameters`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EcParameters {
    /// `namedCurve`
    Named(ObjectIdentifier),
    /// `specifiedCurve`
    Specified(SpecifiedEcDomain),
    /// `implicitCA` or no parameters at all.
    Implicit,
}

impl EcParameters {
    /// Interprets the parameters of an `id-ecPublicKey` algorithm identifier.
    pub fn from_algorithm_parameters(parameters: Option<&Any>) -> Result<Self> {
        let parameters = match parameters {
            None => return Ok(EcParameters::Implicit),
            Some(any) => any,
        };

        match parameters.tag() {
            Tag::ObjectIdentifier => Ok(EcParameters::Named(parameters.decode_as()?)),
            Tag::Sequence => Ok(EcParameters::Specified(SpecifiedEcDomain::from_der(
                &parameters.to_der()?,
            )?)),
            Tag::Null => Ok(EcParameters::Implicit),
            _ => Err(Error::UnsupportedCurve),
        }
    }

    /// Resolves the curve, falling back to the bit length of the public
    /// point when the domain is implicit or not recognised.
    pub fn curve(&self, public_point: &[u8]) -> Result<NamedCurve> {
        let bits = public_point.len() * 8;
        match self {
            EcParameters::Named(oid) => NamedCurve::from_oid(*oid).ok_or(Error::UnsupportedCurve),
            EcParameters::Specified(domain) => {
                if domain.field_id.field_type != oid::ID_PRIME_FIELD {
                    return Err(Error::UnsupportedCurve);
                }
                let prime: Uint = domain.field_id.parameters.decode_as()?;
                let explicit = ExplicitDomain {
                    prime: prime.as_bytes(),
                    a: domain.curve.a.as_bytes(),
                    b: domain.curve.b.as_bytes(),
                    generator: domain.base.as_bytes(),
                };
                NamedCurve::from_explicit(&explicit)
                    .or_else(|| {
                        log::debug!("explicit EC domain not recognised, guessing from {bits} bit point");
                        NamedCurve::from_public_key_bits(bits, Some(domain.base.as_bytes()))
                    })
                    .ok_or(Error::UnsupportedCurve)
            }
            EcParameters::Implicit => {
                NamedCurve::from_public_key_bits(bits, None).ok_or(Error::UnsupportedCurve)
            }
        }
    }
}

/// `Ecdsa-Sig-Value ::= SEQUENCE { r INTEGER, s INTEGER }`
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct EcdsaSigValue {
    /// `r`
    pub r: Uint,
    /// `s`
    pub s: Uint,
}

/// Verify that the `AlgorithmIdentifier` of a public key is one we can use
/// and return its family.
pub(crate) fn verify_algorithm_id(algorithm: &AlgorithmIdentifierOwned) -> Result<KeyAlgorithm> {
    match algorithm.oid {
        oid::RSA_ENCRYPTION => {
            if let Some(parameters) = &algorithm.parameters {
                if parameters.tag() != Tag::Null {
                    return Err(Error::Spki(spki::Error::KeyMalformed));
                }
            }
            Ok(KeyAlgorithm::Rsa)
        }
        oid::ID_RSASSA_PSS => Ok(KeyAlgorithm::Rsa),
        oid::ID_EC_PUBLIC_KEY => Ok(KeyAlgorithm::Ecdsa),
        oid => Err(Error::UnsupportedPublicKeyAlgorithm { oid }),
    }
}

fn subject_public_key_bytes(spki: &SubjectPublicKeyInfoOwned) -> Result<&[u8]> {
    spki.subject_public_key
        .as_bytes()
        .ok_or(Error::Spki(spki::Error::KeyMalformed))
}

impl TryFrom<&SubjectPublicKeyInfoOwned> for RsaPublicKey {
    type Error = Error;

    fn try_from(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        if verify_algorithm_id(&spki.algorithm)? != KeyAlgorithm::Rsa {
            return Err(Error::UnsupportedPublicKeyAlgorithm {
                oid: spki.algorithm.oid,
            });
        }

        let pkcs1_key = pkcs1::RsaPublicKey::try_from(subject_public_key_bytes(spki)?)?;
        let n = BigUint::from_bytes_be(pkcs1_key.modulus.as_bytes());
        let e = BigUint::from_bytes_be(pkcs1_key.public_exponent.as_bytes());
        RsaPublicKey::new(n, e)
    }
}

impl TryFrom<&SubjectPublicKeyInfoOwned> for EcPublicKey {
    type Error = Error;

    fn try_from(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        if verify_algorithm_id(&spki.algorithm)? != KeyAlgorithm::Ecdsa {
            return Err(Error::UnsupportedPublicKeyAlgorithm {
                oid: spki.algorithm.oid,
            });
        }

        let point = subject_public_key_bytes(spki)?;
        let parameters = EcParameters::from_algorithm_parameters(spki.algorithm.parameters.as_ref())?;
        let curve = parameters.curve(point)?;
        EcPublicKey::from_sec1_bytes(curve, point)
    }
}

impl TryFrom<&SubjectPublicKeyInfoOwned> for PublicKey {
    type Error = Error;

    fn try_from(spki: &SubjectPublicKeyInfoOwned) -> Result<Self> {
        match verify_algorithm_id(&spki.algorithm)? {
            KeyAlgorithm::Rsa => Ok(PublicKey::Rsa(RsaPublicKey::try_from(spki)?)),
            KeyAlgorithm::Ecdsa => Ok(PublicKey::Ec(EcPublicKey::try_from(spki)?)),
        }
    }
}

impl PublicKey {
    /// Decodes a DER `SubjectPublicKeyInfo`.
    pub fn from_public_key_der(bytes: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoOwned::from_der(bytes)?;
        PublicKey::try_from(&spki)
    }
}

/// Strips an ICAO application-tagged wrapper such as `0x6F` (DG15) or
/// `0x77` (EF.SOD). Input that does not carry `expected` is returned as is.
pub(crate) fn strip_application_tag(bytes: &[u8], expected: TagNumber) -> Result<&[u8]> {
    match bytes.first() {
        Some(&first) if first == (0x60 | expected.value()) => {
            let any = AnyRef::from_der(bytes)?;
            Ok(any.value())
        }
        _ => Ok(bytes),
    }
}

/// Active Authentication public key read from data group 15.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dg15 {
    spki: SubjectPublicKeyInfoOwned,
    key: PublicKey,
}

impl Dg15 {
    /// Parses DG15, with or without its `0x6F` wrapper.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let inner = strip_application_tag(bytes, TagNumber::N15)?;
        let spki = SubjectPublicKeyInfoOwned::from_der(inner)?;
        let key = PublicKey::try_from(&spki)?;
        Ok(Self { spki, key })
    }

    /// The decoded key.
    pub fn public_key(&self) -> &PublicKey {
        &self.key
    }

    /// DER encoded `SubjectPublicKeyInfo`.
    pub fn to_public_key_der(&self) -> Result<Vec<u8>> {
        Ok(self.spki.to_der()?)
    }

    /// PEM encoded `SubjectPublicKeyInfo` (`-----BEGIN PUBLIC KEY-----`).
    #[cfg(feature = "pem")]
    pub fn to_public_key_pem(&self) -> Result<alloc::string::String> {
        let der = self.to_public_key_der()?;
        der::pem::encode_string("PUBLIC KEY", der::pem::LineEnding::LF, &der)
            .map_err(|err| Error::Asn1(err.into()))
    }
}

/// `NULL` parameters, as required after `rsaEncryption`.
/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

pub(crate) fn null_parameters() -> Result<Any> {
    Ok(Any::encode_from(&Null)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subslice_positions() {
        assert_eq!(find_subslice(&[1, 2, 3, 2, 3], &[2, 3]), Some(1));
        assert_eq!(find_subslice(&[1, 2], &[2, 3]), None);
        assert_eq!(find_subslice(&[1, 2], &[]), None);
        assert_eq!(find_subslice(&[1], &[1, 1]), None);
    }
    use crate::traits::PublicKeyParts;

    fn ec_spki(curve: NamedCurve, parameters: Option<Any>) -> SubjectPublicKeyInfoOwned {
        let g = curve.encode_point(curve.arithmetic().generator()).unwrap();
        SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: oid::ID_EC_PUBLIC_KEY,
                parameters,
            },
            subject_public_key: BitString::from_bytes(&g).unwrap(),
        }
    }

    #[test]
    fn named_curve_key() {
        let params = Any::encode_from(&oid::BRAINPOOL_P384R1).unwrap();
        let spki = ec_spki(NamedCurve::BrainpoolP384r1, Some(params));
        let key = PublicKey::try_from(&spki).unwrap();
        assert_eq!(key.curve(), Some(NamedCurve::BrainpoolP384r1));
        assert_eq!(key.canonical_bytes().len(), 96);
    }

    #[test]
    fn explicit_curve_key() {
        let curve = NamedCurve::BrainpoolP256t1;
        let params = curve.params();
        let g = curve.encode_point(curve.arithmetic().generator()).unwrap();
        let domain = SpecifiedEcDomain {
            version: 1,
            field_id: FieldId {
                field_type: oid::ID_PRIME_FIELD,
                parameters: Any::encode_from(&Uint::new(params.p).unwrap()).unwrap(),
            },
            curve: CurveCoefficients {
                a: OctetString::new(params.a).unwrap(),
                b: OctetString::new(params.b).unwrap(),
                seed: None,
            },
            base: OctetString::new(g).unwrap(),
            order: Uint::new(params.n).unwrap(),
            cofactor: Some(Uint::new(&[1]).unwrap()),
        };
        let any = Any::from_der(&domain.to_der().unwrap()).unwrap();
        let spki = ec_spki(curve, Some(any));
        let key = PublicKey::try_from(&spki).unwrap();
        assert_eq!(key.curve(), Some(curve));
    }

    #[test]
    fn implicit_curve_key() {
        let spki = ec_spki(NamedCurve::P192, None);
        let key = PublicKey::try_from(&spki).unwrap();
        assert_eq!(key.curve(), Some(NamedCurve::P192));
    }

    #[test]
    fn rsa_key() {
        let n = [0xC5u8, 0xB1, 0x7D, 0x6B, 0x01];
        let pkcs1 = pkcs1::RsaPublicKey {
            modulus: pkcs1::UintRef::new(&n).unwrap(),
            public_exponent: pkcs1::UintRef::new(&[0x01, 0x00, 0x01]).unwrap(),
        }
        .to_der()
        .unwrap();
        let spki = SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: oid::RSA_ENCRYPTION,
                parameters: Some(null_parameters().unwrap()),
            },
            subject_public_key: BitString::from_bytes(&pkcs1).unwrap(),
        };
        let key = PublicKey::from_public_key_der(&spki.to_der().unwrap()).unwrap();
        let rsa = key.as_rsa().unwrap();
        assert_eq!(rsa.n().to_bytes_be(), n.to_vec());
        assert_eq!(rsa.e(), &BigUint::from(65537u32));
    }

    #[test]
    fn unsupported_key_algorithm() {
        let spki = SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: oid::ID_SHA256,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&[1, 2, 3]).unwrap(),
        };
        assert!(matches!(
            PublicKey::try_from(&spki),
            Err(Error::UnsupportedPublicKeyAlgorithm { .. })
        ));
    }

    #[test]
    fn dg15_wrapper() {
        let params = Any::encode_from(&oid::SECP256R1).unwrap();
        let spki = ec_spki(NamedCurve::P256, Some(params)).to_der().unwrap();
        // 91 bytes, short form length
        let mut dg15 = vec![0x6F, spki.len() as u8];
        dg15.extend_from_slice(&spki);
        let parsed = Dg15::parse(&dg15).unwrap();
        assert_eq!(parsed.public_key().curve(), Some(NamedCurve::P256));
        assert_eq!(parsed.to_public_key_der().unwrap(), spki);
        assert_eq!(Dg15::parse(&spki).unwrap(), parsed);
    }
}
