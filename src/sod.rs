//! Document Security Object (EF.SOD).
//!
//! An SOD is a CMS `SignedData` whose encapsulated content is the
//! `LDSSecurityObject` listing the data group hashes. It carries the
//! document signer ("slave") certificate and one signer info.
//!
//! ```no_run
//! use emrtd_zk::sod::Sod;
//!
//! # fn run(bytes: &[u8]) -> emrtd_zk::Result<()> {
//! let sod = Sod::parse(bytes)?;
//! let attrs = sod.signed_attributes()?;
//! let key_offset = sod.x509_key_offset()?;
//! let expiration = sod.expiration_offset()?;
//! # let _ = (attrs, key_offset, expiration);
//! # Ok(())
//! # }
//! ```

use alloc::vec::Vec;
use cms::cert::CertificateChoices;
use cms::content_info::ContentInfo;
use cms::signed_data::{SignedData, SignerInfo};
use der::asn1::OctetString;
use der::{Decode, Encode, TagNumber};
use log::debug;
use subtle::ConstantTimeEq;
use x509_cert::Certificate;

use crate::curve::NamedCurve;
use crate::encoding::strip_application_tag;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::PublicKey;
use crate::oid;
use crate::signature::{normalize_signature, SignatureAlgorithm, VerifyingKey};
use crate::tbs;

/// Parsed SOD.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sod {
    signed_data: SignedData,
}

impl Sod {
    /// Decodes an SOD, with or without its `[APPLICATION 23]` wrapper.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let inner = strip_application_tag(bytes, TagNumber::N23).map_err(|_| {
            Error::MalformedSod {
                reason: "invalid EF.SOD wrapper",
            }
        })?;

        let content_info = ContentInfo::from_der(inner).map_err(|_| Error::MalformedSod {
            reason: "not a DER encoded ContentInfo",
        })?;
        if content_info.content_type != oid::ID_SIGNED_DATA {
            return Err(Error::MalformedSod {
                reason: "content type is not id-signedData",
            });
        }

        let signed_data: SignedData =
            content_info
                .content
                .decode_as()
                .map_err(|_| Error::MalformedSod {
                    reason: "content is not SignedData",
                })?;

        match &signed_data.certificates {
            Some(set) if !set.0.is_empty() => {}
            _ => {
                return Err(Error::MalformedSod {
                    reason: "SignedData carries no certificates",
                })
            }
        }

        Ok(Self { signed_data })
    }

    /// The CMS structure.
    pub fn signed_data(&self) -> &SignedData {
        &self.signed_data
    }

    /// The document signer certificate, `certificates[0]`.
    pub fn slave_certificate(&self) -> Result<&Certificate> {
        let set = self
            .signed_data
            .certificates
            .as_ref()
            .ok_or(Error::NoCertificateFound)?;
        match set.0.get(0) {
            Some(CertificateChoices::Certificate(cert)) => Ok(cert),
            _ => Err(Error::NoCertificateFound),
        }
    }

    /// Octets of `encapContentInfo.eContent`, the DER `LDSSecurityObject`.
    pub fn encapsulated_content(&self) -> Result<&[u8]> {
        self.signed_data
            .encap_content_info
            .econtent
            .as_ref()
            .map(|any| any.value())
            .ok_or(Error::MissingEncapsulatedContent)
    }

    fn signer_info(&self) -> Result<&SignerInfo> {
        self.signed_data
            .signer_infos
            .0
            .get(0)
            .ok_or(Error::NoSignerInfo)
    }

    /// DER encoding of the signed attributes as a universal `SET OF`, the
    /// form covered by the signature.
    pub fn signed_attributes(&self) -> Result<Vec<u8>> {
        match &self.signer_info()?.signed_attrs {
            Some(attrs) if !attrs.is_empty() => Ok(attrs.to_der()?),
            _ => Err(Error::NoSignedAttributes),
        }
    }

    /// Raw signature of the signer info.
    pub fn signature(&self) -> Result<&[u8]> {
        Ok(self.signer_info()?.signature.as_bytes())
    }

    /// Digest algorithm of the signer info.
    pub fn signer_digest_algorithm(&self) -> Result<HashAlgorithm> {
        HashAlgorithm::from_oid(self.signer_info()?.digest_alg.oid)
    }

    /// Signature scheme of the signer info.
    ///
    /// Signer infos often name the bare key algorithm (`rsaEncryption`,
    /// `id-ecPublicKey`); the digest algorithm completes it then.
    pub fn signer_signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        let info = self.signer_info()?;
        match info.signature_algorithm.oid {
            oid::RSA_ENCRYPTION => Ok(SignatureAlgorithm::RsaPkcs1v15(
                self.signer_digest_algorithm()?,
            )),
            oid::ID_EC_PUBLIC_KEY => Ok(SignatureAlgorithm::Ecdsa(self.signer_digest_algorithm()?)),
            _ => SignatureAlgorithm::from_algorithm_identifier(&info.signature_algorithm),
        }
    }

    /// Value of the `messageDigest` signed attribute.
    pub fn message_digest(&self) -> Result<Vec<u8>> {
        let attrs = self
            .signer_info()?
            .signed_attrs
            .as_ref()
            .ok_or(Error::NoSignedAttributes)?;
        let attr = attrs
            .iter()
            .find(|attr| attr.oid == oid::ID_MESSAGE_DIGEST)
            .ok_or_else(|| Error::malformed("messageDigest attribute is missing"))?;
        let value = attr
            .values
            .get(0)
            .ok_or_else(|| Error::malformed("messageDigest attribute is empty"))?;
        let digest: OctetString = value.decode_as()?;
        Ok(digest.as_bytes().to_vec())
    }

    /// Checks that the signed attributes commit to the encapsulated content
    /// and that the document signer signed them.
    pub fn verify_signer(&self) -> Result<()> {
        let algorithm = self.signer_signature_algorithm()?;
        let content_digest = self.signer_digest_algorithm()?.digest(self.encapsulated_content()?);
        let message_digest = self.message_digest()?;
        if !bool::from(content_digest.as_slice().ct_eq(message_digest.as_slice())) {
            return Err(Error::Verification);
        }

        let verifier = VerifyingKey::new(self.slave_public_key()?, algorithm)?;
        let digest = algorithm.hash().digest(&self.signed_attributes()?);
        verifier.verify_digest(&digest, self.signature()?)?;
        debug!("SOD signer info verified with {}", algorithm.label());
        Ok(())
    }

    /// Public key of the document signer.
    pub fn slave_public_key(&self) -> Result<PublicKey> {
        tbs::certificate_public_key(self.slave_certificate()?)
    }

    /// Modulus size in bits of an RSA document signer, `None` for EC.
    pub fn x509_rsa_size(&self) -> Result<Option<usize>> {
        Ok(match self.slave_public_key()? {
            PublicKey::Rsa(key) => Some(key.modulus_bytes().len() * 8),
            PublicKey::Ec(_) => None,
        })
    }

    /// Signature scheme the CSCA used on the document signer certificate.
    pub fn slave_signature_algorithm(&self) -> Result<SignatureAlgorithm> {
        SignatureAlgorithm::from_algorithm_identifier(&self.slave_certificate()?.signature_algorithm)
    }

    /// Signature on the document signer certificate, normalized. ECDSA
    /// signatures need the curve of the issuing CSCA.
    pub fn slave_certificate_signature(&self, issuer_curve: Option<NamedCurve>) -> Result<Vec<u8>> {
        let cert = self.slave_certificate()?;
        let raw = cert
            .signature
            .as_bytes()
            .ok_or_else(|| Error::malformed("certificate signature has unused bits"))?;
        normalize_signature(raw, &self.slave_signature_algorithm()?, issuer_curve)
    }

    /// `DER(tbsCertificate)` of the document signer.
    pub fn tbs_certificate_der(&self) -> Result<Vec<u8>> {
        tbs::tbs_certificate_der(self.slave_certificate()?)
    }

    /// Offset of the document signer key inside its TBS certificate.
    pub fn x509_key_offset(&self) -> Result<usize> {
        tbs::x509_key_offset(self.slave_certificate()?)
    }

    /// Offset of the `notAfter` value inside the TBS certificate.
    pub fn expiration_offset(&self) -> Result<usize> {
        tbs::expiration_offset(self.slave_certificate()?)
    }

    /// Leaf key of the document signer key.
    pub fn certificate_index_key(&self) -> Result<[u8; 32]> {
        tbs::index_key(&self.slave_public_key()?)
    }

    /// PEM encoding of the document signer certificate.
    #[cfg(feature = "pem")]
    pub fn slave_certificate_pem(&self) -> Result<alloc::string::String> {
        use der::EncodePem;
        Ok(self.slave_certificate()?.to_pem(der::pem::LineEnding::LF)?)
    }
}
