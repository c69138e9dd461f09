//! Pools of Country Signing CA certificates.

use alloc::vec::Vec;
use cms::content_info::ContentInfo;
use cms::signed_data::SignedData;
use der::asn1::Any;
use der::{Decode, Reader, Sequence, SliceReader};
use log::debug;
use x509_cert::Certificate;

use crate::errors::{Error, Result};
use crate::oid;

const PEM_CERTIFICATE_BOUNDARY: &[u8] = b"-----BEGIN CERTIFICATE-----";

/// ICAO `CscaMasterList`.
///
/// ```text
/// CscaMasterList ::= SEQUENCE {
///     version  CscaMasterListVersion,
///     certList SET OF Certificate }
/// ```
///
/// `certList` is kept as a raw `SET`: published master lists are not always
/// sorted as DER requires and may repeat certificates.
#[derive(Clone, Debug, Eq, PartialEq, Sequence)]
pub struct CscaMasterList {
    /// Structure version, `0`.
    pub version: u8,
    /// The `SET OF Certificate`.
    pub cert_list: Any,
}

impl CscaMasterList {
    /// Decodes every certificate of `certList` in encoding order.
    pub fn certificates(&self) -> Result<Vec<Certificate>> {
        let mut reader = SliceReader::new(self.cert_list.value())?;
        let mut certificates = Vec::new();
        while !reader.is_finished() {
            certificates.push(reader.decode::<Certificate>()?);
        }
        Ok(certificates)
    }
}

/// Candidate issuers of document signer certificates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CscaSet {
    certificates: Vec<Certificate>,
}

impl CscaSet {
    /// Pool of the given certificates, order preserved.
    pub fn new(certificates: Vec<Certificate>) -> Self {
        Self { certificates }
    }

    /// Parses a concatenation of PEM `CERTIFICATE` blocks.
    #[cfg(feature = "pem")]
    pub fn from_pem_chain(pem: &[u8]) -> Result<Self> {
        let certificates = Certificate::load_pem_chain(pem)?;
        debug!("loaded {} CSCA certificates from PEM", certificates.len());
        Ok(Self::new(certificates))
    }

    /// Parses a binary ICAO CSCA master list: a CMS `SignedData` whose
    /// encapsulated content is a [`CscaMasterList`].
    pub fn from_master_list(bytes: &[u8]) -> Result<Self> {
        let content_info = ContentInfo::from_der(bytes)?;
        if content_info.content_type != oid::ID_SIGNED_DATA {
            return Err(Error::malformed("master list is not SignedData"));
        }
        let signed_data: SignedData = content_info.content.decode_as()?;
        if signed_data.encap_content_info.econtent_type != oid::ID_CSCA_MASTER_LIST {
            return Err(Error::malformed("encapsulated content is not a CSCA master list"));
        }
        let content = signed_data
            .encap_content_info
            .econtent
            .as_ref()
            .ok_or(Error::MissingEncapsulatedContent)?;

        let master_list = CscaMasterList::from_der(content.value())?;
        let certificates = master_list.certificates()?;
        debug!(
            "loaded {} CSCA certificates from master list v{}",
            certificates.len(),
            master_list.version
        );
        Ok(Self::new(certificates))
    }

    /// Parses either format, detected from the PEM boundary.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if crate::encoding::find_subslice(bytes, PEM_CERTIFICATE_BOUNDARY).is_some() {
            #[cfg(feature = "pem")]
            return Self::from_pem_chain(bytes);
            #[cfg(not(feature = "pem"))]
            return Err(Error::malformed("PEM support is disabled"));
        }
        Self::from_master_list(bytes)
    }

    /// The certificates.
    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    /// Iterator over the certificates.
    pub fn iter(&self) -> core::slice::Iter<'_, Certificate> {
        self.certificates.iter()
    }

    /// Number of certificates.
    pub fn len(&self) -> usize {
        self.certificates.len()
    }

    /// Whether the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.certificates.is_empty()
    }
}

impl From<Vec<Certificate>> for CscaSet {
    fn from(certificates: Vec<Certificate>) -> Self {
        Self::new(certificates)
    }
}

impl<'a> IntoIterator for &'a CscaSet {
    type Item = &'a Certificate;
    type IntoIter = core::slice::Iter<'a, Certificate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
