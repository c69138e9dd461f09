//! Scanned document bundles and their persistence envelope.
//!
//! A [`DocumentBundle`] holds the raw data groups read from the chip. Every
//! derived view ([`Sod`], [`Dg1`], [`Dg15`]) is parsed on demand from those
//! bytes.
//!
//! ```
//! use emrtd_zk::document::{DocType, DocumentBundle};
//!
//! # fn main() -> emrtd_zk::Result<()> {
//! let mrz = "P<UTOERIKSSON<<ANNA<MARIA<<<<<<<<<<<<<<<<<<<\
//!            L898902C36UTO7408122F1204159ZE184226B<<<<<10";
//! let mut dg1 = vec![0x61, 0x5B, 0x5F, 0x1F, 0x58];
//! dg1.extend_from_slice(mrz.as_bytes());
//!
//! let bundle = DocumentBundle::new(vec![0x77, 0x00], dg1, None, None, None)?;
//! assert_eq!(bundle.doc_type(), DocType::Passport);
//!
//! let restored = DocumentBundle::from_json(&bundle.to_json()?)?;
//! assert_eq!(restored, bundle);
//! # Ok(())
//! # }
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use base64ct::{Base64, Encoding};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::algorithms::iso9796::figure_out_rsa_hash_algorithm;
use crate::config::AaConfig;
use crate::encoding::find_subslice;
use crate::dg1::{Dg1, MrzFormat};
use crate::dispatcher::{aa_data_type, DispatcherTag};
use crate::encoding::Dg15;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::PublicKey;
use crate::signature::{normalize_signature, SignatureAlgorithm};
use crate::sod::Sod;

/// Current version of the JSON envelope.
pub const ENVELOPE_VERSION: u32 = 1;

/// Kind of travel document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// Identity card (TD1).
    #[serde(rename = "ID")]
    Id,
    /// Passport (TD3).
    #[serde(rename = "PASSPORT")]
    Passport,
}

impl DocType {
    /// Document type from the MRZ document code: `I` for identity cards,
    /// `P` for passports.
    pub fn from_document_code(code: &str) -> Result<Self> {
        match code.as_bytes().first() {
            Some(b'I') => Ok(DocType::Id),
            Some(b'P') => Ok(DocType::Passport),
            _ => Err(Error::malformed(format!("unknown document code {code:?}"))),
        }
    }

    /// MRZ layout of the document.
    pub fn mrz_format(&self) -> MrzFormat {
        match self {
            DocType::Id => MrzFormat::Td1,
            DocType::Passport => MrzFormat::Td3,
        }
    }
}

/// Holder details shown to the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonDetails {
    /// Given names.
    pub first_name: Option<String>,
    /// Surname.
    pub last_name: Option<String>,
    /// Sex as printed in the MRZ (`M`, `F` or `<`).
    pub gender: Option<String>,
    /// Date of birth, `YYMMDD`.
    pub birth_date: Option<String>,
    /// Date of expiry, `YYMMDD`.
    pub expiry_date: Option<String>,
    /// Document number.
    pub document_number: Option<String>,
    /// Nationality, ICAO three-letter code.
    pub nationality: Option<String>,
    /// Issuing state or organization.
    pub issuing_authority: Option<String>,
    /// Portrait from DG2, base64 encoded.
    pub passport_image_raw: Option<String>,
}

impl PersonDetails {
    /// Details read from the MRZ of DG1.
    pub fn from_dg1(dg1: &Dg1) -> Self {
        let mrz = dg1.mrz();
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };
        Self {
            first_name: non_empty(mrz.secondary_identifier()),
            last_name: non_empty(mrz.primary_identifier()),
            gender: Some(mrz.sex().into()),
            birth_date: Some(mrz.birth_date().into()),
            expiry_date: Some(mrz.expiry_date().into()),
            document_number: non_empty(mrz.document_number()),
            nationality: non_empty(mrz.nationality()),
            issuing_authority: non_empty(mrz.issuing_state()),
            passport_image_raw: None,
        }
    }
}

/// Raw data groups of one scanned document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBundle {
    doc_type: DocType,
    person_details: PersonDetails,
    sod: Vec<u8>,
    dg1: Vec<u8>,
    dg15: Option<Vec<u8>>,
    dg11: Option<Vec<u8>>,
    aa_signature: Option<Vec<u8>>,
}

impl DocumentBundle {
    /// Bundles the data groups. The document type and person details are
    /// read from DG1.
    pub fn new(
        sod: Vec<u8>,
        dg1: Vec<u8>,
        dg15: Option<Vec<u8>>,
        dg11: Option<Vec<u8>>,
        aa_signature: Option<Vec<u8>>,
    ) -> Result<Self> {
        let parsed = Dg1::parse(&dg1)?;
        let doc_type = DocType::from_document_code(parsed.mrz().document_code())?;
        Ok(Self {
            doc_type,
            person_details: PersonDetails::from_dg1(&parsed),
            sod,
            dg1,
            dg15,
            dg11,
            aa_signature,
        })
    }

    /// Replaces the person details, e.g. with those reported by the reader.
    pub fn with_person_details(mut self, person_details: PersonDetails) -> Self {
        self.person_details = person_details;
        self
    }

    /// Document type.
    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    /// Holder details.
    pub fn person_details(&self) -> &PersonDetails {
        &self.person_details
    }

    /// Raw EF.SOD.
    pub fn sod_bytes(&self) -> &[u8] {
        &self.sod
    }

    /// Raw DG1.
    pub fn dg1_bytes(&self) -> &[u8] {
        &self.dg1
    }

    /// Raw DG15, if the chip supports Active Authentication.
    pub fn dg15_bytes(&self) -> Option<&[u8]> {
        self.dg15.as_deref()
    }

    /// Raw DG11.
    pub fn dg11_bytes(&self) -> Option<&[u8]> {
        self.dg11.as_deref()
    }

    /// Raw Active Authentication signature.
    pub fn aa_signature(&self) -> Option<&[u8]> {
        self.aa_signature.as_deref()
    }

    /// Parsed SOD.
    pub fn sod(&self) -> Result<Sod> {
        Sod::parse(&self.sod)
    }

    /// Parsed DG1.
    pub fn dg1(&self) -> Result<Dg1> {
        Dg1::parse(&self.dg1)
    }

    /// Parsed DG15.
    pub fn dg15(&self) -> Result<Option<Dg15>> {
        self.dg15.as_deref().map(Dg15::parse).transpose()
    }

    /// Active Authentication key.
    pub fn aa_public_key(&self) -> Result<Option<PublicKey>> {
        Ok(self.dg15()?.map(|dg15| dg15.public_key().clone()))
    }

    /// Dispatcher tag of the Active Authentication data.
    pub fn aa_data_type(&self, ec_size_bits: usize, config: &AaConfig) -> Result<DispatcherTag> {
        let key = self.aa_public_key()?;
        aa_data_type(
            key.as_ref(),
            self.aa_signature().unwrap_or_default(),
            ec_size_bits,
            config,
        )
    }

    /// Active Authentication signature as registered: RSA signatures as
    /// read, ECDSA signatures normalized to `r‖s`. Empty without DG15.
    pub fn aa_signature_normalized(&self) -> Result<Vec<u8>> {
        let key = match self.aa_public_key()? {
            Some(key) => key,
            None => return Ok(Vec::new()),
        };
        let signature = self.aa_signature().unwrap_or_default();
        match &key {
            PublicKey::Rsa(_) => Ok(signature.to_vec()),
            PublicKey::Ec(ec) => normalize_signature(
                signature,
                &SignatureAlgorithm::Ecdsa(HashAlgorithm::Sha1),
                Some(ec.curve()),
            ),
        }
    }

    /// Active Authentication key as registered.
    ///
    /// RSA keys yield the modulus, or `None` when the signature does not
    /// reveal a hash algorithm. EC keys yield the raw `subjectPublicKey`
    /// point. Without DG15 the key is empty.
    pub fn aa_public_key_bytes(&self, config: &AaConfig) -> Result<Option<Vec<u8>>> {
        let dg15 = match self.dg15()? {
            Some(dg15) => dg15,
            None => return Ok(Some(Vec::new())),
        };
        match dg15.public_key() {
            PublicKey::Rsa(key) => {
                let signature = self.aa_signature().unwrap_or_default();
                match figure_out_rsa_hash_algorithm(key, signature, config.hash_flag_policy)? {
                    Some(_) => Ok(Some(key.modulus_bytes())),
                    None => {
                        warn!("AA signature reveals no hash algorithm");
                        Ok(None)
                    }
                }
            }
            PublicKey::Ec(key) => Ok(Some(key.to_sec1_bytes()?)),
        }
    }

    /// Offset of the Active Authentication key inside DG15.
    pub fn aa_key_offset(&self) -> Result<Option<usize>> {
        let (dg15, key) = match (self.dg15.as_deref(), self.aa_public_key()?) {
            (Some(dg15), Some(key)) => (dg15, key),
            _ => return Ok(None),
        };
        find_subslice(dg15, &key.canonical_bytes())
            .map(Some)
            .ok_or(Error::KeyNotFoundInDg15)
    }

    /// Serializes the bundle into the versioned JSON envelope.
    pub fn to_json(&self) -> Result<String> {
        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            doc_type: self.doc_type,
            person_details: self.person_details.clone(),
            sod: Base64::encode_string(&self.sod),
            dg1: Base64::encode_string(&self.dg1),
            dg15: self.dg15.as_deref().map(Base64::encode_string),
            dg11: self.dg11.as_deref().map(Base64::encode_string),
            aa_signature: self.aa_signature.as_deref().map(Base64::encode_string),
        };
        Ok(serde_json::to_string(&envelope)?)
    }

    /// Restores a bundle from its JSON envelope.
    pub fn from_json(json: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(json)?;
        if envelope.version != ENVELOPE_VERSION {
            return Err(Error::malformed(format!(
                "unsupported bundle version {}",
                envelope.version
            )));
        }
        let decode = |field: Option<String>| -> Result<Option<Vec<u8>>> {
            field.map(|b64| Base64::decode_vec(&b64)).transpose().map_err(Error::from)
        };

        let bundle = Self {
            doc_type: envelope.doc_type,
            person_details: envelope.person_details,
            sod: Base64::decode_vec(&envelope.sod)?,
            dg1: Base64::decode_vec(&envelope.dg1)?,
            dg15: decode(envelope.dg15)?,
            dg11: decode(envelope.dg11)?,
            aa_signature: decode(envelope.aa_signature)?,
        };
        debug!("restored {:?} bundle", bundle.doc_type);
        Ok(bundle)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    version: u32,
    doc_type: DocType,
    #[serde(default)]
    person_details: PersonDetails,
    sod: String,
    dg1: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dg15: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    dg11: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    aa_signature: Option<String>,
}
