//! Resolution of the CSCA that issued a document signer certificate.
//!
//! Candidates are first matched on the issuer name of the document signer
//! against the subject name of each CSCA. Among those, the
//! AuthorityKeyIdentifier of the document signer must equal the
//! SubjectKeyIdentifier of the CSCA. [`TrustMode::Strict`] also checks the
//! certificate signature with the candidate key before accepting it.

mod csca;
mod verify;

pub use self::{
    csca::{CscaMasterList, CscaSet},
    verify::verify_certificate_signature,
};

use alloc::vec::Vec;
use log::{debug, warn};
use x509_cert::Certificate;

use crate::config::{TrustConfig, TrustMode};
use crate::errors::{Error, Result};
use crate::signature::{normalize_signature, SignatureAlgorithm};
use crate::tbs;

/// Finds the CSCA in `cscas` that issued `slave`.
///
/// The first candidate passing every check of `config.mode` wins.
pub fn resolve_issuer<'a>(
    slave: &Certificate,
    cscas: &'a CscaSet,
    config: &TrustConfig,
) -> Result<&'a Certificate> {
    let aki = match config.mode {
        TrustMode::DistinguishedName => None,
        TrustMode::Strict | TrustMode::KeyIdentifier => Some(
            tbs::authority_key_identifier(slave)?.ok_or(Error::MissingAuthorityKeyIdentifier)?,
        ),
    };
    let issuer = &slave.tbs_certificate.issuer;

    for (index, candidate) in cscas.iter().enumerate() {
        if candidate.tbs_certificate.subject != *issuer {
            continue;
        }

        if let Some(aki) = &aki {
            let ski = match tbs::subject_key_identifier(candidate)? {
                Some(ski) => ski,
                None if config.skip_candidates_without_ski => {
                    warn!("skipping CSCA #{index} without SubjectKeyIdentifier");
                    continue;
                }
                None => return Err(Error::MissingSubjectKeyIdentifier),
            };
            if ski != *aki {
                continue;
            }
        }

        if config.mode == TrustMode::Strict {
            let key = tbs::certificate_public_key(candidate)?;
            if let Err(err) = verify_certificate_signature(slave, &key) {
                debug!("CSCA #{index} matches by name but not by signature: {err}");
                continue;
            }
        }

        debug!("resolved issuer CSCA #{index} ({:?} mode)", config.mode);
        return Ok(candidate);
    }

    Err(Error::NoMatchingIssuer)
}

/// Canonical public key of the CSCA, as registered in the ICAO tree.
pub fn icao_member_key(csca: &Certificate) -> Result<Vec<u8>> {
    Ok(tbs::certificate_public_key(csca)?.canonical_bytes())
}

/// Signature on the document signer certificate, normalized with the curve
/// of the CSCA that made it.
pub fn icao_member_signature(slave: &Certificate, csca: &Certificate) -> Result<Vec<u8>> {
    let algorithm = SignatureAlgorithm::from_algorithm_identifier(&slave.signature_algorithm)?;
    let raw = slave
        .signature
        .as_bytes()
        .ok_or_else(|| Error::malformed("certificate signature has unused bits"))?;
    let curve = tbs::certificate_public_key(csca)?.curve();
    normalize_signature(raw, &algorithm, curve)
}
