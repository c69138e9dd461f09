//! Views into the DER encoding of an X.509 `TBSCertificate`.
//!
//! Offsets are positions inside `DER(tbsCertificate)`, which is exactly the
//! byte string the issuer signed and the circuit hashes.

use alloc::vec::Vec;
use der::Encode;
use log::trace;
use num_bigint::BigUint;
use x509_cert::ext::pkix::{AuthorityKeyIdentifier, SubjectKeyIdentifier};
use x509_cert::time::Time;
use x509_cert::Certificate;

use crate::encoding::find_subslice;
use crate::errors::{Error, Result};
use crate::key::PublicKey;
use crate::poseidon::{hash_packed, poseidon_hash};

/// Number of low bits kept from each EC coordinate before Poseidon.
const EC_INDEX_BITS: usize = 248;

/// Length of the `17 0D` UTCTime header.
const UTC_TIME_HEADER_LEN: usize = 2;

/// `DER(tbsCertificate)`.
pub fn tbs_certificate_der(cert: &Certificate) -> Result<Vec<u8>> {
    Ok(cert.tbs_certificate.to_der()?)
}

/// Typed subject public key of a certificate.
pub fn certificate_public_key(cert: &Certificate) -> Result<PublicKey> {
    PublicKey::try_from(&cert.tbs_certificate.subject_public_key_info)
}

/// Offset of the canonical public key inside `DER(tbsCertificate)`.
///
/// Only matches inside the `subjectPublicKeyInfo` span count, the first one
/// wins.
pub fn x509_key_offset(cert: &Certificate) -> Result<usize> {
    let tbs = tbs_certificate_der(cert)?;
    let spki = cert.tbs_certificate.subject_public_key_info.to_der()?;
    let key = certificate_public_key(cert)?.canonical_bytes();

    let spki_start = find_subslice(&tbs, &spki).ok_or(Error::KeyNotFoundInTbs)?;
    let span = &tbs[spki_start..spki_start + spki.len()];
    let offset = spki_start + find_subslice(span, &key).ok_or(Error::KeyNotFoundInTbs)?;

    trace!("public key of {} bytes at TBS offset {offset}", key.len());
    Ok(offset)
}

/// Offset of the `YYMMDDHHmmssZ` value of `notAfter` inside
/// `DER(tbsCertificate)`.
///
/// The value must be a UTCTime and is located right after its `17 0D` header,
/// past the `notBefore` value.
pub fn expiration_offset(cert: &Certificate) -> Result<usize> {
    let validity = &cert.tbs_certificate.validity;
    let not_after = match validity.not_after {
        Time::UtcTime(time) => time,
        Time::GeneralTime(_) => return Err(Error::ExpirationNotFound),
    };

    let tbs = tbs_certificate_der(cert)?;
    let validity_der = validity.to_der()?;
    let not_before_len = usize::try_from(validity.not_before.encoded_len()?)?;
    let encoded = not_after.to_der()?;

    let validity_start = find_subslice(&tbs, &validity_der).ok_or(Error::ExpirationNotFound)?;
    // skip the SEQUENCE header and the notBefore TLV
    let header_len = validity_der.len() - not_before_len - encoded.len();
    let search_from = validity_start + header_len + not_before_len;
    let found = find_subslice(&tbs[search_from..], &encoded).ok_or(Error::ExpirationNotFound)?;

    let offset = search_from + found + UTC_TIME_HEADER_LEN;
    trace!("notAfter at TBS offset {offset}");
    Ok(offset)
}

/// `keyIdentifier` of the AuthorityKeyIdentifier extension.
pub fn authority_key_identifier(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    let aki = cert.tbs_certificate.get::<AuthorityKeyIdentifier>()?;
    Ok(aki.and_then(|(_, aki)| aki.key_identifier.map(|id| id.as_bytes().to_vec())))
}

/// Value of the SubjectKeyIdentifier extension.
pub fn subject_key_identifier(cert: &Certificate) -> Result<Option<Vec<u8>>> {
    let ski = cert.tbs_certificate.get::<SubjectKeyIdentifier>()?;
    Ok(ski.map(|(_, ski)| ski.0.as_bytes().to_vec()))
}

/// Leaf key of a public key in the CSCA tree.
///
/// RSA keys hash the packed modulus. EC keys hash both coordinates, each
/// reduced to its low 248 bits so it fits the scalar field.
pub fn index_key(key: &PublicKey) -> Result<[u8; 32]> {
    match key {
        PublicKey::Rsa(rsa) => {
            let modulus = rsa.modulus_bytes();
            let unpadded = modulus.strip_prefix(&[0u8]).unwrap_or(&modulus);
            hash_packed(unpadded)
        }
        PublicKey::Ec(ec) => {
            let mask = (BigUint::from(1u8) << EC_INDEX_BITS) - BigUint::from(1u8);
            let x = BigUint::from_bytes_be(&ec.x_bytes()) & &mask;
            let y = BigUint::from_bytes_be(&ec.y_bytes()) & &mask;
            poseidon_hash(&[x, y])
        }
    }
}
