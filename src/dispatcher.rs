//! Dispatcher tags of the registration contract.
//!
//! A tag is `Keccak256(name)` where the name spells out the algorithm, hash
//! and key size the on-chain verifier must use, e.g. `P_RSA_SHA256_2688` for
//! an Active Authentication signature or `C_RSA_4096` for a document signer
//! certificate.

use alloc::string::String;
use log::debug;
use x509_cert::Certificate;

use crate::algorithms::iso9796::figure_out_rsa_hash_algorithm;
use crate::config::AaConfig;
use crate::errors::{Error, Result};
use crate::hash::{keccak256, HashAlgorithm};
use crate::key::PublicKey;
use crate::signature::SignatureAlgorithm;
use crate::tbs;

/// A 32-byte dispatcher tag.
pub type DispatcherTag = [u8; 32];

/// Name used when no Active Authentication data is available.
pub const NO_DATA: &str = "P_NO_DATA";

/// Tag of an arbitrary dispatcher name.
pub fn dispatcher_tag(name: &str) -> DispatcherTag {
    keccak256(name.as_bytes())
}

/// Dispatcher name for the Active Authentication data of a document.
///
/// RSA keys take their hash from the ISO/IEC 9796-2 trailer of the
/// signature and are sized at least `config.ec_max_size_bits`. A key with
/// public exponent `3` gets the `_3` suffix.
pub fn aa_data_type_name(
    aa_key: Option<&PublicKey>,
    aa_signature: &[u8],
    ec_size_bits: usize,
    config: &AaConfig,
) -> Result<String> {
    let name = match aa_key {
        None => String::from(NO_DATA),
        Some(PublicKey::Rsa(key)) => {
            match figure_out_rsa_hash_algorithm(key, aa_signature, config.hash_flag_policy)? {
                None => String::from(NO_DATA),
                Some(hash) => {
                    let bits = config.ec_max_size_bits.max(ec_size_bits);
                    let mut name = format!("P_RSA_{}_{bits}", hash.name());
                    if key.has_exponent_three() {
                        name.push_str("_3");
                    }
                    name
                }
            }
        }
        Some(PublicKey::Ec(_)) => format!("P_ECDSA_SHA1_{ec_size_bits}"),
    };
    debug!("active authentication dispatcher {name}");
    Ok(name)
}

/// Tag for the Active Authentication data of a document.
pub fn aa_data_type(
    aa_key: Option<&PublicKey>,
    aa_signature: &[u8],
    ec_size_bits: usize,
    config: &AaConfig,
) -> Result<DispatcherTag> {
    aa_data_type_name(aa_key, aa_signature, ec_size_bits, config).map(|name| dispatcher_tag(&name))
}

fn certificate_hash_label(algorithm: &SignatureAlgorithm) -> Result<&'static str> {
    match algorithm.hash() {
        HashAlgorithm::Sha1 => Ok("SHA1"),
        HashAlgorithm::Sha256 => Ok("SHA2"),
        HashAlgorithm::Sha384 => Ok("SHA384"),
        HashAlgorithm::Sha512 => Ok("SHA512"),
        HashAlgorithm::Sha224 => Err(Error::UnsupportedAlgorithm {
            reason: format!("no certificate dispatcher for {} with SHA224", algorithm.label()),
        }),
    }
}

/// Dispatcher name for the document signer certificate.
pub fn certificate_dispatcher_name(slave: &Certificate) -> Result<String> {
    let algorithm = SignatureAlgorithm::from_algorithm_identifier(&slave.signature_algorithm)?;
    let key = tbs::certificate_public_key(slave)?;
    let bits = key.canonical_bytes().len() * 8;
    let hash = certificate_hash_label(&algorithm)?;

    let name = match (&algorithm, &key) {
        (SignatureAlgorithm::RsaPkcs1v15(HashAlgorithm::Sha256), PublicKey::Rsa(_)) => {
            format!("C_RSA_{bits}")
        }
        (SignatureAlgorithm::RsaPkcs1v15(_), PublicKey::Rsa(_)) => format!("C_RSA_{hash}_{bits}"),
        (SignatureAlgorithm::RsaPss { .. }, PublicKey::Rsa(_)) => {
            format!("C_RSAPSS_{hash}_{bits}")
        }
        (SignatureAlgorithm::Ecdsa(_), PublicKey::Ec(ec)) => {
            format!("C_ECDSA_{}_{hash}_{bits}", ec.curve().name())
        }
        _ => {
            return Err(Error::UnsupportedAlgorithm {
                reason: format!(
                    "{} signed certificate carrying a {} key",
                    algorithm.label(),
                    key.algorithm()
                ),
            })
        }
    };
    debug!("certificate dispatcher {name}");
    Ok(name)
}

/// Tag for the document signer certificate.
pub fn certificate_dispatcher(slave: &Certificate) -> Result<DispatcherTag> {
    certificate_dispatcher_name(slave).map(|name| dispatcher_tag(&name))
}
