//! Registration circuit naming.
//!
//! A circuit name pins every static parameter of the document that the
//! circuit was compiled for:
//!
//! ```text
//! registerIdentity_{sigType}_{hashBits}_{docType}_{ecChunks}_{ecShiftBits}_{dg1ShiftBits}_NA
//! registerIdentity_{sigType}_{hashBits}_{docType}_{ecChunks}_{ecShiftBits}_{dg1ShiftBits}_{aaSigType}_{dg15ShiftBits}_{dg15Chunks}_{aaShiftBits}
//! ```
//!
//! The second form applies to documents with Active Authentication.

use core::fmt;
use log::trace;

use crate::curve::NamedCurve;
use crate::encoding::find_subslice;
use crate::document::DocType;
use crate::errors::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::key::PublicKey;
use crate::signature::SignatureAlgorithm;
use crate::traits::PublicKeyParts;

const EXPONENT_65537: u64 = 65537;
const EXPONENT_3: u64 = 3;

/// Numeric document type of the circuit.
pub fn doc_type_code(doc_type: DocType) -> u8 {
    match doc_type {
        DocType::Id => 1,
        DocType::Passport => 3,
    }
}

fn curve_sig_type(curve: NamedCurve) -> Result<u8> {
    match curve {
        NamedCurve::P256 => Ok(20),
        NamedCurve::BrainpoolP256r1 => Ok(21),
        NamedCurve::BrainpoolP320r1 => Ok(22),
        NamedCurve::P192 => Ok(23),
        NamedCurve::P224 => Ok(24),
        NamedCurve::BrainpoolP384r1 => Ok(25),
        NamedCurve::BrainpoolP512r1 => Ok(26),
        NamedCurve::P521 => Ok(27),
        other => Err(Error::UnsupportedAlgorithm {
            reason: format!("no circuit for curve {}", other.name()),
        }),
    }
}

fn exponent(key: &PublicKey) -> Option<u64> {
    use num_traits::ToPrimitive;
    key.as_rsa().and_then(|rsa| rsa.e().to_u64())
}

/// Circuit signature type of the document signer.
pub fn sig_type(algorithm: &SignatureAlgorithm, key: &PublicKey) -> Result<u8> {
    use HashAlgorithm::*;

    let bits = key.bits();
    let e = exponent(key);
    let code = match (algorithm, key) {
        (SignatureAlgorithm::RsaPkcs1v15(hash), PublicKey::Rsa(_)) => match (bits, e, hash) {
            (2048, Some(EXPONENT_65537), Sha256) => Some(1),
            (4096, Some(EXPONENT_65537), Sha256) => Some(2),
            (2048, Some(EXPONENT_65537), Sha1) => Some(3),
            _ => None,
        },
        (
            SignatureAlgorithm::RsaPss {
                hash, salt_len, ..
            },
            PublicKey::Rsa(_),
        ) => match (bits, e, salt_len, hash) {
            (2048, Some(EXPONENT_3), 32, Sha256) => Some(10),
            (2048, Some(EXPONENT_65537), 32, Sha256) => Some(11),
            (2048, Some(EXPONENT_65537), 64, Sha256) => Some(12),
            (2048, Some(EXPONENT_65537), 48, Sha384) => Some(13),
            (3072, Some(EXPONENT_65537), 32, Sha256) => Some(14),
            (3072, Some(EXPONENT_65537), 64, Sha512) => Some(15),
            _ => None,
        },
        (SignatureAlgorithm::Ecdsa(_), PublicKey::Ec(ec)) => Some(curve_sig_type(ec.curve())?),
        _ => None,
    };

    code.ok_or_else(|| Error::UnsupportedAlgorithm {
        reason: format!(
            "no circuit for {} {bits}-bit {} signatures",
            algorithm.label(),
            algorithm.hash().name()
        ),
    })
}

/// Circuit signature type of the Active Authentication key.
pub fn aa_sig_type(key: &PublicKey) -> Result<u8> {
    match key {
        PublicKey::Rsa(_) if key.bits() == 1024 && exponent(key) == Some(EXPONENT_65537) => Ok(1),
        PublicKey::Rsa(_) => Err(Error::UnsupportedAlgorithm {
            reason: format!("no AA circuit for {}-bit RSA keys", key.bits()),
        }),
        PublicKey::Ec(ec) => curve_sig_type(ec.curve()),
    }
}

/// Number of hash blocks the circuit reserves for a message of `len` bytes.
///
/// SHA-1 and SHA-2/256 use 64-byte blocks, SHA-384 and SHA-512 128-byte
/// blocks. The count is `ceil((len + 8) / block)`: it covers the 8-byte
/// length field but not the `0x80` terminator, so at `len % 64 == 56` it is
/// one block below what SHA padding needs. Circuit names use this count.
pub fn chunk_count(len: usize, hash: HashAlgorithm) -> usize {
    let block = if hash.size() <= 32 { 64 } else { 128 };
    (len + 8).div_ceil(block)
}

/// Bit position of `digest` inside `container`.
pub fn digest_shift(container: &[u8], digest: &[u8], name: &'static str) -> Result<usize> {
    let offset = find_subslice(container, digest).ok_or(Error::DigestNotFound { container: name })?;
    trace!("digest at byte {offset} of {name}");
    Ok(offset * 8)
}

/// Parameters of a document using Active Authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AaParams {
    /// Signature type of the AA key.
    pub sig_type: u8,
    /// Bit position of the DG15 digest in the encapsulated content.
    pub dg15_shift_bits: usize,
    /// Hash blocks of DG15.
    pub dg15_chunks: usize,
    /// Bit position of the AA key in DG15.
    pub key_shift_bits: usize,
}

/// Name of a registration circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CircuitName {
    /// Signature type of the document signer.
    pub sig_type: u8,
    /// Digest size in bits.
    pub hash_bits: usize,
    /// Numeric document type.
    pub doc_type: u8,
    /// Hash blocks of the encapsulated content.
    pub ec_chunks: usize,
    /// Bit position of the encapsulated content digest in the signed
    /// attributes.
    pub ec_shift_bits: usize,
    /// Bit position of the DG1 digest in the encapsulated content.
    pub dg1_shift_bits: usize,
    /// Active Authentication part.
    pub aa: Option<AaParams>,
}

impl fmt::Display for CircuitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "registerIdentity_{}_{}_{}_{}_{}_{}",
            self.sig_type,
            self.hash_bits,
            self.doc_type,
            self.ec_chunks,
            self.ec_shift_bits,
            self.dg1_shift_bits
        )?;
        match &self.aa {
            None => f.write_str("_NA"),
            Some(aa) => write!(
                f,
                "_{}_{}_{}_{}",
                aa.sig_type, aa.dg15_shift_bits, aa.dg15_chunks, aa.key_shift_bits
            ),
        }
    }
}
