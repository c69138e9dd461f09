//! Digest algorithms used by document signers and the helpers around them.

use alloc::boxed::Box;
use alloc::vec::Vec;
use const_oid::ObjectIdentifier;
use digest::{Digest, DynDigest};
use sha3::Keccak256;

use crate::errors::{Error, Result};
use crate::oid;

/// A list of supported hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HashAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-224
    Sha224,
    /// SHA-256
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Returns the length in bytes of a digest.
    pub fn size(&self) -> usize {
        match *self {
            HashAlgorithm::Sha1 => 20,
            HashAlgorithm::Sha224 => 28,
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }

    /// Returns the length in bits of a digest.
    pub fn bits(&self) -> usize {
        self.size() * 8
    }

    /// Name used inside dispatcher tags, e.g. `SHA256`.
    pub fn name(&self) -> &'static str {
        match *self {
            HashAlgorithm::Sha1 => "SHA1",
            HashAlgorithm::Sha224 => "SHA224",
            HashAlgorithm::Sha256 => "SHA256",
            HashAlgorithm::Sha384 => "SHA384",
            HashAlgorithm::Sha512 => "SHA512",
        }
    }

    /// Returns the ASN1 DER `DigestInfo` prefix for the hash function.
    pub fn asn1_prefix(&self) -> &'static [u8] {
        match *self {
            HashAlgorithm::Sha1 => &[
                0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04,
                0x14,
            ],
            HashAlgorithm::Sha224 => &[
                0x30, 0x2d, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
                0x04, 0x05, 0x00, 0x04, 0x1c,
            ],
            HashAlgorithm::Sha256 => &[
                0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
                0x01, 0x05, 0x00, 0x04, 0x20,
            ],
            HashAlgorithm::Sha384 => &[
                0x30, 0x41, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
                0x02, 0x05, 0x00, 0x04, 0x30,
            ],
            HashAlgorithm::Sha512 => &[
                0x30, 0x51, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02,
                0x03, 0x05, 0x00, 0x04, 0x40,
            ],
        }
    }

    /// Hashes `msg` in one shot.
    pub fn digest(&self, msg: &[u8]) -> Vec<u8> {
        match *self {
            HashAlgorithm::Sha1 => sha1::Sha1::digest(msg).to_vec(),
            HashAlgorithm::Sha224 => sha2::Sha224::digest(msg).to_vec(),
            HashAlgorithm::Sha256 => sha2::Sha256::digest(msg).to_vec(),
            HashAlgorithm::Sha384 => sha2::Sha384::digest(msg).to_vec(),
            HashAlgorithm::Sha512 => sha2::Sha512::digest(msg).to_vec(),
        }
    }

    /// Boxed hasher for the mask generation function.
    pub(crate) fn dyn_digest(&self) -> Box<dyn DynDigest> {
        match *self {
            HashAlgorithm::Sha1 => Box::new(sha1::Sha1::new()),
            HashAlgorithm::Sha224 => Box::new(sha2::Sha224::new()),
            HashAlgorithm::Sha256 => Box::new(sha2::Sha256::new()),
            HashAlgorithm::Sha384 => Box::new(sha2::Sha384::new()),
            HashAlgorithm::Sha512 => Box::new(sha2::Sha512::new()),
        }
    }

    /// Digest algorithm OID.
    pub fn oid(&self) -> ObjectIdentifier {
        match *self {
            HashAlgorithm::Sha1 => oid::ID_SHA1,
            HashAlgorithm::Sha224 => oid::ID_SHA224,
            HashAlgorithm::Sha256 => oid::ID_SHA256,
            HashAlgorithm::Sha384 => oid::ID_SHA384,
            HashAlgorithm::Sha512 => oid::ID_SHA512,
        }
    }

    /// Looks up a digest algorithm OID.
    pub fn from_oid(oid: ObjectIdentifier) -> Result<Self> {
        match oid {
            oid::ID_SHA1 => Ok(HashAlgorithm::Sha1),
            oid::ID_SHA224 => Ok(HashAlgorithm::Sha224),
            oid::ID_SHA256 => Ok(HashAlgorithm::Sha256),
            oid::ID_SHA384 => Ok(HashAlgorithm::Sha384),
            oid::ID_SHA512 => Ok(HashAlgorithm::Sha512),
            oid => Err(Error::UnsupportedDigestAlgorithm { oid }),
        }
    }

    /// Looks up a digest by its output length in bytes.
    pub fn from_size(size: usize) -> Option<Self> {
        match size {
            20 => Some(HashAlgorithm::Sha1),
            28 => Some(HashAlgorithm::Sha224),
            32 => Some(HashAlgorithm::Sha256),
            48 => Some(HashAlgorithm::Sha384),
            64 => Some(HashAlgorithm::Sha512),
            _ => None,
        }
    }

    /// ISO/IEC 9796-2 hash identifier byte found in the trailer of an
    /// Active Authentication signature.
    pub fn from_iso9796_flag(flag: u8) -> Option<Self> {
        match flag {
            0x33 | 0xBC => Some(HashAlgorithm::Sha1),
            0x34 => Some(HashAlgorithm::Sha256),
            0x35 => Some(HashAlgorithm::Sha512),
            0x36 => Some(HashAlgorithm::Sha384),
            0x38 => Some(HashAlgorithm::Sha224),
            _ => None,
        }
    }
}

/// Keccak-256 (the pre-standard SHA-3 padding used by Ethereum).
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}
