//! ⚠️ Low-level signing primitives.
//!
//! # ☢️️ WARNING: HAZARDOUS API ☢️
//!
//! This crate only ever verifies. The functions here exist to produce test
//! documents and signatures: raw RSA without blinding, ECDSA with a caller
//! supplied nonce, and the bare PKCS#1 v1.5 and PSS encodings. None of them
//! is constant time.

use alloc::vec::Vec;
use digest::DynDigest;

pub use crate::algorithms::ecdsa::sign_prehash;
pub use crate::algorithms::rsa::{rsa_decrypt, rsa_encrypt};

use crate::algorithms::pkcs1v15::pkcs1v15_sign_pad;
use crate::algorithms::pss::emsa_pss_encode;
use crate::errors::Result;
use crate::hash::HashAlgorithm;

/// `EMSA-PKCS1-v1_5` encoding of `digest` for a `k` byte modulus.
pub fn pkcs1v15_encode(hash: HashAlgorithm, digest: &[u8], k: usize) -> Result<Vec<u8>> {
    pkcs1v15_sign_pad(hash.asn1_prefix(), digest, k)
}

/// `EMSA-PSS` encoding of `digest` for a modulus of `key_bits` bits.
pub fn pss_encode(
    hash: HashAlgorithm,
    mgf_hash: HashAlgorithm,
    digest: &[u8],
    salt: &[u8],
    key_bits: usize,
) -> Result<Vec<u8>> {
    let mut hasher: alloc::boxed::Box<dyn DynDigest> = hash.dyn_digest();
    let mut mgf: alloc::boxed::Box<dyn DynDigest> = mgf_hash.dyn_digest();
    emsa_pss_encode(digest, key_bits.saturating_sub(1), salt, &mut *hasher, &mut *mgf)
}
