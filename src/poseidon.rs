//! Poseidon hashing over the BN254 scalar field with the circom parameters.

use alloc::vec::Vec;
use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonBytesHasher};
use num_bigint::BigUint;

use crate::algorithms::pad::pad_be;
use crate::errors::{Error, Result};

/// Number of 24 byte chunks folded by [`hash_packed`].
const PACKED_CHUNKS: usize = 5;
const CHUNK_LEN: usize = 24;
const LIMB_BITS: usize = 64;

/// Maximum number of inputs of a single circom Poseidon permutation.
pub const MAX_INPUTS: usize = 12;

/// Order of the BN254 scalar field.
pub fn scalar_field_modulus() -> BigUint {
    BigUint::from_bytes_be(&Fr::MODULUS.to_bytes_be())
}

/// Poseidon hash of `inputs`, each a canonical field element.
///
/// Returns the digest as 32 big-endian bytes.
pub fn poseidon_hash(inputs: &[BigUint]) -> Result<[u8; 32]> {
    if inputs.is_empty() || inputs.len() > MAX_INPUTS {
        return Err(Error::malformed(format!(
            "poseidon takes 1 to {MAX_INPUTS} inputs, got {}",
            inputs.len()
        )));
    }

    let modulus = scalar_field_modulus();
    if inputs.iter().any(|x| x >= &modulus) {
        return Err(Error::malformed("poseidon input is not a field element"));
    }

    let encoded: Vec<Vec<u8>> = inputs.iter().map(|x| pad_be(&x.to_bytes_be(), 32)).collect();
    let slices: Vec<&[u8]> = encoded.iter().map(Vec::as_slice).collect();

    let mut hasher = Poseidon::<Fr>::new_circom(inputs.len())?;
    Ok(hasher.hash_bytes_be(&slices)?)
}

/// Splits the trailing 120 bytes of `key` into the five field elements
/// consumed by [`hash_packed`].
///
/// Chunks are taken from the end backwards. Inside a chunk the three 64-bit
/// limbs are reversed, the least significant limb ending up on top.
pub fn packed_elements(key: &[u8]) -> Result<[BigUint; PACKED_CHUNKS]> {
    let min = PACKED_CHUNKS * CHUNK_LEN;
    if key.len() < min {
        return Err(Error::InputTooShort {
            min,
            len: key.len(),
        });
    }

    let mask = (BigUint::from(1u8) << LIMB_BITS) - BigUint::from(1u8);
    let mut elements: [BigUint; PACKED_CHUNKS] = Default::default();
    let mut end = key.len();

    for element in elements.iter_mut() {
        let chunk = BigUint::from_bytes_be(&key[end - CHUNK_LEN..end]);
        end -= CHUNK_LEN;

        let mut reversed = BigUint::default();
        for j in 0..CHUNK_LEN * 8 / LIMB_BITS {
            let limb = (&chunk >> (j * LIMB_BITS)) & &mask;
            reversed = (reversed << LIMB_BITS) | limb;
        }
        *element = reversed;
    }

    Ok(elements)
}

/// Poseidon over five packed chunks of a public key, the CSCA tree key of
/// RSA certificates.
pub fn hash_packed(key: &[u8]) -> Result<[u8; 32]> {
    let elements = packed_elements(key)?;
    poseidon_hash(&elements)
}
