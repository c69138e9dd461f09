//! Limb decomposition and SHA message padding for circuit inputs.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::errors::{Error, Result};
use crate::key::PublicKey;

/// Limb size of RSA moduli and signatures.
pub const RSA_CHUNK_BITS: usize = 64;

/// Limb size of EC coordinates and scalars.
pub const EC_CHUNK_BITS: usize = 66;

/// Splits `value` into `count` little-endian limbs of `bits` bits each,
/// rendered as decimal strings.
pub fn split_to_chunks(value: &BigUint, bits: usize, count: usize) -> Vec<String> {
    let mask = (BigUint::one() << bits) - BigUint::one();
    (0..count)
        .map(|i| ((value >> (i * bits)) & &mask).to_string())
        .collect()
}

fn limbs(bytes: &[u8], bits: usize, count: usize) -> Vec<String> {
    split_to_chunks(&BigUint::from_bytes_be(bytes), bits, count)
}

/// Public key and signature in limb form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedParams {
    /// Public key limbs. EC keys list the `x` limbs, then the `y` limbs.
    pub pub_key: Vec<String>,
    /// Signature limbs. ECDSA lists the `r` limbs, then the `s` limbs.
    pub signature: Vec<String>,
    /// Total number of limbs per value.
    pub chunk_number: usize,
    /// Field size of an EC key in bits, zero for RSA.
    pub ec_field_size: usize,
}

impl ChunkedParams {
    /// Limbs of `key` and of a signature already normalized for it.
    pub fn for_key(key: &PublicKey, signature: &[u8]) -> Result<Self> {
        match key {
            PublicKey::Rsa(_) => {
                let count = key.bits().div_ceil(RSA_CHUNK_BITS);
                Ok(Self {
                    pub_key: limbs(&key.canonical_bytes(), RSA_CHUNK_BITS, count),
                    signature: limbs(signature, RSA_CHUNK_BITS, count),
                    chunk_number: count,
                    ec_field_size: 0,
                })
            }
            PublicKey::Ec(ec) => {
                let curve = ec.curve();
                let len = curve.byte_len();
                if signature.len() != 2 * len {
                    return Err(Error::malformed("ECDSA signature is not normalized"));
                }
                let count = curve.field_bits().div_ceil(EC_CHUNK_BITS);
                let (r, s) = signature.split_at(len);

                let mut pub_key = limbs(&ec.x_bytes(), EC_CHUNK_BITS, count);
                pub_key.extend(limbs(&ec.y_bytes(), EC_CHUNK_BITS, count));
                let mut sig = limbs(r, EC_CHUNK_BITS, count);
                sig.extend(limbs(s, EC_CHUNK_BITS, count));

                Ok(Self {
                    pub_key,
                    signature: sig,
                    chunk_number: 2 * count,
                    ec_field_size: curve.field_bits(),
                })
            }
        }
    }
}

/// SHA-2 style message padding as a bit vector.
///
/// The message bits (MSB first) are followed by a single `1`, zeros up to
/// the length field and the big-endian bit length. The length field is 128
/// bits wide for 1024-bit blocks (SHA-384, SHA-512) and 64 bits otherwise.
/// Whole zero blocks then extend the result to `block_number` blocks.
pub fn pad_bits_to_fixed_blocks(
    message: &[u8],
    block_number: usize,
    block_size_bits: usize,
) -> Result<Vec<u8>> {
    let length_bits = length_field_bits(block_size_bits);
    if block_size_bits % 8 != 0 || block_size_bits <= length_bits {
        return Err(Error::malformed(format!(
            "invalid block size of {block_size_bits} bits"
        )));
    }

    let bit_len = message.len() * 8;
    let mut bits: Vec<u8> = Vec::with_capacity(block_number * block_size_bits);
    for byte in message {
        bits.extend((0..8).rev().map(|i| (byte >> i) & 1));
    }
    bits.push(1);
    while (bits.len() + length_bits) % block_size_bits != 0 {
        bits.push(0);
    }
    let length = u128::try_from(bit_len).map_err(|_| Error::malformed("message too long"))?;
    bits.extend((0..length_bits).rev().map(|i| ((length >> i) & 1) as u8));

    let target = block_number * block_size_bits;
    if bits.len() > target {
        return Err(Error::InputTooShort {
            min: bits.len() / 8,
            len: target / 8,
        });
    }
    bits.resize(target, 0);
    Ok(bits)
}

fn length_field_bits(block_size_bits: usize) -> usize {
    if block_size_bits >= 1024 {
        128
    } else {
        64
    }
}

/// Value of the limbs back as an integer.
pub fn join_chunks(chunks: &[String], bits: usize) -> Option<BigUint> {
    chunks.iter().rev().try_fold(BigUint::zero(), |acc, chunk| {
        let limb = chunk.parse::<BigUint>().ok()?;
        Some((acc << bits) + limb)
    })
}
