//! Fixed-width big-endian encodings.

use alloc::vec::Vec;
use num_bigint::BigUint;

use crate::errors::{Error, Result};

/// `input` left padded with zeros to exactly `width` bytes.
#[inline]
pub(crate) fn left_pad(input: &[u8], width: usize) -> Result<Vec<u8>> {
    let fill = width.checked_sub(input.len()).ok_or(Error::Verification)?;
    let mut out = Vec::with_capacity(width);
    out.resize(fill, 0);
    out.extend_from_slice(input);
    Ok(out)
}

/// Big-endian encoding of `input` in exactly `width` bytes.
#[inline]
pub(crate) fn uint_to_be_pad(input: BigUint, width: usize) -> Result<Vec<u8>> {
    left_pad(&input.to_bytes_be(), width)
}

/// Left pads with zeros up to `len`. Longer input is returned unchanged.
#[inline]
pub(crate) fn pad_be(input: &[u8], len: usize) -> Vec<u8> {
    left_pad(input, len).unwrap_or_else(|_| input.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_exact_width() {
        assert_eq!(left_pad(&[0xAB, 0xCD], 4).unwrap(), vec![0, 0, 0xAB, 0xCD]);
        assert_eq!(left_pad(&[0xAB, 0xCD], 2).unwrap(), vec![0xAB, 0xCD]);
        assert!(left_pad(&[1, 2, 3], 2).is_err());
    }

    #[test]
    fn uint_encoding_is_fixed_width() {
        let padded = uint_to_be_pad(BigUint::from(0x0102u32), 8).unwrap();
        assert_eq!(padded, vec![0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn pad_be_keeps_long_input() {
        assert_eq!(pad_be(&[1, 2, 3], 2), vec![1, 2, 3]);
        assert_eq!(pad_be(&[1], 3), vec![0, 0, 1]);
    }
}
