//! MGF1 mask generation (RFC 8017 § B.2.1).

use digest::DynDigest;

use crate::errors::{Error, Result};

/// XORs `out` with `MGF1(seed, out.len())` computed with `digest`.
///
/// The mask is the concatenation of `Hash(seed || counter)` for a 32-bit
/// big-endian counter, truncated to the length of `out`.
pub(crate) fn mgf1_xor(out: &mut [u8], digest: &mut dyn DynDigest, seed: &[u8]) -> Result<()> {
    let block_len = digest.output_size();
    for (counter, block) in out.chunks_mut(block_len).enumerate() {
        let counter = u32::try_from(counter)
            .map_err(|_| Error::malformed("MGF1 mask longer than 2^32 blocks"))?;
        digest.update(seed);
        digest.update(&counter.to_be_bytes());
        let mask = digest.finalize_reset();
        block
            .iter_mut()
            .zip(mask.iter())
            .for_each(|(byte, m)| *byte ^= m);
    }
    Ok(())
}
