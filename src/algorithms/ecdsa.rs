//! ECDSA over the prime curves of the registry.
//!
//! Signatures are verified against a precomputed digest, `e` being derived
//! with the `bits2int` truncation of SEC 1 § 4.1.4 so that digests longer
//! than the group order (SHA-512 on P-256, SHA-256 on brainpoolP160r1) are
//! handled.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::curve::{invert, AffinePoint, NamedCurve};
use crate::errors::{Error, Result};

/// Converts a digest into a scalar, keeping the leftmost `order_bits` bits.
pub(crate) fn bits2int(digest: &[u8], order_bits: usize) -> BigUint {
    let e = BigUint::from_bytes_be(digest);
    let digest_bits = digest.len() * 8;
    if digest_bits > order_bits {
        e >> (digest_bits - order_bits)
    } else {
        e
    }
}

/// Verifies `(r, s)` over `digest` with the public point `q`.
pub(crate) fn verify_prehash(
    curve: NamedCurve,
    q: &AffinePoint,
    digest: &[u8],
    r: &BigUint,
    s: &BigUint,
) -> Result<()> {
    let arithmetic = curve.arithmetic();
    let n = arithmetic.n();

    if r.is_zero() || s.is_zero() || r >= n || s >= n {
        return Err(Error::Verification);
    }
    if q.is_identity() || !arithmetic.is_on_curve(q) {
        return Err(Error::Verification);
    }

    let e = bits2int(digest, curve.order_bits()) % n;
    let w = invert(s, n).ok_or(Error::Verification)?;
    let u1 = (&e * &w) % n;
    let u2 = (r * &w) % n;

    let point = arithmetic.add(
        &arithmetic.mul(&u1, arithmetic.generator()),
        &arithmetic.mul(&u2, q),
    );
    match point.coordinates() {
        Some((x, _)) if &(x % n) == r => Ok(()),
        _ => Err(Error::Verification),
    }
}

/// ⚠️ Signs a digest with the private scalar `d` and the nonce `k`.
///
/// # ☢️️ WARNING: HAZARDOUS API ☢️
///
/// The caller supplies the nonce. Reusing `k` leaks `d`. Only meant for
/// producing test vectors.
#[cfg_attr(not(feature = "hazmat"), allow(dead_code))]
pub fn sign_prehash(
    curve: NamedCurve,
    d: &BigUint,
    k: &BigUint,
    digest: &[u8],
) -> Result<(BigUint, BigUint)> {
    let arithmetic = curve.arithmetic();
    let n = arithmetic.n();
    if k.is_zero() || k >= n || d.is_zero() || d >= n {
        return Err(Error::malformed("scalar out of range"));
    }

    let r = match arithmetic.mul(k, arithmetic.generator()).coordinates() {
        Some((x, _)) => x % n,
        None => return Err(Error::malformed("nonce maps to the identity")),
    };
    let e = bits2int(digest, curve.order_bits()) % n;
    let k_inv = invert(k, n).ok_or_else(|| Error::malformed("nonce is not invertible"))?;
    let s = (k_inv * ((e + &r * d) % n)) % n;
    if r.is_zero() || s.is_zero() {
        return Err(Error::malformed("degenerate signature"));
    }
    Ok((r, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;

    fn keypair(curve: NamedCurve, d: u64) -> (BigUint, AffinePoint) {
        let d = BigUint::from(d);
        let arithmetic = curve.arithmetic();
        let q = arithmetic.mul(&d, arithmetic.generator());
        (d, q)
    }

    #[test]
    fn sign_and_verify_p256() {
        let curve = NamedCurve::P256;
        let (d, q) = keypair(curve, 0x1234_5678_9abc);
        let digest = HashAlgorithm::Sha256.digest(b"signed attributes");
        let (r, s) = sign_prehash(curve, &d, &BigUint::from(0xdead_beefu64), &digest).unwrap();

        assert!(verify_prehash(curve, &q, &digest, &r, &s).is_ok());

        let other = HashAlgorithm::Sha256.digest(b"tampered");
        assert!(verify_prehash(curve, &q, &other, &r, &s).is_err());
    }

    #[test]
    fn high_s_also_verifies() {
        let curve = NamedCurve::BrainpoolP256r1;
        let (d, q) = keypair(curve, 42);
        let digest = HashAlgorithm::Sha256.digest(b"document signer");
        let (r, s) = sign_prehash(curve, &d, &BigUint::from(77u32), &digest).unwrap();
        let s_neg = curve.order() - &s;
        assert!(verify_prehash(curve, &q, &digest, &r, &s_neg).is_ok());
    }

    #[test]
    fn long_digest_is_truncated() {
        let curve = NamedCurve::BrainpoolP160r1;
        let (d, q) = keypair(curve, 99);
        let digest = HashAlgorithm::Sha256.digest(b"short order");
        let (r, s) = sign_prehash(curve, &d, &BigUint::from(1234u32), &digest).unwrap();
        assert!(verify_prehash(curve, &q, &digest, &r, &s).is_ok());
    }

    #[test]
    fn rejects_out_of_range_scalars() {
        let curve = NamedCurve::P256;
        let (_, q) = keypair(curve, 7);
        let digest = [0u8; 32];
        assert!(verify_prehash(curve, &q, &digest, &BigUint::zero(), &BigUint::from(1u8)).is_err());
        assert!(verify_prehash(curve, &q, &digest, &curve.order(), &BigUint::from(1u8)).is_err());
    }
}
