//! Traits related to the key components

use num_bigint::BigUint;

/// Components of an RSA public key.
pub trait PublicKeyParts {
    /// Returns the modulus of the key.
    fn n(&self) -> &BigUint;

    /// Returns the public exponent of the key.
    fn e(&self) -> &BigUint;

    /// Returns the modulus size in bytes. Raw signatures for or by this
    /// public key will have the same size.
    fn size(&self) -> usize {
        self.n().bits().div_ceil(8)
    }

    /// Returns the modulus size in bits.
    fn bits(&self) -> usize {
        self.n().bits()
    }
}
