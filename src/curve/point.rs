//! Affine group law over GF(p).
//!
//! Variable time. Only public data (keys, signatures, digests) ever flows
//! through here, the crate never handles private scalars outside of tests.

use num_bigint::{BigInt, BigUint, ModInverse, ToBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};

use super::params::CurveParams;

/// A point on a short Weierstrass curve in affine coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AffinePoint {
    /// The point at infinity.
    Identity,
    /// A finite point.
    Point {
        /// X coordinate.
        x: BigUint,
        /// Y coordinate.
        y: BigUint,
    },
}

impl AffinePoint {
    /// Returns the coordinates of a finite point.
    pub fn coordinates(&self) -> Option<(&BigUint, &BigUint)> {
        match self {
            AffinePoint::Identity => None,
            AffinePoint::Point { x, y } => Some((x, y)),
        }
    }

    /// Whether this is the point at infinity.
    pub fn is_identity(&self) -> bool {
        matches!(self, AffinePoint::Identity)
    }
}

/// Curve parameters lifted into big integers.
#[derive(Clone, Debug)]
pub struct WeierstrassCurve {
    pub(crate) p: BigUint,
    pub(crate) a: BigUint,
    pub(crate) b: BigUint,
    pub(crate) n: BigUint,
    pub(crate) g: AffinePoint,
}

impl From<&CurveParams> for WeierstrassCurve {
    fn from(params: &CurveParams) -> Self {
        WeierstrassCurve {
            p: BigUint::from_bytes_be(params.p),
            a: BigUint::from_bytes_be(params.a),
            b: BigUint::from_bytes_be(params.b),
            n: BigUint::from_bytes_be(params.n),
            g: AffinePoint::Point {
                x: BigUint::from_bytes_be(params.gx),
                y: BigUint::from_bytes_be(params.gy),
            },
        }
    }
}

impl WeierstrassCurve {
    /// Field prime.
    pub fn p(&self) -> &BigUint {
        &self.p
    }

    /// Group order.
    pub fn n(&self) -> &BigUint {
        &self.n
    }

    /// Base point.
    pub fn generator(&self) -> &AffinePoint {
        &self.g
    }

    fn add_mod(&self, x: &BigUint, y: &BigUint) -> BigUint {
        (x + y) % &self.p
    }

    fn sub_mod(&self, x: &BigUint, y: &BigUint) -> BigUint {
        ((x + &self.p) - (y % &self.p)) % &self.p
    }

    fn mul_mod(&self, x: &BigUint, y: &BigUint) -> BigUint {
        (x * y) % &self.p
    }

    fn inv_mod(&self, x: &BigUint) -> Option<BigUint> {
        invert(x, &self.p)
    }

    /// Right hand side of the curve equation, `x^3 + ax + b`.
    fn rhs(&self, x: &BigUint) -> BigUint {
        let x3 = self.mul_mod(&self.mul_mod(x, x), x);
        let ax = self.mul_mod(&self.a, x);
        self.add_mod(&self.add_mod(&x3, &ax), &self.b)
    }

    /// Checks that the point satisfies the curve equation.
    pub fn is_on_curve(&self, point: &AffinePoint) -> bool {
        match point {
            AffinePoint::Identity => true,
            AffinePoint::Point { x, y } => {
                x < &self.p && y < &self.p && self.mul_mod(y, y) == self.rhs(x)
            }
        }
    }

    /// Point negation.
    pub fn negate(&self, point: &AffinePoint) -> AffinePoint {
        match point {
            AffinePoint::Identity => AffinePoint::Identity,
            AffinePoint::Point { x, y } => AffinePoint::Point {
                x: x.clone(),
                y: self.sub_mod(&BigUint::zero(), y),
            },
        }
    }

    /// Point addition.
    pub fn add(&self, lhs: &AffinePoint, rhs: &AffinePoint) -> AffinePoint {
        let (x1, y1, x2, y2) = match (lhs, rhs) {
            (AffinePoint::Identity, _) => return rhs.clone(),
            (_, AffinePoint::Identity) => return lhs.clone(),
            (AffinePoint::Point { x: x1, y: y1 }, AffinePoint::Point { x: x2, y: y2 }) => {
                (x1, y1, x2, y2)
            }
        };

        if x1 == x2 {
            if y1 == y2 {
                return self.double(lhs);
            }
            return AffinePoint::Identity;
        }

        let num = self.sub_mod(y2, y1);
        let den = self.sub_mod(x2, x1);
        let lambda = match self.inv_mod(&den) {
            Some(inv) => self.mul_mod(&num, &inv),
            None => return AffinePoint::Identity,
        };
        self.finish(&lambda, x1, y1, x2)
    }

    /// Point doubling.
    pub fn double(&self, point: &AffinePoint) -> AffinePoint {
        let (x, y) = match point {
            AffinePoint::Identity => return AffinePoint::Identity,
            AffinePoint::Point { x, y } => (x, y),
        };
        if y.is_zero() {
            return AffinePoint::Identity;
        }

        let three = BigUint::from(3u8);
        let num = self.add_mod(&self.mul_mod(&three, &self.mul_mod(x, x)), &self.a);
        let den = self.add_mod(y, y);
        let lambda = match self.inv_mod(&den) {
            Some(inv) => self.mul_mod(&num, &inv),
            None => return AffinePoint::Identity,
        };
        self.finish(&lambda, x, y, x)
    }

    fn finish(&self, lambda: &BigUint, x1: &BigUint, y1: &BigUint, x2: &BigUint) -> AffinePoint {
        let x3 = self.sub_mod(&self.sub_mod(&self.mul_mod(lambda, lambda), x1), x2);
        let y3 = self.sub_mod(&self.mul_mod(lambda, &self.sub_mod(x1, &x3)), y1);
        AffinePoint::Point { x: x3, y: y3 }
    }

    /// Scalar multiplication by double-and-add, most significant bit first.
    pub fn mul(&self, k: &BigUint, point: &AffinePoint) -> AffinePoint {
        let mut acc = AffinePoint::Identity;
        for byte in k.to_bytes_be() {
            for bit in (0..8).rev() {
                acc = self.double(&acc);
                if (byte >> bit) & 1 == 1 {
                    acc = self.add(&acc, point);
                }
            }
        }
        acc
    }

    /// Square root in GF(p), if one exists.
    pub fn sqrt(&self, v: &BigUint) -> Option<BigUint> {
        let p = &self.p;
        let v = v % p;
        if v.is_zero() {
            return Some(v);
        }

        let one = BigUint::one();
        let two = BigUint::from(2u8);
        let p_minus_one = p - &one;

        // Euler's criterion
        if v.modpow(&(&p_minus_one >> 1), p) != one {
            return None;
        }

        if p % 4u32 == BigUint::from(3u32) {
            let root = v.modpow(&((p + &one) >> 2), p);
            return Some(root);
        }

        // Tonelli-Shanks
        let mut q = p_minus_one.clone();
        let mut s = 0u32;
        while q.is_even() {
            q >>= 1;
            s += 1;
        }

        let mut z = two;
        while z.modpow(&(&p_minus_one >> 1), p) != p_minus_one {
            z += 1u32;
        }

        let mut m = s;
        let mut c = z.modpow(&q, p);
        let mut t = v.modpow(&q, p);
        let mut r = v.modpow(&((&q + &one) >> 1), p);

        while t != one {
            let mut i = 0u32;
            let mut t2 = t.clone();
            while t2 != one {
                t2 = self.mul_mod(&t2, &t2);
                i += 1;
                if i == m {
                    return None;
                }
            }

            let mut b = c.clone();
            for _ in 0..(m - i - 1) {
                b = self.mul_mod(&b, &b);
            }
            m = i;
            c = self.mul_mod(&b, &b);
            t = self.mul_mod(&t, &c);
            r = self.mul_mod(&r, &b);
        }
        Some(r)
    }

    /// Recovers a point from its X coordinate and the parity of Y.
    pub fn decompress(&self, x: &BigUint, y_is_odd: bool) -> Option<AffinePoint> {
        if x >= &self.p {
            return None;
        }
        let y = self.sqrt(&self.rhs(x))?;
        let y = if y.is_odd() == y_is_odd {
            y
        } else {
            self.sub_mod(&BigUint::zero(), &y)
        };
        Some(AffinePoint::Point { x: x.clone(), y })
    }
}

/// Modular inverse normalised into `[0, m)`.
pub(crate) fn invert(x: &BigUint, m: &BigUint) -> Option<BigUint> {
    let inv: BigInt = x.mod_inverse(m)?;
    let m = m.to_bigint()?;
    inv.mod_floor(&m).to_biguint()
}
