//! secp256k1 field and point arithmetic, implemented directly over
//! `num-bigint::BigUint` rather than the `secp256k1`/`k256` crates — per
//! spec this is one of the toolkit's own core subsystems, not a
//! delegated concern.

use num_bigint::{BigInt, BigUint};
use num_traits::{One, Zero};
use once_cell::sync::Lazy;

/// Field prime `p = 2^256 - 2^32 - 977`.
pub static P: Lazy<BigUint> = Lazy::new(|| {
    (BigUint::one() << 256u32) - (BigUint::one() << 32u32) - BigUint::from(977u32)
});

/// Group order `n`.
pub static N: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141",
        16,
    )
    .expect("hard-coded group order parses")
});

/// The generator point `G`.
pub static GX: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"79BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798",
        16,
    )
    .expect("hard-coded generator x parses")
});

pub static GY: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(
        b"483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8",
        16,
    )
    .expect("hard-coded generator y parses")
});

pub fn generator() -> Point {
    Point::Affine {
        x: GX.clone(),
        y: GY.clone(),
    }
}

/// A point on secp256k1, in affine coordinates, or the identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Point {
    Infinity,
    Affine { x: BigUint, y: BigUint },
}

impl Point {
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    pub fn x(&self) -> Option<&BigUint> {
        match self {
            Point::Affine { x, .. } => Some(x),
            Point::Infinity => None,
        }
    }

    pub fn y(&self) -> Option<&BigUint> {
        match self {
            Point::Affine { y, .. } => Some(y),
            Point::Infinity => None,
        }
    }
}

fn mod_p(a: &BigUint) -> BigUint {
    a % &*P
}

/// Modular inverse of `a` modulo `m`, via the extended Euclidean
/// algorithm. `a` must be nonzero modulo `m`.
fn mod_inverse(a: &BigUint, m: &BigUint) -> BigUint {
    let (mut old_r, mut r) = (BigInt::from(a.clone()), BigInt::from(m.clone()));
    let (mut old_s, mut s) = (BigInt::one(), BigInt::zero());
    while !r.is_zero() {
        let quotient = &old_r / &r;
        let new_r = &old_r - &quotient * &r;
        old_r = std::mem::replace(&mut r, new_r);
        let new_s = &old_s - &quotient * &s;
        old_s = std::mem::replace(&mut s, new_s);
    }
    let m_signed = BigInt::from(m.clone());
    let result = ((old_s % &m_signed) + &m_signed) % &m_signed;
    result.to_biguint().expect("result reduced modulo m is non-negative")
}

/// `x^3 + 7 mod p`, the right-hand side of the curve equation.
pub fn rhs(x: &BigUint) -> BigUint {
    let x3 = mod_p(&(x * x % &*P * x));
    mod_p(&(x3 + BigUint::from(7u32)))
}

/// Tonelli-Shanks specialized for `p ≡ 3 (mod 4)` (true for secp256k1's
/// field prime): `sqrt(a) = a^((p+1)/4) mod p`. Returns `None` when `a`
/// is not a quadratic residue modulo `p`.
pub fn modsqrt(a: &BigUint, p: &BigUint) -> Option<BigUint> {
    if a.is_zero() {
        return Some(BigUint::zero());
    }
    let exponent = (p + BigUint::one()) / BigUint::from(4u32);
    let root = a.modpow(&exponent, p);
    if &(&root * &root % p) == a {
        Some(root)
    } else {
        None
    }
}

/// Adds two points, handling the identity and the doubling case.
pub fn point_add(a: &Point, b: &Point) -> Point {
    match (a, b) {
        (Point::Infinity, other) | (other, Point::Infinity) => other.clone(),
        (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => {
            if x1 == x2 {
                if (y1 + y2) % &*P == BigUint::zero() {
                    return Point::Infinity;
                }
                // Point doubling: lambda = (3*x1^2) / (2*y1)
                let numerator = mod_p(&(BigUint::from(3u32) * x1 * x1 % &*P));
                let denominator = mod_p(&(BigUint::from(2u32) * y1));
                let lambda = mod_p(&(numerator * mod_inverse(&denominator, &P)));
                affine_from_lambda(&lambda, x1, y1, x1)
            } else {
                // Point addition: lambda = (y2 - y1) / (x2 - x1)
                let numerator = mod_p(&(y2 + &*P - y1));
                let denominator = mod_p(&(x2 + &*P - x1));
                let lambda = mod_p(&(numerator * mod_inverse(&denominator, &P)));
                affine_from_lambda(&lambda, x1, y1, x2)
            }
        }
    }
}

fn affine_from_lambda(lambda: &BigUint, x1: &BigUint, y1: &BigUint, x2: &BigUint) -> Point {
    let lambda_sq = mod_p(&(lambda * lambda));
    let x3 = mod_p(&(lambda_sq + &*P + &*P - x1 - x2));
    let y3 = mod_p(&(lambda * mod_p(&(x1 + &*P - &x3)) + &*P - y1 % &*P));
    Point::Affine { x: x3, y: y3 }
}

/// Scalar multiplication by double-and-add.
pub fn scalar_mul(k: &BigUint, point: &Point) -> Point {
    let mut result = Point::Infinity;
    let mut addend = point.clone();
    let mut k = k.clone();
    while !k.is_zero() {
        if &k & BigUint::one() == BigUint::one() {
            result = point_add(&result, &addend);
        }
        addend = point_add(&addend, &addend);
        k >>= 1u32;
    }
    result
}
