//! Modular arithmetic helpers on top of `num-bigint-dig`.

use num_bigint_dig::{BigInt, BigUint, RandBigInt, Sign, ToBigInt};
use num_integer::Integer;
use num_traits::{One, Zero};
use rand_core::CryptoRngCore;

/// Computes `x^-1 mod m`, or `None` when `gcd(x, m) != 1`.
pub fn mod_inverse(x: &BigUint, m: &BigUint) -> Option<BigUint> {
    if m.is_zero() {
        return None;
    }
    let (gcd, coefficient) = extended_gcd(&(x % m), m);
    if !gcd.is_one() {
        return None;
    }
    let m = BigInt::from_biguint(Sign::Plus, m.clone());
    let mut inverse = coefficient % &m;
    if inverse.sign() == Sign::Minus {
        inverse += &m;
    }
    inverse.to_biguint()
}

// Returns (gcd(a, b), x) with a*x + b*y = gcd(a, b).
fn extended_gcd(a: &BigUint, b: &BigUint) -> (BigUint, BigInt) {
    let (Some(mut a), Some(mut b)) = (a.to_bigint(), b.to_bigint()) else {
        return (BigUint::zero(), BigInt::zero());
    };
    let mut x0 = BigInt::one();
    let mut x1 = BigInt::zero();

    while !b.is_zero() {
        let (quotient, remainder) = a.div_rem(&b);
        a = b;
        b = remainder;

        let next = x0 - &quotient * &x1;
        x0 = x1;
        x1 = next;
    }
    (a.to_biguint().unwrap_or_default(), x0)
}

/// Samples uniformly from `[1, bound - 1]`.
///
/// `bound` must be at least 2.
pub fn random_nonzero_below(rng: &mut dyn CryptoRngCore, bound: &BigUint) -> BigUint {
    rng.gen_biguint_range(&BigUint::one(), bound)
}

/// Big-endian encoding with no leading zero bytes.
///
/// Zero encodes as the empty string.
pub fn to_be_bytes(value: &BigUint) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_bytes_be()
    }
}
