//! Modular arithmetic and number-theory utilities.
//!
//! Pure functions over `BigUint`; no internal state. Everything the driver,
//! the continued-fraction extractor, and the simulated oracle need lives
//! here: gcd/lcm, modular exponentiation, integer roots, perfect-power
//! detection, Miller-Rabin, and brute-force multiplicative-order search.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

/// Greatest common divisor.
pub fn gcd(a: &BigUint, b: &BigUint) -> BigUint {
    a.gcd(b)
}

/// Least common multiple. Zero if either operand is zero.
pub fn lcm(a: &BigUint, b: &BigUint) -> BigUint {
    a.lcm(b)
}

/// Modular exponentiation: base^exp mod modulus. Panics if modulus is zero.
pub fn mod_pow(base: &BigUint, exp: &BigUint, modulus: &BigUint) -> BigUint {
    base.modpow(exp, modulus)
}

/// Compute floor(sqrt(n)) using Newton's method.
pub fn isqrt(n: &BigUint) -> BigUint {
    if n.is_zero() {
        return BigUint::zero();
    }
    if n.is_one() {
        return BigUint::one();
    }

    // Initial guess: 2^((bits+1)/2)
    let bits = n.bits();
    let mut x = BigUint::one() << ((bits + 1) / 2);

    loop {
        // x_next = (x + n/x) / 2
        let x_next = (&x + n / &x) >> 1;
        if x_next >= x {
            return x;
        }
        x = x_next;
    }
}

/// Compute floor(n^(1/k)) by binary search.
pub fn nth_root(n: &BigUint, k: u32) -> BigUint {
    assert!(k >= 1, "root index must be positive");
    if k == 1 || n.is_zero() || n.is_one() {
        return n.clone();
    }
    if k == 2 {
        return isqrt(n);
    }

    // Invariant: lo^k <= n < hi^k
    let mut lo = BigUint::one();
    let mut hi = BigUint::one() << (n.bits() / k as u64 + 1);
    while &lo + 1u32 < hi {
        let mid: BigUint = (&lo + &hi) >> 1;
        if mid.pow(k) <= *n {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// True iff n = b^k for integers b >= 2, k >= 2.
///
/// The order-finding reduction breaks down on prime powers, so callers use
/// this as a precondition screen before attempting to factor.
pub fn is_perfect_power(n: &BigUint) -> bool {
    if *n < BigUint::from(4u32) {
        return false;
    }
    let two = BigUint::from(2u32);
    for k in 2..=n.bits() as u32 {
        let root = nth_root(n, k);
        if root >= two && root.pow(k) == *n {
            return true;
        }
    }
    false
}

/// Uniform random integer in [2, n - 2], the witness range shared by
/// Miller-Rabin and order finding. Requires n >= 5.
pub fn random_in_witness_range(n: &BigUint, rng: &mut impl Rng) -> BigUint {
    let two = BigUint::from(2u32);
    let upper = n - &two;
    let num_bytes = n.to_bytes_be().len();
    loop {
        let mut bytes = vec![0u8; num_bytes];
        rng.fill(&mut bytes[..]);
        let candidate = BigUint::from_bytes_be(&bytes) % n;
        if candidate >= two && candidate <= upper {
            return candidate;
        }
    }
}

/// Miller-Rabin probabilistic primality test with an injected random source.
pub fn is_probably_prime(n: &BigUint, rounds: u32, rng: &mut impl Rng) -> bool {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let three = BigUint::from(3u32);

    if *n < two {
        return false;
    }
    if *n == two || *n == three {
        return true;
    }
    if n.is_even() {
        return false;
    }

    // Write n-1 as 2^r * d with d odd
    let n_minus_1 = n - &one;
    let mut d = n_minus_1.clone();
    let mut r: u32 = 0;
    while d.is_even() {
        d >>= 1u32;
        r += 1;
    }

    'witness: for _ in 0..rounds {
        let a = random_in_witness_range(n, rng);
        let mut x = a.modpow(&d, n);

        if x == one || x == n_minus_1 {
            continue 'witness;
        }

        for _ in 0..r.saturating_sub(1) {
            x = x.modpow(&two, n);
            if x == n_minus_1 {
                continue 'witness;
            }
        }

        return false;
    }

    true
}

/// Smallest positive r with a^r ≡ 1 (mod n), found by brute-force iteration
/// of the map x -> x*a mod n. Requires gcd(a, n) = 1 for a result to exist;
/// returns `None` if no period shows up within `max_period` steps.
pub fn multiplicative_order(a: &BigUint, n: &BigUint, max_period: u64) -> Option<u64> {
    let one = BigUint::one();
    let mut current = a % n;
    for period in 1..=max_period {
        if current == one {
            return Some(period);
        }
        current = current * a % n;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    #[test]
    fn test_gcd_euclidean_law() {
        // gcd(a, b) == gcd(b, a mod b)
        for (a, b) in [(48u64, 18u64), (1071, 462), (143, 11), (97, 31), (100, 75)] {
            let (a, b) = (big(a), big(b));
            assert_eq!(gcd(&a, &b), gcd(&b, &(&a % &b)));
        }
        assert_eq!(gcd(&big(12), &BigUint::zero()), big(12));
        assert_eq!(gcd(&BigUint::zero(), &big(7)), big(7));
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(&big(4), &big(6)), big(12));
        assert_eq!(lcm(&big(2), &big(4)), big(4));
        assert_eq!(lcm(&big(1), &big(9)), big(9));
        assert_eq!(lcm(&BigUint::zero(), &big(5)), BigUint::zero());
    }

    #[test]
    fn test_mod_pow_against_repeated_multiplication() {
        for a in 2u64..6 {
            for e in 0u64..8 {
                for m in [5u64, 7, 15, 21] {
                    let mut expected = 1u64;
                    for _ in 0..e {
                        expected = expected * a % m;
                    }
                    assert_eq!(
                        mod_pow(&big(a), &big(e), &big(m)),
                        big(expected),
                        "{}^{} mod {}",
                        a,
                        e,
                        m
                    );
                }
            }
        }
    }

    #[test]
    fn test_isqrt() {
        assert_eq!(isqrt(&big(0)), big(0));
        assert_eq!(isqrt(&big(1)), big(1));
        assert_eq!(isqrt(&big(8)), big(2));
        assert_eq!(isqrt(&big(9)), big(3));
        assert_eq!(isqrt(&big(143)), big(11));
        assert_eq!(isqrt(&big(144)), big(12));
    }

    #[test]
    fn test_nth_root() {
        assert_eq!(nth_root(&big(27), 3), big(3));
        assert_eq!(nth_root(&big(28), 3), big(3));
        assert_eq!(nth_root(&big(26), 3), big(2));
        assert_eq!(nth_root(&big(1024), 10), big(2));
        assert_eq!(nth_root(&big(1023), 10), big(1));
    }

    #[test]
    fn test_is_perfect_power() {
        for n in [4u64, 8, 9, 16, 25, 27, 32, 49, 121, 128, 343] {
            assert!(is_perfect_power(&big(n)), "{} is a perfect power", n);
        }
        for n in [2u64, 3, 6, 10, 15, 21, 143] {
            assert!(!is_perfect_power(&big(n)), "{} is not a perfect power", n);
        }
    }

    #[test]
    fn test_random_in_witness_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = big(15);
        let two = big(2);
        let upper = big(13);
        for _ in 0..200 {
            let a = random_in_witness_range(&n, &mut rng);
            assert!(a >= two && a <= upper, "witness {} out of [2, 13]", a);
        }
    }

    #[test]
    fn test_is_probably_prime() {
        let mut rng = StdRng::seed_from_u64(11);
        assert!(is_probably_prime(&big(2), 20, &mut rng));
        assert!(is_probably_prime(&big(7), 20, &mut rng));
        assert!(is_probably_prime(&big(104_729), 20, &mut rng));
        assert!(!is_probably_prime(&big(1), 20, &mut rng));
        assert!(!is_probably_prime(&big(15), 20, &mut rng));
        assert!(!is_probably_prime(&big(100), 20, &mut rng));
    }

    #[test]
    fn test_multiplicative_order() {
        // 2^4 = 16 ≡ 1 (mod 15)
        assert_eq!(multiplicative_order(&big(2), &big(15), 100), Some(4));
        // 2^6 = 64 ≡ 1 (mod 21)
        assert_eq!(multiplicative_order(&big(2), &big(21), 100), Some(6));
        // 4 has order 2 mod 15
        assert_eq!(multiplicative_order(&big(4), &big(15), 100), Some(2));
        // budget too small
        assert_eq!(multiplicative_order(&big(2), &big(15), 3), None);
    }
}
