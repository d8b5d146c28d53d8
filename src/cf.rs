//! Continued-fraction extraction of an order candidate from a phase sample.
//!
//! A phase measurement yields an integer j that is close to k/r · 2^m for an
//! unknown integer k and the unknown order r. The continued-fraction
//! expansion of j / 2^m has r (or a divisor of r) as the denominator of one
//! of its convergents, because the convergents are the best rational
//! approximations with small denominator. The extractor grows the expansion
//! one term at a time and returns the last convergent denominator below the
//! caller's bound.

use num_bigint::BigUint;
use num_traits::{One, Zero};

/// Partial quotients of the continued-fraction expansion of
/// numerator / denominator, truncated to at most `limit` terms.
///
/// The expansion [a0; a1, a2, ...] satisfies
///   numerator/denominator = a0 + 1/(a1 + 1/(a2 + ...))
pub fn expand_terms(numerator: &BigUint, denominator: &BigUint, limit: usize) -> Vec<BigUint> {
    let mut terms = Vec::new();
    let mut num = numerator.clone();
    let mut den = denominator.clone();
    while !den.is_zero() && terms.len() < limit {
        let quotient = &num / &den;
        let remainder = &num % &den;
        terms.push(quotient);
        num = den;
        den = remainder;
    }
    terms
}

/// Denominator of the convergent described by `terms`, evaluated from the
/// innermost term outward: (x, y) starts at (1, 0) and each partial quotient
/// q replaces the pair with (q·x + y, x). After the outermost term, x is the
/// convergent numerator and y its denominator.
pub fn convergent_denominator(terms: &[BigUint]) -> BigUint {
    let mut x = BigUint::one();
    let mut y = BigUint::zero();
    for q in terms.iter().rev() {
        let next_x = q * &x + &y;
        y = x;
        x = next_x;
    }
    y
}

/// Extract an order-candidate denominator from the phase sample j / 2^m.
///
/// Starting from a two-term truncation, the expansion is lengthened until
/// the convergent denominator stops changing or would reach `bound` (any
/// valid order is below the modulus, so the caller passes N). Returns the
/// last denominator still under the bound; may be a proper divisor of the
/// true order, which is why independent samples are combined downstream.
///
/// A phase numerator of 0 carries no information and must not be passed
/// here; the caller re-samples instead.
pub fn extract(phase_numerator: &BigUint, precision_bits: u64, bound: &BigUint) -> BigUint {
    debug_assert!(
        !phase_numerator.is_zero(),
        "zero phase sample carries no information"
    );

    let denominator = BigUint::one() << precision_bits;
    let mut best = BigUint::zero();
    let mut limit = 2usize;
    loop {
        let terms = expand_terms(phase_numerator, &denominator, limit);
        let candidate = convergent_denominator(&terms);
        if candidate == best || candidate >= *bound {
            return best;
        }
        best = candidate;
        limit += 1;
    }
}
