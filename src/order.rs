//! Multi-sample order estimation over a phase-estimation oracle.
//!
//! One phase sample reveals the order only up to an unknown common factor
//! between the measured numerator and the register size, so a single
//! continued-fraction extraction may return a proper divisor of the order.
//! Combining several independent samples by least common multiple recovers
//! the full order with high probability: all samples have to miss the same
//! prime-power factor simultaneously for the estimate to stay short, and
//! that probability shrinks geometrically with the sample count.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::arith;
use crate::cf;
use crate::oracle::{OracleError, PhaseOracle};
use crate::FactorError;

/// Consecutive zero-phase samples tolerated before the oracle is declared
/// in violation of its contract.
const MAX_ZERO_SAMPLES: u32 = 64;

/// Register precision for phase estimation: ceil(2 · (1 + log2(N − 1)))
/// bits, computed exactly in integers as 2 + ceil(log2((N − 1)²)).
pub fn precision_bits(n: &BigUint) -> u64 {
    let span = n - 1u32;
    let squared = &span * &span;
    2 + (squared - 1u32).bits()
}

/// One oracle call converted to an order candidate, re-sampling on j = 0.
pub fn sample_order<O: PhaseOracle + ?Sized>(
    oracle: &O,
    witness: &BigUint,
    modulus: &BigUint,
    precision_bits: u64,
) -> Result<BigUint, FactorError> {
    for _ in 0..MAX_ZERO_SAMPLES {
        let j = oracle.estimate_phase(witness, modulus, precision_bits)?;
        if j.is_zero() {
            log::debug!("zero phase sample for witness {witness}, re-sampling");
            continue;
        }
        return Ok(cf::extract(&j, precision_bits, modulus));
    }
    Err(FactorError::Oracle(OracleError::ExhaustedZeroSamples(
        MAX_ZERO_SAMPLES,
    )))
}

/// Estimate the multiplicative order of `witness` modulo `modulus` by
/// combining `samples` independent single-sample candidates via lcm.
///
/// The result approximates the true order and can occasionally be wrong;
/// the even-order and gcd checks in the driver are the actual correctness
/// gate, so no attempt is made to verify the estimate here.
pub fn estimate_order<O: PhaseOracle + ?Sized>(
    oracle: &O,
    witness: &BigUint,
    modulus: &BigUint,
    samples: u32,
) -> Result<BigUint, FactorError> {
    let m = precision_bits(modulus);
    let mut order = sample_order(oracle, witness, modulus, m)?;
    for _ in 1..samples.max(1) {
        let next = sample_order(oracle, witness, modulus, m)?;
        order = arith::lcm(&order, &next);
    }
    log::debug!("combined {samples} samples into order estimate {order}");
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn big(n: u64) -> BigUint {
        BigUint::from(n)
    }

    /// Always returns the same phase numerator.
    struct FixedPhaseOracle(u64);

    impl PhaseOracle for FixedPhaseOracle {
        fn estimate_phase(
            &self,
            _witness: &BigUint,
            _modulus: &BigUint,
            _precision_bits: u64,
        ) -> Result<BigUint, OracleError> {
            Ok(big(self.0))
        }
    }

    /// Replays a fixed list of phase numerators in order.
    struct ScriptedPhaseOracle {
        phases: Mutex<VecDeque<u64>>,
    }

    impl ScriptedPhaseOracle {
        fn new(phases: &[u64]) -> Self {
            Self {
                phases: Mutex::new(phases.iter().copied().collect()),
            }
        }
    }

    impl PhaseOracle for ScriptedPhaseOracle {
        fn estimate_phase(
            &self,
            _witness: &BigUint,
            _modulus: &BigUint,
            _precision_bits: u64,
        ) -> Result<BigUint, OracleError> {
            let j = self
                .phases
                .lock()
                .unwrap()
                .pop_front()
                .expect("phase script exhausted");
            Ok(big(j))
        }
    }

    #[test]
    fn test_precision_bits() {
        // ceil(2 * (1 + log2(14))) = 10
        assert_eq!(precision_bits(&big(15)), 10);
        // ceil(2 * (1 + log2(20))) = 11
        assert_eq!(precision_bits(&big(21)), 11);
        // ceil(2 * (1 + log2(142))) = 17
        assert_eq!(precision_bits(&big(143)), 17);
    }

    #[test]
    fn test_sample_order_retries_zero_phase() {
        let oracle = ScriptedPhaseOracle::new(&[0, 0, 256]);
        let r = sample_order(&oracle, &big(2), &big(15), 10).expect("sample");
        assert_eq!(r, big(4));
    }

    #[test]
    fn test_sample_order_rejects_zero_flood() {
        let oracle = FixedPhaseOracle(0);
        let err = sample_order(&oracle, &big(2), &big(15), 10).expect_err("must fail");
        assert!(matches!(
            err,
            FactorError::Oracle(OracleError::ExhaustedZeroSamples(_))
        ));
    }

    #[test]
    fn test_estimate_order_from_clean_samples() {
        // Every sample encodes 1/4 exactly, so the estimate is the order
        // itself.
        let oracle = FixedPhaseOracle(256);
        let r = estimate_order(&oracle, &big(2), &big(15), 4).expect("estimate");
        assert_eq!(r, big(4));
    }

    #[test]
    fn test_estimate_order_lcm_recovers_from_divisor_samples() {
        // 512/1024 = 1/2 reveals only the divisor 2; one 768/1024 = 3/4
        // sample is enough for the lcm to reach the true order 4.
        let oracle = ScriptedPhaseOracle::new(&[512, 512, 768, 512]);
        let r = estimate_order(&oracle, &big(2), &big(15), 4).expect("estimate");
        assert_eq!(r, big(4));
    }

    #[test]
    fn test_estimate_order_is_monotone_in_samples() {
        // lcm refinement never shrinks the estimate.
        let one_sample = {
            let oracle = ScriptedPhaseOracle::new(&[512]);
            estimate_order(&oracle, &big(2), &big(15), 1).expect("estimate")
        };
        let two_samples = {
            let oracle = ScriptedPhaseOracle::new(&[512, 768]);
            estimate_order(&oracle, &big(2), &big(15), 2).expect("estimate")
        };
        assert!(two_samples >= one_sample);
    }
}
