//! Phase-estimation oracle boundary.
//!
//! The classical driver consumes exactly one capability from its
//! environment: a probabilistic phase estimate for the
//! multiplication-by-`a` operator modulo N. The trait keeps the driver
//! independent of the backend: a quantum-circuit simulation, a real
//! quantum device, or the classical stand-in shipped here.

use std::sync::Mutex;

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::arith;

/// Default period-search budget for [`SimulatedPhaseOracle`].
pub const DEFAULT_MAX_PERIOD: u64 = 1 << 20;

/// Errors surfaced across the oracle boundary.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The measurement did not collapse to a single definite outcome.
    /// A backend that cannot recover from this is violating its contract.
    #[error("phase measurement produced no definite outcome")]
    Indeterminate,

    /// The simulated backend's brute-force period search ran out of budget.
    #[error("period search for {witness} mod {modulus} exhausted after {limit} steps")]
    PeriodSearchExhausted {
        witness: BigUint,
        modulus: BigUint,
        limit: u64,
    },

    /// The phase register kept measuring 0, which carries no information.
    #[error("phase register measured 0 for {0} consecutive samples")]
    ExhaustedZeroSamples(u32),
}

/// A phase-estimation backend.
///
/// One call returns one sampled phase numerator j in [0, 2^m), an estimate
/// of k/r · 2^m for some integer k and the witness's multiplicative order r.
/// The precision m is chosen by the caller. Callers must tolerate j = 0
/// (re-sample) and noisy outcomes (combine several samples).
pub trait PhaseOracle {
    fn estimate_phase(
        &self,
        witness: &BigUint,
        modulus: &BigUint,
        precision_bits: u64,
    ) -> Result<BigUint, OracleError>;
}

/// Classical stand-in for the quantum phase-estimation engine.
///
/// Finds the true order r of the witness by brute-force period search, then
/// returns the value an ideal phase-estimation measurement concentrates on:
/// round(k · 2^m / r) for k drawn uniformly from [0, r). The k = 0 draw
/// yields j = 0, exercising the caller's re-sampling path exactly like a
/// real register would.
pub struct SimulatedPhaseOracle {
    rng: Mutex<StdRng>,
    max_period: u64,
}

impl SimulatedPhaseOracle {
    /// Backend with an entropy-seeded random source.
    pub fn new(max_period: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
            max_period,
        }
    }

    /// Backend with a deterministic random source.
    pub fn with_seed(max_period: u64, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            max_period,
        }
    }
}

impl PhaseOracle for SimulatedPhaseOracle {
    fn estimate_phase(
        &self,
        witness: &BigUint,
        modulus: &BigUint,
        precision_bits: u64,
    ) -> Result<BigUint, OracleError> {
        let r = arith::multiplicative_order(witness, modulus, self.max_period).ok_or_else(
            || OracleError::PeriodSearchExhausted {
                witness: witness.clone(),
                modulus: modulus.clone(),
                limit: self.max_period,
            },
        )?;

        let k = self
            .rng
            .lock()
            .expect("phase oracle rng lock poisoned")
            .gen_range(0..r);

        // j = round(k * 2^m / r)
        let scaled = BigUint::from(k) << precision_bits;
        Ok((scaled + BigUint::from(r / 2)) / BigUint::from(r))
    }
}
