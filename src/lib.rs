//! # shor-classical: the classical driver of Shor's factoring algorithm
//!
//! Everything around the quantum step: given an odd composite N that is not
//! a prime power, find a nontrivial factor by order finding.
//!
//! ## Pipeline
//!
//! 1. **Witness selection**: draw a uniformly from [2, N−2]; if
//!    gcd(a, N) ≥ 2 the witness already carries a factor and no order
//!    estimation is needed.
//! 2. **Phase estimation**: an external oracle (the [`oracle::PhaseOracle`]
//!    trait) measures j ≈ k/r · 2^m for the modular-multiplication-by-a
//!    operator, where r is the unknown multiplicative order of a.
//! 3. **Continued-fraction extraction**: the convergents of j / 2^m recover
//!    r (or a divisor of it) as a denominator below N.
//! 4. **lcm refinement**: several independent samples are combined by least
//!    common multiple, since each sample can miss prime-power factors of r.
//! 5. **Factor extraction**: an even order r gives x = a^(r/2) mod N, and
//!    gcd(x − 1, N) splits N unless a^(r/2) ≡ ±1; unlucky witnesses are
//!    discarded and the loop retries.
//!
//! The quantum engine itself stays behind the oracle trait; the crate ships
//! [`oracle::SimulatedPhaseOracle`], a classical stand-in sampling from the
//! ideal measurement distribution, so the whole protocol runs end to end.

pub mod arith;
pub mod cf;
pub mod factor;
pub mod oracle;
pub mod order;

pub use factor::{find_factor, find_factor_racing, FactorOutcome};
pub use oracle::{OracleError, PhaseOracle, SimulatedPhaseOracle, DEFAULT_MAX_PERIOD};
pub use order::{estimate_order, precision_bits};

use num_bigint::BigUint;

/// Default number of independent phase samples combined per order estimate.
/// An empirical choice: the chance that every sample misses the same
/// prime-power factor of the order shrinks geometrically with the count.
pub const DEFAULT_PHASE_SAMPLES: u32 = 4;

/// Configuration for the factoring driver.
#[derive(Debug, Clone)]
pub struct FactorConfig {
    /// Independent phase samples combined by lcm per order estimate.
    pub phase_samples: u32,
    /// Bound on witness attempts before giving up; None runs the loop until
    /// a factor is found.
    pub max_attempts: Option<u64>,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            phase_samples: DEFAULT_PHASE_SAMPLES,
            max_attempts: None,
        }
    }
}

/// Errors surfaced by the factoring driver.
#[derive(Debug, thiserror::Error)]
pub enum FactorError {
    #[error("modulus must be at least 2, got {0}")]
    InvalidModulus(BigUint),

    #[error("{0} is a prime power; order finding needs two distinct prime factors")]
    PrimePower(BigUint),

    #[error("{0} is probably prime and has no nontrivial factor")]
    PrimeModulus(BigUint),

    #[error("no factor found after {0} witness attempts")]
    NoFactorFound(u64),

    #[error("phase estimation failed: {0}")]
    Oracle(#[from] oracle::OracleError),
}
