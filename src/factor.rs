//! The outer witness-retry loop: pick a witness, estimate its order, derive
//! a factor.
//!
//! Each attempt is independent: sample a uniformly from [2, N−2], take the
//! gcd shortcut if a already shares a factor with N, otherwise estimate the
//! multiplicative order r of a. An even r gives x = a^(r/2) mod N, and
//! gcd(x − 1, N) is a nontrivial factor unless the witness was unlucky
//! (a^(r/2) ≡ ±1 mod N). Odd orders and trivial gcds are discarded
//! silently and a fresh witness is drawn; with at least two distinct odd
//! prime factors in N, each witness succeeds with probability ≥ 1/2, so the
//! loop terminates quickly in expectation while carrying no deterministic
//! bound.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::arith;
use crate::oracle::PhaseOracle;
use crate::order;
use crate::{FactorConfig, FactorError};

/// Miller-Rabin rounds for the prime-modulus precondition screen.
const PRIMALITY_ROUNDS: u32 = 20;

/// A completed factoring run.
#[derive(Debug, Clone)]
pub struct FactorOutcome {
    /// The modulus that was factored.
    pub n: BigUint,
    /// A nontrivial divisor of n.
    pub factor: BigUint,
    /// n / factor.
    pub cofactor: BigUint,
    /// The witness that produced the factor; None for the even shortcut.
    pub witness: Option<BigUint>,
    /// The estimated order behind the factor; None when the witness itself
    /// already shared a factor with n.
    pub order: Option<BigUint>,
    /// Witness attempts spent by the loop that found the factor.
    pub attempts: u64,
    /// Wall-clock time.
    pub duration: Duration,
}

/// Find a nontrivial factor of `n`.
///
/// Preconditions: n must be at least 2, not a prime power, and not prime.
/// An even n yields the factor 2 immediately without consulting the oracle.
/// With `max_attempts` unset the loop runs until a factor is found.
pub fn find_factor<O: PhaseOracle + ?Sized>(
    n: &BigUint,
    oracle: &O,
    config: &FactorConfig,
    rng: &mut impl Rng,
) -> Result<FactorOutcome, FactorError> {
    let start = Instant::now();
    if let Some(outcome) = screen_modulus(n, rng, start)? {
        return Ok(outcome);
    }
    match witness_loop(n, oracle, config, rng, None, start)? {
        Some(outcome) => Ok(outcome),
        None => Err(FactorError::NoFactorFound(
            config.max_attempts.unwrap_or(0),
        )),
    }
}

/// Race several independent witness loops and take the first factor.
///
/// Witness attempts are statistically independent, so speculating on
/// several at once only shortens the expected wall-clock time. The first
/// worker to find a factor raises the stop flag; the others observe it
/// between attempts and stand down. Each worker gets its own `StdRng`
/// seeded from the caller's generator.
pub fn find_factor_racing<O: PhaseOracle + Sync>(
    n: &BigUint,
    oracle: &O,
    config: &FactorConfig,
    workers: usize,
    rng: &mut impl Rng,
) -> Result<FactorOutcome, FactorError> {
    let start = Instant::now();
    if let Some(outcome) = screen_modulus(n, rng, start)? {
        return Ok(outcome);
    }

    let workers = workers.max(1);
    let seeds: Vec<u64> = (0..workers).map(|_| rng.gen()).collect();
    let found = AtomicBool::new(false);
    let slot: Mutex<Option<Result<FactorOutcome, FactorError>>> = Mutex::new(None);

    std::thread::scope(|s| {
        for seed in seeds {
            let found = &found;
            let slot = &slot;
            s.spawn(move || {
                let mut worker_rng = StdRng::seed_from_u64(seed);
                let result = witness_loop(n, oracle, config, &mut worker_rng, Some(found), start);
                match result {
                    Ok(Some(outcome)) => {
                        found.store(true, Ordering::Relaxed);
                        let mut guard = slot.lock().unwrap();
                        if guard.is_none() {
                            *guard = Some(Ok(outcome));
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        found.store(true, Ordering::Relaxed);
                        let mut guard = slot.lock().unwrap();
                        if guard.is_none() {
                            *guard = Some(Err(e));
                        }
                    }
                }
            });
        }
    });

    match slot.into_inner().expect("result slot poisoned") {
        Some(result) => result,
        None => Err(FactorError::NoFactorFound(
            config.max_attempts.unwrap_or(0) * workers as u64,
        )),
    }
}

/// Precondition screen shared by both entry points. Returns the immediate
/// outcome for an even modulus, an error for an out-of-range, prime-power,
/// or prime modulus, and None when the witness loop should run.
fn screen_modulus(
    n: &BigUint,
    rng: &mut impl Rng,
    start: Instant,
) -> Result<Option<FactorOutcome>, FactorError> {
    let two = BigUint::from(2u32);
    if *n < two {
        return Err(FactorError::InvalidModulus(n.clone()));
    }
    if n.is_even() {
        return Ok(Some(FactorOutcome {
            n: n.clone(),
            factor: two.clone(),
            cofactor: n / &two,
            witness: None,
            order: None,
            attempts: 0,
            duration: start.elapsed(),
        }));
    }
    if arith::is_perfect_power(n) {
        return Err(FactorError::PrimePower(n.clone()));
    }
    if arith::is_probably_prime(n, PRIMALITY_ROUNDS, rng) {
        return Err(FactorError::PrimeModulus(n.clone()));
    }
    Ok(None)
}

/// The witness-retry loop. Returns Ok(None) when the stop flag was raised
/// by another worker or the attempt budget ran out.
fn witness_loop<O: PhaseOracle + ?Sized>(
    n: &BigUint,
    oracle: &O,
    config: &FactorConfig,
    rng: &mut impl Rng,
    stop: Option<&AtomicBool>,
    start: Instant,
) -> Result<Option<FactorOutcome>, FactorError> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    let mut attempts: u64 = 0;

    loop {
        if let Some(flag) = stop {
            if flag.load(Ordering::Relaxed) {
                return Ok(None);
            }
        }
        if let Some(max) = config.max_attempts {
            if attempts >= max {
                return Ok(None);
            }
        }
        attempts += 1;

        let a = arith::random_in_witness_range(n, rng);
        log::debug!("attempt {attempts}: witness a = {a}");

        let d = arith::gcd(&a, n);
        if d >= two {
            log::info!("witness {a} already shares the factor {d} with {n}");
            return Ok(Some(FactorOutcome {
                n: n.clone(),
                factor: d.clone(),
                cofactor: n / &d,
                witness: Some(a),
                order: None,
                attempts,
                duration: start.elapsed(),
            }));
        }

        let r = order::estimate_order(oracle, &a, n, config.phase_samples)?;
        log::debug!("estimated order of {a} mod {n}: {r}");

        if r.is_odd() {
            log::debug!("order {r} is odd, discarding witness {a}");
            continue;
        }

        let half = &r >> 1;
        let x = a.modpow(&half, n);
        if x <= one {
            // a^(r/2) ≡ 1 leaves nothing to take a gcd with
            log::debug!("witness {a} gave a^(r/2) ≡ 1, discarding");
            continue;
        }
        let d = arith::gcd(&(&x - &one), n);
        if d > one && d < *n {
            log::info!("witness {a} with order {r} yields factor {d}");
            return Ok(Some(FactorOutcome {
                n: n.clone(),
                factor: d.clone(),
                cofactor: n / &d,
                witness: Some(a),
                order: Some(r),
                attempts,
                duration: start.elapsed(),
            }));
        }
        log::debug!("witness {a} gave trivial divisor {d}, retrying");
    }
}
