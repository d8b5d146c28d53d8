//! shor-classical CLI: factor a composite with the classical Shor driver.
//!
//! Usage:
//!   shor-classical [N] [options]
//!
//! Options:
//!   --samples=<K>        Phase samples combined per order estimate (default: 4)
//!   --max-attempts=<K>   Bound on witness attempts (default: unbounded)
//!   --seed=<S>           Seed the witness RNG and the simulated oracle
//!   --workers=<W>        Race W witness loops concurrently (default: 1)
//!   --max-period=<P>     Period-search budget of the simulated oracle
//!   --json               Also print a machine-readable run summary
//!
//! N defaults to 143 when omitted. Diagnostics go to stderr with a non-zero
//! exit code when N cannot be parsed or violates a precondition.

use num_bigint::BigUint;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use shor_classical::{
    find_factor, find_factor_racing, FactorConfig, FactorOutcome, SimulatedPhaseOracle,
    DEFAULT_MAX_PERIOD, DEFAULT_PHASE_SAMPLES,
};

const DEFAULT_MODULUS: u64 = 143;

/// Machine-readable run summary for --json.
#[derive(Serialize)]
struct RunSummary {
    n: String,
    factor: String,
    cofactor: String,
    witness: Option<String>,
    order: Option<String>,
    attempts: u64,
    elapsed_secs: f64,
}

impl RunSummary {
    fn from_outcome(outcome: &FactorOutcome) -> Self {
        Self {
            n: outcome.n.to_string(),
            factor: outcome.factor.to_string(),
            cofactor: outcome.cofactor.to_string(),
            witness: outcome.witness.as_ref().map(|w| w.to_string()),
            order: outcome.order.as_ref().map(|r| r.to_string()),
            attempts: outcome.attempts,
            elapsed_secs: outcome.duration.as_secs_f64(),
        }
    }
}

fn main() {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();

    let n = match parse_modulus(&args) {
        Ok(n) => n,
        Err(msg) => {
            eprintln!("{msg}");
            std::process::exit(1);
        }
    };

    let samples = parse_u64_opt(&args, "--samples=").unwrap_or(DEFAULT_PHASE_SAMPLES as u64);
    let max_attempts = parse_u64_opt(&args, "--max-attempts=");
    let seed = parse_u64_opt(&args, "--seed=");
    let workers = parse_u64_opt(&args, "--workers=").unwrap_or(1) as usize;
    let max_period = parse_u64_opt(&args, "--max-period=").unwrap_or(DEFAULT_MAX_PERIOD);
    let json = args.iter().any(|a| a == "--json");

    let config = FactorConfig {
        phase_samples: samples as u32,
        max_attempts,
    };
    let oracle = match seed {
        Some(s) => SimulatedPhaseOracle::with_seed(max_period, s),
        None => SimulatedPhaseOracle::new(max_period),
    };
    let mut rng = match seed {
        // Distinct stream from the oracle's
        Some(s) => StdRng::seed_from_u64(s.wrapping_mul(7).wrapping_add(3)),
        None => StdRng::from_entropy(),
    };

    println!("Factoring {n}");
    let result = if workers > 1 {
        find_factor_racing(&n, &oracle, &config, workers, &mut rng)
    } else {
        find_factor(&n, &oracle, &config, &mut rng)
    };

    match result {
        Ok(outcome) => {
            println!("{} = {} x {}", outcome.n, outcome.factor, outcome.cofactor);
            if let (Some(witness), Some(order)) = (&outcome.witness, &outcome.order) {
                println!("witness {witness} had estimated order {order}");
            } else if let Some(witness) = &outcome.witness {
                println!("witness {witness} shared a factor outright");
            }
            println!(
                "{} witness attempts in {:?}",
                outcome.attempts, outcome.duration
            );
            if json {
                match serde_json::to_string_pretty(&RunSummary::from_outcome(&outcome)) {
                    Ok(summary) => println!("{summary}"),
                    Err(e) => eprintln!("Warning: could not serialize summary: {e}"),
                }
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

/// First non-option argument is the modulus; defaults to 143.
fn parse_modulus(args: &[String]) -> Result<BigUint, String> {
    match args.iter().find(|a| !a.starts_with("--")) {
        None => Ok(BigUint::from(DEFAULT_MODULUS)),
        Some(raw) => raw
            .parse::<BigUint>()
            .map_err(|e| format!("argument must be a positive integer, got '{raw}': {e}")),
    }
}

fn parse_u64_opt(args: &[String], key: &str) -> Option<u64> {
    args.iter()
        .find(|a| a.starts_with(key))
        .and_then(|a| a.strip_prefix(key)?.parse::<u64>().ok())
}
