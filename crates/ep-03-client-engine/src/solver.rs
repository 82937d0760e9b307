//! # Challenge Solver
//!
//! Cooperative proof-of-work search. Candidates are random 64-bit values
//! rendered as fixed-width hex; the search runs inside the caller's task
//! and pauses periodically so it never monopolizes a runtime worker.

use std::time::{Duration, Instant};

use shared_crypto::meets_difficulty;
use tracing::debug;

use crate::errors::ClientError;

/// How long the solver hashes before taking a pause.
const WORK_SLICE: Duration = Duration::from_millis(100);

/// Pause between work slices.
const SLICE_PAUSE: Duration = Duration::from_millis(20);

/// Candidates tried between clock reads.
const BATCH: u32 = 256;

/// Default overall solve budget in milliseconds.
pub const DEFAULT_SOLVE_BUDGET_MS: u64 = 50_000;

/// Search for a solution whose token digest meets `difficulty`.
///
/// Sleeps 20 ms after every ~100 ms of hashing. Gives up with
/// [`ClientError::SolveTimeout`] once `budget_ms` has elapsed.
pub async fn solve(
    token_bytes: &[u8],
    difficulty: u32,
    budget_ms: u64,
) -> Result<String, ClientError> {
    let started = Instant::now();
    let budget = Duration::from_millis(budget_ms);
    let mut slice_started = Instant::now();
    let mut attempts: u64 = 0;

    loop {
        for _ in 0..BATCH {
            let candidate = format!("{:016x}", rand::random::<u64>());
            attempts += 1;
            if meets_difficulty(token_bytes, &candidate, difficulty) {
                debug!(
                    difficulty,
                    attempts,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Challenge solved"
                );
                return Ok(candidate);
            }
        }

        if started.elapsed() >= budget {
            debug!(difficulty, attempts, budget_ms, "Challenge unsolved within budget");
            return Err(ClientError::SolveTimeout { budget_ms });
        }

        if slice_started.elapsed() >= WORK_SLICE {
            tokio::time::sleep(SLICE_PAUSE).await;
            slice_started = Instant::now();
        }
    }
}

/// Solve the challenge, then sleep out whatever remains of `delay_ms`.
///
/// The delay counts from token receipt, so a solve that outlasts the delay
/// adds no extra wait.
pub async fn solve_and_wait(
    token_bytes: &[u8],
    difficulty: u32,
    delay_ms: u64,
    budget_ms: u64,
) -> Result<String, ClientError> {
    let received = Instant::now();
    let solution = solve(token_bytes, difficulty, budget_ms).await?;

    let delay = Duration::from_millis(delay_ms);
    let elapsed = received.elapsed();
    if elapsed < delay {
        tokio::time::sleep(delay - elapsed).await;
    }

    Ok(solution)
}
