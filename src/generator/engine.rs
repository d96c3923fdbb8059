//! Generation Engine
//!
//! Validation, unbiased random sampling from the pool, and latency capture.

use std::time::Instant;

use rand::{rngs::OsRng, Rng};
use thiserror::Error;

use super::{CharsetOptions, Strength, MAX_LENGTH, MIN_LENGTH};

// == Generation Error ==
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("Length must be an integer between 4 and 64, got {0}")]
    InvalidLength(i64),

    #[error("At least one character type must be selected")]
    EmptyOptions,

    #[error("Character pool is empty")]
    InvalidOptions,
}

// == Generated Secret ==
/// Output of a single draw, before persistence.
#[derive(Debug, Clone)]
pub struct GeneratedSecret {
    pub value: String,
    pub length: usize,
    pub options: CharsetOptions,
    pub pool_size: usize,
    pub strength: Strength,
    /// Wall-clock time spent drawing, in milliseconds
    pub generation_time_ms: f64,
}

// == Validate ==
/// Checks the requested length and that at least one flag is set.
pub fn validate(length: i64, options: &CharsetOptions) -> Result<(), GenerationError> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
        return Err(GenerationError::InvalidLength(length));
    }
    if !options.any() {
        return Err(GenerationError::EmptyOptions);
    }
    Ok(())
}

// == Generate ==
/// Draws `length` characters uniformly from the pool selected by `options`.
///
/// Indices come from `OsRng` through `gen_range`, which rejects out-of-zone
/// samples, so every pool position is equally likely regardless of pool size.
pub fn generate(
    length: usize,
    options: &CharsetOptions,
) -> Result<GeneratedSecret, GenerationError> {
    let pool = options.pool();
    if pool.is_empty() {
        return Err(GenerationError::InvalidOptions);
    }

    let mut rng = OsRng;
    let started = Instant::now();
    let value: String = (0..length)
        .map(|_| pool[rng.gen_range(0..pool.len())])
        .collect();
    let generation_time_ms = started.elapsed().as_secs_f64() * 1000.0;

    Ok(GeneratedSecret {
        value,
        length,
        options: *options,
        pool_size: pool.len(),
        strength: Strength::classify(length, pool.len()),
        generation_time_ms,
    })
}
