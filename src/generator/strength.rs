//! Strength Module
//!
//! Entropy-based strength classification.

use serde::{Deserialize, Serialize};

// == Strength ==
/// Strength bucket derived from `length * log2(pool_size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Strength {
    Weak,
    Medium,
    Strong,
}

impl Strength {
    /// Classifies a secret of `length` characters drawn from `pool_size` symbols.
    ///
    /// Below 40 bits is weak, below 60 bits is medium, anything else strong.
    pub fn classify(length: usize, pool_size: usize) -> Self {
        let bits = entropy_bits(length, pool_size);
        if bits < 40.0 {
            Strength::Weak
        } else if bits < 60.0 {
            Strength::Medium
        } else {
            Strength::Strong
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strength::Weak => "Weak",
            Strength::Medium => "Medium",
            Strength::Strong => "Strong",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entropy in bits; zero for an empty pool.
pub fn entropy_bits(length: usize, pool_size: usize) -> f64 {
    if pool_size == 0 {
        return 0.0;
    }
    length as f64 * (pool_size as f64).log2()
}
