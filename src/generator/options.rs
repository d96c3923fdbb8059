//! Charset Options Module
//!
//! The four independent flags selecting which alphabets feed the pool.

use serde::{Deserialize, Serialize};

use super::{LOWERCASE, NUMBERS, SYMBOLS, UPPERCASE};

// == Charset Options ==
/// Selected character classes for a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharsetOptions {
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for CharsetOptions {
    fn default() -> Self {
        Self {
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: false,
        }
    }
}

impl CharsetOptions {
    /// Creates an option set with every flag cleared.
    pub fn none() -> Self {
        Self {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
        }
    }

    /// Returns true if at least one flag is set.
    pub fn any(&self) -> bool {
        self.uppercase || self.lowercase || self.numbers || self.symbols
    }

    // == Pool ==
    /// Concatenates the selected alphabets in fixed order:
    /// uppercase, lowercase, numbers, symbols.
    pub fn pool(&self) -> Vec<char> {
        let mut pool = String::new();
        if self.uppercase {
            pool.push_str(UPPERCASE);
        }
        if self.lowercase {
            pool.push_str(LOWERCASE);
        }
        if self.numbers {
            pool.push_str(NUMBERS);
        }
        if self.symbols {
            pool.push_str(SYMBOLS);
        }
        pool.chars().collect()
    }

    /// Returns the sum of the selected alphabet sizes.
    pub fn pool_size(&self) -> usize {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .iter()
        .filter(|(selected, _)| *selected)
        .map(|(_, alphabet)| alphabet.len())
        .sum()
    }
}
