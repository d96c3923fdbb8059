//! Generator Module
//!
//! Builds character pools from option flags, draws random secrets from them
//! with a cryptographically secure source, and classifies their strength.

mod engine;
mod options;
mod strength;


pub use engine::{generate, validate, GeneratedSecret, GenerationError};
pub use options::CharsetOptions;
pub use strength::{entropy_bits, Strength};

// == Public Constants ==
/// Shortest secret that may be requested
pub const MIN_LENGTH: i64 = 4;

/// Longest secret that may be requested
pub const MAX_LENGTH: i64 = 64;

/// Uppercase ASCII letters
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Lowercase ASCII letters
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Decimal digits
pub const NUMBERS: &str = "0123456789";

/// Fixed symbol set
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
