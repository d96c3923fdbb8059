//! Request DTOs for the secret service API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;
use serde_json::Number;

use crate::generator::CharsetOptions;

/// Default secret length when the request omits it
pub const DEFAULT_LENGTH: i64 = 16;

/// Default and maximum history page sizes
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Request body for POST /api/generate
///
/// Every field is optional; [`GenerateRequest::resolve`] fills the gaps.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    /// Kept as a raw number so fractional lengths reach validation
    #[serde(default)]
    pub length: Option<Number>,
    #[serde(default)]
    pub uppercase: Option<bool>,
    #[serde(default)]
    pub lowercase: Option<bool>,
    #[serde(default)]
    pub numbers: Option<bool>,
    #[serde(default)]
    pub symbols: Option<bool>,
}

impl GenerateRequest {
    /// Resolves the requested length and options against the defaults.
    ///
    /// Returns an error message if the length is not an integer.
    pub fn resolve(&self) -> Result<(i64, CharsetOptions), String> {
        let length = match &self.length {
            None => DEFAULT_LENGTH,
            Some(n) => {
                integral(n).ok_or_else(|| format!("Length must be an integer, got {}", n))?
            }
        };

        let defaults = CharsetOptions::default();
        let options = CharsetOptions {
            uppercase: self.uppercase.unwrap_or(defaults.uppercase),
            lowercase: self.lowercase.unwrap_or(defaults.lowercase),
            numbers: self.numbers.unwrap_or(defaults.numbers),
            symbols: self.symbols.unwrap_or(defaults.symbols),
        };

        Ok((length, options))
    }
}

/// Whole-valued numbers such as `12` or `12.0`. Out-of-range values
/// saturate and are left for length validation to reject.
fn integral(n: &Number) -> Option<i64> {
    n.as_i64().or_else(|| {
        n.as_f64()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}

/// Query string for GET /api/history
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    #[serde(default = "default_page")]
    pub page: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_limit() -> usize {
    DEFAULT_PAGE_SIZE
}

impl HistoryQuery {
    /// Page clamped to at least 1 and limit to 1..=100.
    pub fn normalized(&self) -> (usize, usize) {
        (self.page.max(1), self.limit.clamp(1, MAX_PAGE_SIZE))
    }
}

/// Query string for GET /api/stats/distribution
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DistributionQuery {
    #[serde(default)]
    pub group: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_request_defaults() {
        let req: GenerateRequest = serde_json::from_str("{}").unwrap();
        let (length, options) = req.resolve().unwrap();

        assert_eq!(length, DEFAULT_LENGTH);
        assert_eq!(options, CharsetOptions::default());
    }

    #[test]
    fn test_generate_request_explicit() {
        let json = r#"{"length": 8, "uppercase": false, "lowercase": false, "numbers": true}"#;
        let req: GenerateRequest = serde_json::from_str(json).unwrap();
        let (length, options) = req.resolve().unwrap();

        assert_eq!(length, 8);
        assert!(options.numbers);
        assert!(!options.uppercase && !options.lowercase && !options.symbols);
    }

    #[test]
    fn test_generate_request_fractional_length() {
        let req: GenerateRequest = serde_json::from_str(r#"{"length": 12.5}"#).unwrap();
        assert!(req.resolve().is_err());
    }

    #[test]
    fn test_generate_request_whole_float_length() {
        let req: GenerateRequest = serde_json::from_str(r#"{"length": 12.0}"#).unwrap();
        assert_eq!(req.resolve().unwrap().0, 12);

        let huge: GenerateRequest = serde_json::from_str(r#"{"length": 1e300}"#).unwrap();
        assert_eq!(huge.resolve().unwrap().0, i64::MAX);
    }

    #[test]
    fn test_history_query_defaults() {
        let query: HistoryQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.normalized(), (1, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn test_history_query_clamps() {
        let query = HistoryQuery { page: 0, limit: 500 };
        assert_eq!(query.normalized(), (1, MAX_PAGE_SIZE));
    }
}
