//! Configuration error types with error codes and helpful messages.
//!
//! # Error Codes
//!
//! Each error variant has a unique code (C001-C003) for documentation lookup:
//!
//! - C001: `InvalidMetricWeights` (Metric weights negative or summing to zero)
//! - C002: `InvalidThreshold` (Quality threshold not finite or negative)
//! - C003: `InvalidMaxSolutions` (Solution cap below 1)
//!
//! Configuration errors are reported to the caller at construction time and
//! are never silently clamped.

/// Custom error type for invalid search configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid metric weights: density={density_weight}, intersection={intersection_weight}")]
    InvalidMetricWeights { density_weight: f64, intersection_weight: f64 },

    #[error("invalid quality threshold: {value}")]
    InvalidThreshold { value: f64 },

    #[error("invalid solution cap: {value}")]
    InvalidMaxSolutions { value: usize },
}

impl ConfigError {
    /// Returns the error code for this error variant
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::InvalidMetricWeights { .. } => "C001",
            ConfigError::InvalidThreshold { .. } => "C002",
            ConfigError::InvalidMaxSolutions { .. } => "C003",
        }
    }

    /// Returns a helpful suggestion for this error
    #[must_use]
    pub fn help(&self) -> Option<&'static str> {
        match self {
            ConfigError::InvalidMetricWeights { .. } => Some(
                "Weights must be non-negative and sum to a positive value (e.g., --density-weight 100 --intersection-weight 100)",
            ),
            ConfigError::InvalidThreshold { .. } => {
                Some("The quality threshold must be a finite, non-negative number (e.g., 4.4)")
            }
            ConfigError::InvalidMaxSolutions { .. } => {
                Some("Request at least one solution (e.g., --max-solutions 1)")
            }
        }
    }

    /// Formats the error with code and help text
    #[must_use]
    pub fn display_detailed(&self) -> String {
        format_error_with_code_and_help(&self.to_string(), self.code(), self.help())
    }
}

/// Helper function to format error messages with code and optional help text
pub(crate) fn format_error_with_code_and_help(
    base_msg: &str,
    code: &str,
    help: Option<&str>,
) -> String {
    if let Some(help_text) = help {
        format!("{base_msg} ({code})\n{help_text}")
    } else {
        format!("{base_msg} ({code})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_are_unique() {
        let mut codes = std::collections::HashSet::new();

        let errors = [
            ConfigError::InvalidMetricWeights { density_weight: -1.0, intersection_weight: 0.0 },
            ConfigError::InvalidThreshold { value: f64::NAN },
            ConfigError::InvalidMaxSolutions { value: 0 },
        ];

        for err in &errors {
            let code = err.code();
            assert!(code.starts_with("C0"), "Error code '{}' should start with 'C0'", code);
            assert!(codes.insert(code), "Duplicate error code found: {}", code);
        }
    }

    #[test]
    fn test_display_detailed_includes_code_and_help() {
        let err = ConfigError::InvalidMaxSolutions { value: 0 };
        let detailed = err.display_detailed();

        assert!(detailed.contains("C003"));
        assert!(detailed.contains(err.help().unwrap()));
        assert!(detailed.contains(&err.to_string()));
    }

    #[test]
    fn test_all_errors_have_help() {
        let errors = [
            ConfigError::InvalidMetricWeights { density_weight: 0.0, intersection_weight: 0.0 },
            ConfigError::InvalidThreshold { value: -1.0 },
            ConfigError::InvalidMaxSolutions { value: 0 },
        ];

        for err in &errors {
            assert!(err.help().is_some(), "{err:?} should have help text");
        }
    }

    #[test]
    fn test_error_messages_include_offending_values() {
        let err = ConfigError::InvalidThreshold { value: -4.4 };
        assert!(err.to_string().contains("-4.4"));

        let err = ConfigError::InvalidMaxSolutions { value: 0 };
        assert!(err.to_string().contains('0'));
    }
}
