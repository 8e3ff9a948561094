//! Error types for measurement construction and parsing.

use thiserror::Error;

/// Errors produced by [`FileSize`](super::FileSize) and
/// [`Speed`](super::Speed) constructors and parsers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeasureError {
    /// Numeric construction rejected (negative or non-finite input).
    #[error("invalid measurement value: {reason}")]
    Validation {
        /// Why the value was rejected.
        reason: String,
    },

    /// Text input did not match the `"<number> <UNIT>"` grammar.
    #[error("unrecognized measurement format: '{input}'")]
    Format {
        /// The offending input text.
        input: String,
    },
}

impl MeasureError {
    /// Creates a `Validation` error for a negative input value.
    pub(crate) fn negative(what: &str, value: f64) -> Self {
        Self::Validation {
            reason: format!("{what} must not be negative, got {value}"),
        }
    }

    /// Creates a `Validation` error for a NaN/infinite input value.
    pub(crate) fn not_finite(what: &str) -> Self {
        Self::Validation {
            reason: format!("{what} must be a finite number"),
        }
    }

    /// Creates a `Format` error for unparseable text.
    pub(crate) fn format(input: &str) -> Self {
        Self::Format {
            input: input.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_message_names_field_and_value() {
        let err = MeasureError::negative("file size", -3.0);
        let msg = err.to_string();
        assert!(msg.contains("file size"));
        assert!(msg.contains("-3"));
    }

    #[test]
    fn test_format_message_includes_input() {
        let err = MeasureError::format("ten bytes");
        assert!(err.to_string().contains("'ten bytes'"));
    }
}
