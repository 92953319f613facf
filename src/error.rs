//! Errors raised while turning raw record fields into ledger entries.

use thiserror::Error;

/// Failure to interpret a field of a take-off record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A scheduled or actual time that is not a valid `H:MM` wall-clock time.
    #[error("invalid time of day `{value}`")]
    InvalidTime { value: String },

    /// A record without a flight code cannot be filed in a ledger.
    #[error("flight code must not be empty")]
    EmptyFlightCode,
}
