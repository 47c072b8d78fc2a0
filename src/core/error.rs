//! Error kinds produced while resolving prices and aligning histories.

use thiserror::Error;

/// Failures of the conversion and comparison views.
///
/// None of these are fatal; they are surfaced to the user as a message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QuoteError {
    /// A price was non-numeric, or zero where a non-zero divisor is required.
    #[error("Invalid price: '{0}'")]
    InvalidPrice(String),

    /// A conversion amount that is negative or not a finite number.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// Inverting a fiat-denominated price of zero.
    #[error("Cannot invert a zero price")]
    DivisionByZero,

    /// Fiat to fiat, or a pair with an identifier found in neither list.
    #[error("Conversion from {from} to {to} is not supported")]
    UnsupportedPair { from: String, to: String },

    /// A remote source failed to answer.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl From<anyhow::Error> for QuoteError {
    fn from(err: anyhow::Error) -> Self {
        QuoteError::UpstreamUnavailable(err.to_string())
    }
}
