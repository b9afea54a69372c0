use thiserror::Error;

/// Convenient result alias for the Azure pricing library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when the retail prices API answers with a non-success status.
    #[error("retail prices API returned status {status}: {body}")]
    Api { status: u16, body: String },

    /// Raised when a continuation link returned by the API is not a valid URL.
    #[error("invalid continuation link {link}: {message}")]
    InvalidContinuationLink { link: String, message: String },

    /// Raised when a price type string does not name a supported price type.
    #[error("unsupported price type: {value} (expected Consumption, Reservation or DevTestConsumption)")]
    UnsupportedPriceType { value: String },

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
