//! Errors raised while loading layout data.
//!
//! Layout, physics and interaction operations never fail; they clamp or skip
//! invalid input instead. Only deserialising documents can produce an [`Error`].

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid layout document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config value for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
