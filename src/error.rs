//! Error types and the `Outcome` wrapper for network-backed operations.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Auth(String),

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<serde_wasm_bindgen::Error> for Error {
    fn from(e: serde_wasm_bindgen::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<JsValue> for Error {
    fn from(e: JsValue) -> Self {
        Error::Network(e.as_string().unwrap_or_else(|| format!("{:?}", e)))
    }
}

/// Result of an operation that may fall back to locally produced data.
///
/// `Degraded` carries the substitute value so callers can still render it,
/// while knowing it did not come from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Live(T),
    Degraded(T),
    Failed(Error),
}

impl<T> Outcome<T> {
    /// Live on success, `fallback()` as Degraded on failure.
    pub fn or_degraded(result: Result<T>, fallback: impl FnOnce() -> T) -> Self {
        match result {
            Ok(v) => Outcome::Live(v),
            Err(e) => {
                tracing::warn!("falling back to local data: {}", e);
                Outcome::Degraded(fallback())
            }
        }
    }

    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(v) => Outcome::Live(v),
            Err(e) => Outcome::Failed(e),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Live(v) | Outcome::Degraded(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Outcome::Live(v) | Outcome::Degraded(v) => Some(v),
            Outcome::Failed(_) => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Live(v) => Outcome::Live(f(v)),
            Outcome::Degraded(v) => Outcome::Degraded(f(v)),
            Outcome::Failed(e) => Outcome::Failed(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_degraded_uses_fallback_on_error() {
        let out: Outcome<Vec<u32>> = Outcome::or_degraded(Err(Error::Network("down".into())), || vec![1, 2]);
        assert_eq!(out, Outcome::Degraded(vec![1, 2]));
        assert!(out.is_degraded());
    }

    #[test]
    fn failed_has_no_value() {
        let out: Outcome<u32> = Outcome::from_result(Err(Error::NotAuthenticated));
        assert_eq!(out.value(), None);
        assert_eq!(Outcome::Live(3).map(|v| v * 2).into_value(), Some(6));
    }
}
