//! Boundary errors for the keyword radar
//!
//! Scanning and grouping are total functions and never fail. These errors
//! only arise where data crosses into the crate: settings, JS values and
//! serialized results.

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RadarError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<RadarError> for JsValue {
    fn from(err: RadarError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            RadarError::InvalidConfig("expected bool".into()).to_string(),
            "Invalid config: expected bool"
        );
        assert_eq!(
            RadarError::InvalidInput("keywords".into()).to_string(),
            "Invalid input: keywords"
        );
        assert_eq!(
            RadarError::Serialization("cycle".into()).to_string(),
            "Serialization error: cycle"
        );
    }
}
