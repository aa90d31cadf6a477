use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Errors surfaced while talking to the graph data source. Both
/// variants carry a human-readable message that reaches the user
/// verbatim, next to a manual retry affordance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The source answered with a non-success code.
    #[error("{0}")]
    Upstream(String),
    /// The response body could not be understood.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Discriminated `{code, data, error}` wrapper around every data source
/// response. Code 0 means success and `data` is present; anything else
/// is a failure described by `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct Envelope<T> {
    pub code: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            data: Some(data),
            error: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            code: 1,
            data: None,
            error: Some(message.into()),
        }
    }

    /// Unwrap the envelope according to its code.
    pub fn into_result(self) -> Result<T, FetchError> {
        if self.code != 0 {
            let message = self
                .error
                .unwrap_or_else(|| "request failed".to_string());
            return Err(FetchError::Upstream(message));
        }
        self.data
            .ok_or_else(|| FetchError::Malformed("success response without data".to_string()))
    }
}

/// Decode a raw response body into its payload, honoring the envelope
/// discriminant.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T, FetchError> {
    let envelope: Envelope<T> =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    envelope.into_result()
}
