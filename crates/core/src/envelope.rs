//! The uniform response envelope every verb returns (spec §6):
//! `{ok: true, data}` or `{ok: false, error: {code, message, details?}}`.

use serde::{Deserialize, Serialize};

use crate::error::LatticeError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&LatticeError> for ErrorBody {
    fn from(err: &LatticeError) -> Self {
        ErrorBody {
            code: err.code.as_str().to_string(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

/// Not `#[derive(Serialize)]`: spec §6 wants `ok` rendered as a JSON
/// boolean, which tagged-enum serialization can't express directly.
/// Use `to_json` to render.
#[derive(Debug, Clone)]
pub enum Envelope<T> {
    Ok { data: T },
    Err { error: ErrorBody },
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Envelope::Ok { data }
    }

    pub fn err(error: &LatticeError) -> Self {
        Envelope::Err {
            error: error.into(),
        }
    }

    pub fn from_result(result: Result<T, LatticeError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(&err),
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Renders the envelope exactly in the `{ok: bool, ...}` shape spec
    /// §6 specifies — `#[serde(tag = "ok")]` alone would serialize the
    /// tag as a string, so this hand-renders the boolean field.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Envelope::Ok { data } => serde_json::json!({
                "ok": true,
                "data": data,
            }),
            Envelope::Err { error } => serde_json::json!({
                "ok": false,
                "error": error,
            }),
        }
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
