use serde::{Deserialize, Serialize};

use crate::error::{RequestError, Result};

/// Request payload exactly as it arrives on the channel
///
/// Every field is optional here so that a payload with a missing field
/// still decodes and can be rejected by validation rather than by the
/// JSON decoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RawRequest {
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl RawRequest {
    /// Decode a channel payload
    ///
    /// Only a JSON object is a request; arrays and scalars are decode
    /// errors even when their elements line up with the fields.
    pub fn decode(payload: &str) -> Result<Self> {
        let fields: serde_json::Map<String, serde_json::Value> = serde_json::from_str(payload)?;
        Ok(serde_json::from_value(serde_json::Value::Object(fields))?)
    }

    /// Validate into a request the pipeline can work on
    pub fn validate(self) -> Result<GenerationRequest> {
        let request_id = require("request_id", self.request_id)?;
        let user_id = require("user_id", self.user_id)?;
        let prompt = require("prompt", self.prompt)?;

        Ok(GenerationRequest {
            request_id,
            user_id,
            prompt,
        })
    }
}

fn require(field: &'static str, value: Option<String>) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or(RequestError::MissingField(field))
}

/// A validated unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Caller-supplied correlation id, also part of the storage key
    pub request_id: String,
    /// Requesting principal, used to namespace storage
    pub user_id: String,
    /// Free-text synthesis instruction
    pub prompt: String,
}

impl GenerationRequest {
    /// Storage key for this request's artifact
    pub fn storage_key(&self) -> String {
        storage_key(&self.user_id, &self.request_id)
    }
}

/// Derive the object key for a generated artifact
///
/// Downstream consumers parse this layout; it must not change.
pub fn storage_key(user_id: &str, request_id: &str) -> String {
    format!("generated/{user_id}/{request_id}.png")
}
