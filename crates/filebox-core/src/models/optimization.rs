//! Wire types for the image optimization provider.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

/// Job state reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationStatus {
    Ok,
    Processing,
    Error,
    Other(String),
}

impl OptimizationStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "ok" => OptimizationStatus::Ok,
            "processing" => OptimizationStatus::Processing,
            "error" => OptimizationStatus::Error,
            other => OptimizationStatus::Other(other.to_string()),
        }
    }
}

/// Body returned by both the submit and the result endpoints.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptimizationResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub result: Vec<OptimizedResult>,
    #[serde(default)]
    pub process_id: Option<String>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl OptimizationResponse {
    pub fn status(&self) -> OptimizationStatus {
        OptimizationStatus::parse(&self.status)
    }

    pub fn into_first_result(self) -> Option<OptimizedResult> {
        self.result.into_iter().next()
    }
}

/// One optimized file as described by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct OptimizedResult {
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub original_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub optimized_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub saved_bytes: Option<u64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub saved_percent: Option<f64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub success: bool,
}

impl OptimizedResult {
    /// Download URL when the provider reports success.
    pub fn success_url(&self) -> Option<&str> {
        if self.success {
            self.url.as_deref().filter(|u| !u.is_empty())
        } else {
            None
        }
    }
}

/// Caller-supplied provider options, forwarded as multipart fields.
///
/// Only the keys in [`crate::validation::KNOWN_OPTION_KEYS`] are type-checked; any
/// other key is passed through to the provider unchecked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct OptimizeOptions(pub BTreeMap<String, Value>);

impl OptimizeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options rendered as form values. Booleans become `1`/`0`, nulls are dropped.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .filter_map(|(key, value)| {
                let rendered = match value {
                    Value::Null => return None,
                    Value::Bool(true) => "1".to_string(),
                    Value::Bool(false) => "0".to_string(),
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    other => other.to_string(),
                };
                Some((key.clone(), rendered))
            })
            .collect()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<OptimizedResult>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<OptimizedResult>>::deserialize(deserializer)?.unwrap_or_default())
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => matches!(s.as_str(), "1" | "true"),
        _ => false,
    })
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.filter(|v| *v >= 0.0).map(|v| v as u64))
}
