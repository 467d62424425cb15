//! Record extraction from JSONL mortality messages into the validated `MortalityRecord`

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// One validated mortality observation, ready for aggregation
#[derive(Debug, Clone, PartialEq)]
pub struct MortalityRecord {
    pub region: String,
    pub status: String,
    pub sex: String,
    pub cause: String,
    pub rate: f64,
    pub se: f64,
    pub timestamp: String,
    pub author: String,
    pub message: Option<String>,
    pub keyword_mentioned: Option<String>,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
}

/// Loose wire shape: every field optional, numbers accepted as JSON numbers or strings
#[derive(Debug, Deserialize)]
struct RawMessage {
    region: Option<String>,
    status: Option<String>,
    sex: Option<String>,
    cause: Option<String>,
    rate: Option<Value>,
    se: Option<Value>,
    timestamp: Option<String>,
    author: Option<String>,
    message: Option<String>,
    keyword_mentioned: Option<String>,
}

impl MortalityRecord {
    /// Parse and validate a single JSONL line
    pub fn from_jsonl(line: &str) -> Result<Self, ExtractError> {
        let raw: RawMessage = serde_json::from_str(line)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawMessage) -> Result<Self, ExtractError> {
        Ok(Self {
            region: raw.region.ok_or(ExtractError::MissingField("region"))?,
            status: raw.status.unwrap_or_default(),
            sex: raw.sex.ok_or(ExtractError::MissingField("sex"))?,
            cause: raw.cause.ok_or(ExtractError::MissingField("cause"))?,
            rate: coerce_f64("rate", raw.rate)?,
            se: coerce_f64("se", raw.se)?,
            timestamp: raw.timestamp.ok_or(ExtractError::MissingField("timestamp"))?,
            author: raw.author.ok_or(ExtractError::MissingField("author"))?,
            message: raw.message,
            keyword_mentioned: raw.keyword_mentioned,
        })
    }

    /// De-duplication identity. Not guaranteed unique by producers that emit
    /// minute-granularity timestamps.
    pub fn identity(&self) -> String {
        format!("{}_{}", self.author, self.timestamp)
    }
}

fn coerce_f64(field: &'static str, value: Option<Value>) -> Result<f64, ExtractError> {
    let value = value.ok_or(ExtractError::MissingField(field))?;
    let parsed = match &value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(ExtractError::NotNumeric {
            field,
            value: value.to_string(),
        }),
    }
}
