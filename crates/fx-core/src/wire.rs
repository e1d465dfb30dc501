use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::error::Category;
use thiserror::Error;

use crate::{RawAssignments, Timestamp};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("assignments payload is empty")]
    Empty,
    #[error("assignments payload is not valid JSON: {0}")]
    Syntax(#[source] serde_json::Error),
    #[error("assignments payload has an unexpected shape: {0}")]
    Shape(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => DecodeError::Shape(err),
            _ => DecodeError::Syntax(err),
        }
    }
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    variations: BTreeMap<String, Option<String>>,
    #[serde(default)]
    ttl: i64,
    #[serde(default, rename = "fetchedAt")]
    fetched_at: Option<Timestamp>,
}

/// Decode an assignments response body.
///
/// Server responses carry no fetch time, so `fetched_at` stamps the record.
/// A body that already has `fetchedAt` (an exported snapshot) keeps its own.
pub fn decode_payload(body: &str, fetched_at: Timestamp) -> Result<RawAssignments, DecodeError> {
    if body.trim().is_empty() {
        return Err(DecodeError::Empty);
    }
    let payload: Payload = serde_json::from_str(body)?;
    Ok(RawAssignments::new(
        payload.variations,
        payload.ttl,
        payload.fetched_at.unwrap_or(fetched_at),
    ))
}

pub fn encode_record(record: &RawAssignments) -> serde_json::Result<String> {
    serde_json::to_string_pretty(record)
}
