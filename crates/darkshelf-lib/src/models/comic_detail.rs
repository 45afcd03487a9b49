//! Extraction of a [`CatalogEntry`] from the upstream comic detail document.
//!
//! Upstream is loosely typed: numbers sometimes arrive as strings and nested
//! paths may be missing entirely. Extraction never fails on a missing field,
//! it falls back to an empty string, zero or an empty list. Only an unparsable
//! document or a missing id rejects the payload.

use serde_json::Value;

use crate::{error::Error, models::CatalogEntry};

/// Parses one detail payload into a catalog entry.
pub fn parse_entry(payload: &[u8]) -> Result<CatalogEntry, Error> {
    let detail: Value = serde_json::from_slice(payload)?;

    let id = match detail.get("id") {
        None | Some(Value::Null) => return Err(Error::MissingId),
        Some(id) => strict_u64(id).ok_or(Error::InvalidId)?,
    };

    Ok(CatalogEntry {
        id,
        title: text(detail.get("title")),
        is_long: signed(detail.get("islong")),
        authors: tag_names(&detail, "authors"),
        categories: tag_names(&detail, "types"),
        status: tag_names(&detail, "status"),
        cover: text(detail.get("cover")),
        last_update_chapter_name: text(detail.pointer("/chapters/0/data/0/chapter_title")),
        last_update_chapter_id: unsigned(detail.pointer("/chapters/0/data/0/chapter_id")),
        last_update_time: signed(detail.get("last_updatetime")),
    })
}

fn tag_names(detail: &Value, key: &str) -> Vec<String> {
    detail
        .get(key)
        .and_then(Value::as_array)
        .map(|tags| tags.iter().map(|tag| text(tag.get("tag_name"))).collect())
        .unwrap_or_default()
}

fn text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn signed(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or_default(),
        Some(Value::String(s)) => s.trim().parse().unwrap_or_default(),
        Some(Value::Bool(b)) => i64::from(*b),
        _ => 0,
    }
}

fn unsigned(value: Option<&Value>) -> u64 {
    value.and_then(strict_u64).unwrap_or_default()
}

fn strict_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
