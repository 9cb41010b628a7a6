//! Typed entities over raw store documents. Each module owns one collection:
//! construction from a [`Record`](crate::store::Record) validates and coerces
//! every field, so nothing past this boundary deals with dynamic JSON.

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    store::Document,
};

pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

pub use categories::Category;
pub use orders::{Order, OrderLine};
pub use products::Product;
pub use users::User;

/// Identities arriving over the wire are opaque strings; one that does not
/// parse reads the same as one that matches nothing.
pub(crate) fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

pub(crate) fn corrupt(collection: &str, field: &str) -> AppError {
    AppError::Internal(anyhow!(
        "corrupt `{collection}` document: bad or missing field `{field}`"
    ))
}

pub(crate) fn require_str(doc: &Document, collection: &str, field: &str) -> AppResult<String> {
    doc.get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| corrupt(collection, field))
}

pub(crate) fn require_bool(doc: &Document, collection: &str, field: &str) -> AppResult<bool> {
    doc.get(field)
        .and_then(Value::as_bool)
        .ok_or_else(|| corrupt(collection, field))
}

pub(crate) fn require_id(doc: &Document, collection: &str, field: &str) -> AppResult<Uuid> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| Uuid::parse_str(raw).ok())
        .ok_or_else(|| corrupt(collection, field))
}

pub(crate) fn require_i64(doc: &Document, collection: &str, field: &str) -> AppResult<i64> {
    doc.get(field)
        .and_then(Value::as_i64)
        .ok_or_else(|| corrupt(collection, field))
}

/// Prices are coerced to a number no matter how they were stored: older
/// documents carry them as strings.
pub(crate) fn require_price(doc: &Document, collection: &str, field: &str) -> AppResult<i64> {
    let price = match doc.get(field) {
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    price
        .filter(|price| *price >= 0)
        .ok_or_else(|| corrupt(collection, field))
}

pub(crate) fn require_datetime(
    doc: &Document,
    collection: &str,
    field: &str,
) -> AppResult<DateTime<Utc>> {
    doc.get(field)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| corrupt(collection, field))
}
