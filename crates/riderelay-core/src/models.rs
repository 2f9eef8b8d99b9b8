use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::AppError;

/// Wire name of the store-assigned identifier.
pub const ID_FIELD: &str = "_id";

/// Field used by the price sort on the services listing.
pub const PRICE_FIELD: &str = "price";

/// Field that scopes bookings to their owner.
pub const EMAIL_FIELD: &str = "email";

/// The two document collections exposed by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Services,
    Bookings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Services => "services",
            Collection::Bookings => "bookings",
        }
    }

    /// Singular noun used in log lines and error messages.
    pub fn noun(&self) -> &'static str {
        match self {
            Collection::Services => "service",
            Collection::Bookings => "booking",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema-less stored document.
///
/// Serializes as the stored JSON object with the identifier under `_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: Uuid, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Numeric `price`, if the document has one.
    pub fn price(&self) -> Option<f64> {
        self.fields.get(PRICE_FIELD).and_then(Value::as_f64)
    }

    pub fn email(&self) -> Option<&str> {
        self.fields.get(EMAIL_FIELD).and_then(Value::as_str)
    }
}

/// Result of an insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl InsertAck {
    pub fn new(inserted_id: Uuid) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

/// Result of a merge update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl UpdateAck {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            acknowledged: true,
            matched_count,
            modified_count,
        }
    }
}

/// Result of a delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl DeleteAck {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            acknowledged: true,
            deleted_count,
        }
    }
}

/// Containment filter over top-level document fields, with the semantics of
/// PostgreSQL's `jsonb @>`: scalars compare by equality, objects match when
/// every filter key is contained, arrays match when every filter element is
/// contained in some document element.
///
/// An empty filter matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fields: Map<String, Value>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn matching(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    pub fn matches(&self, fields: &Map<String, Value>) -> bool {
        self.fields.iter().all(|(key, expected)| {
            fields
                .get(key)
                .is_some_and(|actual| contains(actual, expected))
        })
    }

    /// The filter as a JSON object, suitable for a containment query.
    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

fn contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(actual), Value::Object(expected)) => expected.iter().all(|(key, value)| {
            actual
                .get(key)
                .is_some_and(|inner| contains(inner, value))
        }),
        (Value::Array(actual), Value::Array(expected)) => expected
            .iter()
            .all(|value| actual.iter().any(|inner| contains(inner, value))),
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => actual == expected,
    }
}

/// Parse a path identifier into a document id.
pub fn parse_document_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidIdentifier(raw.to_string()))
}

/// Drop keys callers may not write (the identifier is store-owned).
pub fn strip_reserved(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.remove(ID_FIELD);
    fields
}

/// Merge `patch` into `target` at the top level. Returns whether anything changed.
pub fn merge_fields(target: &mut Map<String, Value>, patch: Map<String, Value>) -> bool {
    let mut changed = false;
    for (key, value) in patch {
        if target.get(&key) != Some(&value) {
            target.insert(key, value);
            changed = true;
        }
    }
    changed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortOrder::Ascending),
            "desc" | "descending" => Ok(SortOrder::Descending),
            other => Err(format!(
                "Unknown sort order '{other}': expected 'asc' or 'desc'"
            )),
        }
    }
}

/// Ordering requested for the services listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSort {
    pub order: SortOrder,
}

impl PriceSort {
    /// Interpret the `sortBy` / `sortOrder` query pair.
    ///
    /// Only `sortBy=price` sorts; anything else keeps the store's natural order.
    pub fn from_query(
        sort_by: Option<&str>,
        sort_order: Option<&str>,
    ) -> Result<Option<Self>, AppError> {
        match sort_by {
            Some(field) if field.eq_ignore_ascii_case(PRICE_FIELD) => {
                let order = sort_order
                    .map(str::parse::<SortOrder>)
                    .transpose()
                    .map_err(AppError::ValidationError)?
                    .unwrap_or_default();
                Ok(Some(Self { order }))
            }
            _ => Ok(None),
        }
    }

    /// Stable sort by numeric price. Unpriced documents go last in either direction.
    pub fn apply(&self, docs: &mut [Document]) {
        let order = self.order;
        docs.sort_by(|a, b| match (a.price(), b.price()) {
            (Some(x), Some(y)) => match order {
                SortOrder::Ascending => x.total_cmp(&y),
                SortOrder::Descending => y.total_cmp(&x),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }
}
