use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use riderelay_core::error::AppError;
use riderelay_core::models::{DeleteAck, Document, InsertAck, UpdateAck};

/// Serialize a typed body into the flat field map handed to the store.
fn to_fields<T: Serialize>(body: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(body)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(AppError::ValidationError(
            "Request body must be a JSON object".into(),
        )),
    }
}

/// Deserializes a field that was present in the body, keeping an explicit
/// `null` as `Some(Value::Null)`. Absent fields fall back to `None` via
/// `#[serde(default)]`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

fn check_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() {
        return Err(AppError::ValidationError("email must not be empty".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct AccessTokenRequest {
    /// Identity the token is issued for; scopes booking access
    pub email: String,
    /// Any further identity claims, carried through into the token
    #[serde(flatten)]
    pub claims: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct AuthResponse {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub success: bool,
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListServicesQuery {
    /// Field to sort by; only `price` is supported
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// `asc` (default) or `desc`
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Service attributes. Known fields are documented; every value, including
/// `null`, is stored as sent.
///
/// Used for both create (full document) and update (partial merge).
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceFields {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<f64>)]
    pub price: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ServiceFields {
    pub fn into_fields(self) -> Result<Map<String, Value>, AppError> {
        to_fields(&self)
    }
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListBookingsQuery {
    /// Must equal the email of the authenticated caller
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct NewBooking {
    /// Owner of the booking
    pub email: String,
    /// Booked service; stored as given, never validated
    #[serde(
        rename = "serviceId",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub service_id: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl NewBooking {
    pub fn into_fields(self) -> Result<Map<String, Value>, AppError> {
        check_email(&self.email)?;
        to_fields(&self)
    }
}

/// Partial booking. Present fields overwrite, `null` included.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BookingPatch {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub email: Option<Value>,
    #[serde(
        rename = "serviceId",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub service_id: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl BookingPatch {
    pub fn into_fields(self) -> Result<Map<String, Value>, AppError> {
        to_fields(&self)
    }
}

// ---------------------------------------------------------------------------
// Documents & acknowledgements
// ---------------------------------------------------------------------------

/// A stored service or booking: its fields plus the store-assigned `_id`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DocumentResponse {
    #[serde(rename = "_id")]
    pub id: Uuid,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        Self {
            id: doc.id,
            fields: doc.fields.into_iter().collect(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InsertResponse {
    pub acknowledged: bool,
    pub inserted_id: Uuid,
}

impl From<InsertAck> for InsertResponse {
    fn from(ack: InsertAck) -> Self {
        Self {
            acknowledged: ack.acknowledged,
            inserted_id: ack.inserted_id,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
}

impl From<UpdateAck> for UpdateResponse {
    fn from(ack: UpdateAck) -> Self {
        Self {
            acknowledged: ack.acknowledged,
            matched_count: ack.matched_count,
            modified_count: ack.modified_count,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

impl From<DeleteAck> for DeleteResponse {
    fn from(ack: DeleteAck) -> Self {
        Self {
            acknowledged: ack.acknowledged,
            deleted_count: ack.deleted_count,
        }
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
