use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum_extra::extract::cookie::CookieJar;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use riderelay_core::{AppError, Identity, PriceSort};

use crate::auth::{AuthUser, access_token_cookie, cleared_token_cookie};
use crate::dto::{
    AccessTokenRequest, AuthResponse, BookingPatch, DeleteResponse, DocumentResponse,
    HealthResponse, InsertResponse, ListBookingsQuery, ListServicesQuery, NewBooking,
    ServiceFields, UpdateResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Prefix under which the auth and resource endpoints are mounted.
pub const API_PREFIX: &str = "/api/v1";

/// Build the full router with all routes.
///
/// Authentication is enforced per handler through the [`AuthUser`] extractor.
pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/auth/access-token", post(issue_access_token))
        .route("/auth/logout", post(logout))
        .route("/services", get(list_services))
        .route("/services/{service_id}", get(get_service))
        .route("/bookings", get(list_bookings))
        .route("/bookings/{booking_id}", get(get_booking))
        .route("/add-new-service", post(create_service))
        .route("/book-a-service", post(create_booking))
        .route("/update-service/{service_id}", put(update_service))
        .route("/update-booking/{booking_id}", put(update_booking))
        .route("/delete-service/{service_id}", delete(delete_service))
        .route("/delete-booking/{booking_id}", delete(delete_booking));

    let public = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.nest(API_PREFIX, api).with_state(state)
}

async fn root() -> &'static str {
    "RideRelay Server is running"
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/auth/access-token",
    request_body = AccessTokenRequest,
    responses(
        (status = 200, description = "Token issued and set as the `token` cookie", body = AuthResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
    ),
    tag = "auth"
)]
pub async fn issue_access_token(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    axum::Json(body): axum::Json<AccessTokenRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if body.email.trim().is_empty() {
        return Err(AppError::ValidationError("email must not be empty".into()).into());
    }

    let identity = Identity::new(body.email).with_claims(body.claims.into_iter().collect());
    let email = identity.email.clone();
    let token = state.signer.issue(identity)?;
    tracing::info!(%email, "Issued access token");

    let jar = jar.add(access_token_cookie(token, state.signer.ttl()));
    let response = AuthResponse {
        kind: "access-token",
        success: true,
    };

    Ok((jar, axum::Json(response)))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/logout",
    responses(
        (status = 200, description = "Token cookie cleared", body = AuthResponse),
    ),
    tag = "auth"
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.add(cleared_token_cookie());
    let response = AuthResponse {
        kind: "logout",
        success: true,
    };
    (jar, axum::Json(response))
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/services",
    params(ListServicesQuery),
    responses(
        (status = 200, description = "All services", body = Vec<DocumentResponse>),
        (status = 400, description = "Invalid sort order", body = crate::dto::ErrorResponse),
    ),
    tag = "services"
)]
pub async fn list_services(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListServicesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = PriceSort::from_query(query.sort_by.as_deref(), query.sort_order.as_deref())?;
    let services = state.gateway.list_services(sort).await?;

    let response: Vec<DocumentResponse> =
        services.into_iter().map(DocumentResponse::from).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/services/{service_id}",
    params(
        ("service_id" = String, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service details", body = DocumentResponse),
        (status = 400, description = "Malformed ID", body = crate::dto::ErrorResponse),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    tag = "services"
)]
pub async fn get_service(
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let service = state.gateway.get_service(&service_id).await?;
    Ok(axum::Json(DocumentResponse::from(service)))
}

#[utoipa::path(
    post,
    path = "/api/v1/add-new-service",
    request_body = ServiceFields,
    responses(
        (status = 201, description = "Service created", body = InsertResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "services"
)]
pub async fn create_service(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<ServiceFields>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.gateway.create_service(body.into_fields()?).await?;
    Ok((StatusCode::CREATED, axum::Json(InsertResponse::from(ack))))
}

#[utoipa::path(
    put,
    path = "/api/v1/update-service/{service_id}",
    params(
        ("service_id" = String, Path, description = "Service ID")
    ),
    request_body = ServiceFields,
    responses(
        (status = 200, description = "Merge result", body = UpdateResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "services"
)]
pub async fn update_service(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
    axum::Json(body): axum::Json<ServiceFields>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .gateway
        .update_service(&service_id, body.into_fields()?)
        .await?;
    Ok(axum::Json(UpdateResponse::from(ack)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/delete-service/{service_id}",
    params(
        ("service_id" = String, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Delete result", body = DeleteResponse),
        (status = 400, description = "Malformed ID", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "services"
)]
pub async fn delete_service(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(service_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.gateway.delete_service(&service_id).await?;
    Ok(axum::Json(DeleteResponse::from(ack)))
}

// ---------------------------------------------------------------------------
// Bookings
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/bookings",
    params(ListBookingsQuery),
    responses(
        (status = 200, description = "Bookings of the authenticated caller", body = Vec<DocumentResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Email does not match the token", body = crate::dto::ErrorResponse),
    ),
    security(("token" = [])),
    tag = "bookings"
)]
pub async fn list_bookings(
    user: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListBookingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = state
        .gateway
        .list_bookings(user.email(), query.email.as_deref())
        .await?;

    let response: Vec<DocumentResponse> =
        bookings.into_iter().map(DocumentResponse::from).collect();
    Ok(axum::Json(response))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{booking_id}",
    params(
        ("booking_id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Booking details", body = DocumentResponse),
        (status = 400, description = "Malformed ID", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found", body = crate::dto::ErrorResponse),
    ),
    security(("token" = [])),
    tag = "bookings"
)]
pub async fn get_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state.gateway.get_booking(&booking_id).await?;
    Ok(axum::Json(DocumentResponse::from(booking)))
}

#[utoipa::path(
    post,
    path = "/api/v1/book-a-service",
    request_body = NewBooking,
    responses(
        (status = 201, description = "Booking created", body = InsertResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "bookings"
)]
pub async fn create_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    axum::Json(body): axum::Json<NewBooking>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.gateway.create_booking(body.into_fields()?).await?;
    Ok((StatusCode::CREATED, axum::Json(InsertResponse::from(ack))))
}

#[utoipa::path(
    put,
    path = "/api/v1/update-booking/{booking_id}",
    params(
        ("booking_id" = String, Path, description = "Booking ID")
    ),
    request_body = BookingPatch,
    responses(
        (status = 200, description = "Merge result", body = UpdateResponse),
        (status = 400, description = "Bad request", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "bookings"
)]
pub async fn update_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
    axum::Json(body): axum::Json<BookingPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state
        .gateway
        .update_booking(&booking_id, body.into_fields()?)
        .await?;
    Ok(axum::Json(UpdateResponse::from(ack)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/delete-booking/{booking_id}",
    params(
        ("booking_id" = String, Path, description = "Booking ID")
    ),
    responses(
        (status = 200, description = "Delete result", body = DeleteResponse),
        (status = 400, description = "Malformed ID", body = crate::dto::ErrorResponse),
        (status = 401, description = "Unauthorized"),
    ),
    security(("token" = [])),
    tag = "bookings"
)]
pub async fn delete_booking(
    _user: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ack = state.gateway.delete_booking(&booking_id).await?;
    Ok(axum::Json(DeleteResponse::from(ack)))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let db_status = match state.db.document_repo().health_check().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check failed");
            "error"
        }
    };

    let status = if db_status == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if db_status == "ok" {
            "healthy"
        } else {
            "unhealthy"
        },
        database: db_status,
    };

    (status, axum::Json(response))
}
