use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};

use crate::auth::TOKEN_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RideRelay API",
        version = "0.1.0",
        description = "Ride service catalogue and booking gateway with cookie-based access tokens."
    ),
    paths(
        crate::routes::issue_access_token,
        crate::routes::logout,
        crate::routes::list_services,
        crate::routes::get_service,
        crate::routes::create_service,
        crate::routes::update_service,
        crate::routes::delete_service,
        crate::routes::list_bookings,
        crate::routes::get_booking,
        crate::routes::create_booking,
        crate::routes::update_booking,
        crate::routes::delete_booking,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::AccessTokenRequest,
        crate::dto::AuthResponse,
        crate::dto::ServiceFields,
        crate::dto::NewBooking,
        crate::dto::BookingPatch,
        crate::dto::DocumentResponse,
        crate::dto::InsertResponse,
        crate::dto::UpdateResponse,
        crate::dto::DeleteResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "auth", description = "Access token issuance and logout"),
        (name = "services", description = "Ride service catalogue"),
        (name = "bookings", description = "Customer bookings"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Registers the `token` cookie as an API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                    TOKEN_COOKIE,
                    "HTTP-only access token set by POST /api/v1/auth/access-token.",
                ))),
            );
        }
    }
}
