use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use riderelay_core::{AppError, Claims};

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the cookie carrying the access token.
pub const TOKEN_COOKIE: &str = "token";

/// HTTP-only cookie carrying a freshly issued token.
///
/// Not marked `Secure` so the API works over plain HTTP as well.
pub fn access_token_cookie(token: String, ttl: chrono::Duration) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(ttl.num_seconds()))
        .build()
}

/// Cookie that overwrites the access token and expires it immediately.
pub fn cleared_token_cookie() -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, ""))
        .path("/")
        .http_only(true)
        .secure(false)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Verified caller identity, extracted from the `token` cookie.
///
/// Taking this as a handler argument makes the route require authentication:
/// requests without a valid token are rejected with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(TOKEN_COOKIE)
            .map(Cookie::value)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                tracing::debug!(path = %parts.uri.path(), "Request without access token");
                AppError::Unauthorized("Missing access token cookie".into())
            })?;

        let claims = state.signer.verify(token)?;
        Ok(AuthUser(claims))
    }
}
