use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;

use riderelay_core::AppError;

const DEFAULT_PORT: u16 = 5000;

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// HS256 secret for access tokens.
    pub token_secret: String,
    /// Origins allowed to call the API with credentials. Empty means any origin.
    pub allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Read configuration from environment variables.
    ///
    /// - `RIDERELAY_TOKEN_SECRET` (required)
    /// - `PORT` (optional, defaults to 5000)
    /// - `RIDERELAY_ALLOWED_ORIGINS` (optional, comma-separated)
    pub fn from_env() -> Result<Self, AppError> {
        let token_secret = std::env::var("RIDERELAY_TOKEN_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                AppError::ConfigError(
                    "RIDERELAY_TOKEN_SECRET not set. Required to sign access tokens.".into(),
                )
            })?;

        Ok(Self {
            port: parse_port(std::env::var("PORT").ok())?,
            token_secret,
            allowed_origins: parse_origins(
                std::env::var("RIDERELAY_ALLOWED_ORIGINS").ok().as_deref(),
            ),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }

    /// CORS policy: credentialed access for the configured origins, or fully open.
    pub fn cors_layer(&self) -> Result<CorsLayer, AppError> {
        if self.allowed_origins.is_empty() {
            return Ok(CorsLayer::permissive());
        }

        let origins = self
            .allowed_origins
            .iter()
            .map(|origin| {
                origin.parse::<HeaderValue>().map_err(|_| {
                    AppError::ConfigError(format!("Invalid origin in RIDERELAY_ALLOWED_ORIGINS: '{origin}'"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_credentials(true)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([header::CONTENT_TYPE]))
    }
}

fn parse_port(raw: Option<String>) -> Result<u16, AppError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(raw) => raw
            .parse()
            .map_err(|_| AppError::ConfigError(format!("Invalid PORT '{raw}'"))),
    }
}

fn parse_origins(raw: Option<&str>) -> Vec<String> {
    raw.map(|list| {
        list.split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}
