use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::WebError;

/// JWT claims carried by the bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: usize,
}

/// The authenticated caller, inserted into request extensions by
/// `require_auth` and extracted by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
}

impl AuthConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn decode(&self, token: &str) -> Result<Claims, WebError> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!(error = %e, "JWT validation failed");
            WebError::Unauthorized("Invalid or expired token".to_string())
        })
    }
}

/// Validates the Authorization bearer header and adds `AuthUser` to the
/// request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, WebError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| WebError::Unauthorized("Missing authorization header".to_string()))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        WebError::Unauthorized("Invalid authorization header format".to_string())
    })?;

    let claims = state.auth.decode(token)?;

    req.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        is_admin: claims.is_admin,
    });

    Ok(next.run(req).await)
}
