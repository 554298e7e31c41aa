// ============================================================================
// Platform API - Principal Middleware
// File: crates/platform-api/src/auth.rs
// ============================================================================
//! Bearer-token check for everything outside `/health`.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, errors::ErrorKind as JwtErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

/// Token claims. `user_id` is accepted as a string or a number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Value,
    pub username: String,
    pub exp: u64,
}

/// Authenticated caller, stored in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub username: String,
}

pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// HS256 with a shared secret; `exp` is mandatory.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Principal, ApiError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                JwtErrorKind::ExpiredSignature => ApiError::Unauthorized("Token has expired".to_string()),
                _ => ApiError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        let claims = data.claims;
        let user_id = match claims.user_id {
            Value::String(id) if !id.is_empty() => id,
            Value::Number(id) => id.to_string(),
            _ => return Err(ApiError::Unauthorized("Invalid token claims".to_string())),
        };
        if claims.username.is_empty() {
            return Err(ApiError::Unauthorized("Invalid token claims".to_string()));
        }

        Ok(Principal {
            user_id,
            username: claims.username,
        })
    }
}

fn bearer_token(request: &Request) -> Result<&str, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Authorization header required".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header format".to_string()))
}

pub async fn require_principal(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(verifier) = state.verifier.as_ref() else {
        return Ok(next.run(request).await);
    };

    let principal = bearer_token(&request)
        .and_then(|token| verifier.verify(token))
        .map_err(|e| {
            warn!(path = %request.uri().path(), "Rejected request: {}", e);
            e
        })?;

    debug!(user_id = %principal.user_id, username = %principal.username, "Principal accepted");
    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn token(claims: Value) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> u64 {
        (chrono::Utc::now().timestamp() + 3600) as u64
    }

    #[test]
    fn test_verify_accepts_numeric_user_id() {
        let verifier = TokenVerifier::new(SECRET);
        let principal = verifier
            .verify(&token(json!({ "user_id": 42, "username": "bob", "exp": future_exp() })))
            .unwrap();
        assert_eq!(
            principal,
            Principal {
                user_id: "42".to_string(),
                username: "bob".to_string()
            }
        );
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let verifier = TokenVerifier::new(SECRET);
        let expired = (chrono::Utc::now().timestamp() - 3600) as u64;
        let err = verifier
            .verify(&token(json!({ "user_id": "u-1", "username": "bob", "exp": expired })))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Token has expired"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_missing_claims() {
        let verifier = TokenVerifier::new("another-secret");
        let err = verifier
            .verify(&token(json!({ "user_id": "u-1", "username": "bob", "exp": future_exp() })))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Invalid token"));

        let verifier = TokenVerifier::new(SECRET);
        let err = verifier
            .verify(&token(json!({ "user_id": null, "username": "bob", "exp": future_exp() })))
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(msg) if msg == "Invalid token claims"));
    }
}
