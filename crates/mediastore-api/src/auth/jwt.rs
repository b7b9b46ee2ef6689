//! HS256 bearer token verification.

use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use mediastore_core::AppError;

use super::models::JwtClaims;

#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn verify(&self, token: &str) -> Result<JwtClaims, AppError> {
        let data = decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| {
                let reason = match e.kind() {
                    ErrorKind::ExpiredSignature => "Token has expired",
                    ErrorKind::InvalidSignature => "Invalid token signature",
                    ErrorKind::MissingRequiredClaim(_) => "Token is missing a required claim",
                    _ => "Invalid token",
                };
                tracing::debug!(error = %e, "JWT verification failed");
                AppError::Unauthorized(reason.to_string())
            },
        )?;

        if data.claims.sub.trim().is_empty() {
            return Err(AppError::Unauthorized("Token subject is empty".to_string()));
        }

        Ok(data.claims)
    }
}
