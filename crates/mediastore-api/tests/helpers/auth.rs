use jsonwebtoken::{encode, EncodingKey, Header};
use mediastore_api::auth::JwtClaims;

/// JWT secret used by every test app.
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// Signed bearer token for `subject`, valid for one hour.
pub fn token_for(subject: &str) -> String {
    let claims = JwtClaims {
        sub: subject.to_string(),
        exp: chrono::Utc::now().timestamp() + 3600,
        iat: Some(chrono::Utc::now().timestamp()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to sign test token")
}

pub fn bearer(subject: &str) -> String {
    format!("Bearer {}", token_for(subject))
}
