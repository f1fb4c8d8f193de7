use crate::models::Claims;
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Verifies signature and expiry. Tokens are issued by the auth service,
/// which shares the secret.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
