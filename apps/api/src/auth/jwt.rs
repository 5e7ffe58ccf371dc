// JWT token creation and verification
// Tokens identify a user by their numeric id and expire after 8 hours

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_LIFETIME_HOURS: i64 = 8;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user id)
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    pub exp: usize,
}

/// Creates a signed HS256 token for a user
///
/// # Example
/// ```
/// use turfhub_api::auth::jwt::{create_token, verify_token};
///
/// let token = create_token(42, "your-secret-key").expect("valid token");
/// let claims = verify_token(&token, "your-secret-key").expect("valid claims");
/// assert_eq!(claims.sub, 42);
/// ```
pub fn create_token(user_id: i64, secret: &str) -> Result<String, String> {
    let expiry = Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS);
    let claims = Claims {
        sub: user_id,
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies and decodes a token
///
/// # Returns
/// * `Err(String)` - If the signature is wrong or the token has expired
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
