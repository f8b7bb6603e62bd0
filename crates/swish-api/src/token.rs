use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use swish_types::api::Claims;

use crate::error::ApiError;

/// Bearer tokens stay valid for seven days from issue.
const TOKEN_TTL_DAYS: i64 = 7;

pub fn issue(secret: &str, user_id: Uuid) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Validate a raw `Authorization` header value. Validity is purely a
/// function of signature and expiry; nothing is looked up.
pub fn verify(secret: &str, auth_header: Option<&str>) -> Result<Claims, ApiError> {
    let header = auth_header.ok_or(ApiError::MissingToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::MissingToken)?;

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::InvalidToken)?;

    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip() {
        let user_id = Uuid::new_v4();
        let token = issue(SECRET, user_id).unwrap();

        let claims = verify(SECRET, Some(&format!("Bearer {token}"))).unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn missing_header() {
        assert!(matches!(verify(SECRET, None), Err(ApiError::MissingToken)));
    }

    #[test]
    fn missing_bearer_prefix() {
        let token = issue(SECRET, Uuid::new_v4()).unwrap();
        assert!(matches!(
            verify(SECRET, Some(&token)),
            Err(ApiError::MissingToken)
        ));
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = issue(SECRET, Uuid::new_v4()).unwrap();
        assert!(matches!(
            verify("other-secret", Some(&format!("Bearer {token}"))),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_rejected() {
        let claims = Claims {
            sub: Uuid::new_v4(),
            // well past the default validation leeway
            exp: (Utc::now() - Duration::days(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify(SECRET, Some(&format!("Bearer {token}"))),
            Err(ApiError::InvalidToken)
        ));
    }
}
