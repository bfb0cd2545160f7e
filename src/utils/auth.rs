use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Session token payload: the acting user plus standard expiry.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: usize,
}

/// The resolved identity behind a request.
///
/// Anything short of a structurally valid, correctly signed, unexpired token
/// resolves to `Anonymous`. Callers never learn why.
#[derive(Debug, Clone)]
pub enum Identity {
    Known(Claims),
    Anonymous,
}

pub fn create_session_token(user_id: &str, email: &str, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: user_id.to_owned(),
        email: email.to_owned(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

pub fn validate_session_token(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// Resolve an optional credential to an identity. Fails closed: a missing,
/// malformed, tampered, or expired token all come out as `Anonymous`.
pub fn resolve_identity(token: Option<&str>, secret: &str) -> Identity {
    match token {
        Some(t) => match validate_session_token(t, secret) {
            Ok(claims) => Identity::Known(claims),
            Err(_) => Identity::Anonymous,
        },
        None => Identity::Anonymous,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_cycle() {
        let secret = "test_secret";
        let token = create_session_token("user_123", "artist@example.com", secret).unwrap();
        let claims = validate_session_token(&token, secret).unwrap();
        assert_eq!(claims.sub, "user_123");
        assert_eq!(claims.email, "artist@example.com");
    }

    #[test]
    fn test_resolve_identity_fails_closed() {
        let secret = "test_secret";
        let token = create_session_token("user_123", "artist@example.com", secret).unwrap();

        assert!(matches!(
            resolve_identity(Some(&token), secret),
            Identity::Known(_)
        ));
        assert!(matches!(resolve_identity(None, secret), Identity::Anonymous));
        assert!(matches!(
            resolve_identity(Some("not-a-token"), secret),
            Identity::Anonymous
        ));
        // Signed with a different key
        assert!(matches!(
            resolve_identity(Some(&token), "other_secret"),
            Identity::Anonymous
        ));
    }

    #[test]
    fn test_expired_token_is_anonymous() {
        let secret = "test_secret";
        let claims = Claims {
            sub: "user_123".to_string(),
            email: "artist@example.com".to_string(),
            exp: (Utc::now() - Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_ref()),
        )
        .unwrap();

        assert!(matches!(
            resolve_identity(Some(&token), secret),
            Identity::Anonymous
        ));
    }
}
