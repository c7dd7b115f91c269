use std::time::{SystemTime, UNIX_EPOCH};

use crate::{
    model::role::Role,
    models::{Claims, TokenType},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .unwrap_or_default()
}

/// Who a token is issued for.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    pub email: String,
    pub role: Role,
    pub employee_id: Option<String>,
}

fn issue(
    subject: &TokenSubject,
    token_type: TokenType,
    secret: &str,
    ttl: usize,
) -> jsonwebtoken::errors::Result<(String, Claims)> {
    let claims = Claims {
        sub: subject.email.clone(),
        role: subject.role,
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id: subject.employee_id.clone(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok((token, claims))
}

pub fn generate_access_token(
    subject: &TokenSubject,
    secret: &str,
    ttl: usize,
) -> jsonwebtoken::errors::Result<String> {
    issue(subject, TokenType::Access, secret, ttl).map(|(token, _)| token)
}

pub fn generate_refresh_token(
    subject: &TokenSubject,
    secret: &str,
    ttl: usize,
) -> jsonwebtoken::errors::Result<(String, Claims)> {
    issue(subject, TokenType::Refresh, secret, ttl)
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject {
        TokenSubject {
            email: "ann@pal.tech".to_string(),
            role: Role::Employee,
            employee_id: Some("PT-1".to_string()),
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let token = generate_access_token(&subject(), "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "ann@pal.tech");
        assert_eq!(claims.role, Role::Employee);
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.employee_id.as_deref(), Some("PT-1"));
    }

    #[test]
    fn refresh_tokens_get_fresh_ids() {
        let (_, first) = generate_refresh_token(&subject(), "secret", 60).unwrap();
        let (_, second) = generate_refresh_token(&subject(), "secret", 60).unwrap();
        assert_eq!(first.token_type, TokenType::Refresh);
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&subject(), "secret", 60).unwrap();
        assert!(verify_token(&token, "other").is_err());
    }
}
