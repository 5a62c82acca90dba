use anyhow::{Context, Result};
use chrono::Utc;
use contracts::system::auth::TokenClaims;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::shared::config::config;

/// Выпустить access-токен; возвращает токен и unix-время истечения
pub fn generate_access_token(username: &str) -> Result<(String, i64)> {
    let auth = &config().auth;
    let now = Utc::now();
    let expires_at = (now + chrono::Duration::hours(auth.token_lifetime_hours.max(1))).timestamp();

    let claims = TokenClaims {
        sub: username.to_string(),
        exp: expires_at as usize,
        iat: now.timestamp() as usize,
    };
    let token = encode_claims(&claims, &auth.jwt_secret)?;
    Ok((token, expires_at))
}

/// Проверить подпись и срок токена
pub fn validate_token(token: &str) -> Result<TokenClaims> {
    decode_claims(token, &config().auth.jwt_secret)
}

fn encode_claims(claims: &TokenClaims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

fn decode_claims(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issued_token_validates() {
        let (token, expires_at) = generate_access_token("admin").expect("token");
        assert!(expires_at > Utc::now().timestamp());
        let claims = validate_token(&token).expect("valid");
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp as i64, expires_at);
    }

    #[test]
    fn test_wrong_secret_and_expired_tokens_fail() {
        let now = Utc::now().timestamp() as usize;
        let claims = TokenClaims {
            sub: "admin".into(),
            exp: now + 3600,
            iat: now,
        };
        let token = encode_claims(&claims, "one-secret").expect("token");
        assert!(decode_claims(&token, "other-secret").is_err());

        let expired = TokenClaims {
            exp: now - 3600,
            iat: now - 7200,
            ..claims
        };
        let token = encode_claims(&expired, "one-secret").expect("token");
        assert!(decode_claims(&token, "one-secret").is_err());
    }
}
