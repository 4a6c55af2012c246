//! HS256 access tokens.
//!
//! Tokens are standard three-part JWTs (base64url without padding) signed with
//! HMAC-SHA256 over `header.payload`. Only `alg = HS256` is accepted.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Unsupported token header")]
    UnsupportedHeader,

    #[error("Invalid token signature")]
    BadSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims carried by an access token. `sub` is the user's email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub fresh: bool,
}

#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
    ttl: Duration,
}

impl TokenSigner {
    #[must_use]
    pub fn new(secret: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret: secret.as_ref().to_vec(),
            ttl,
        }
    }

    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now())
    }

    pub fn issue_at(&self, subject: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
            token_type: "access".to_string(),
            fresh: false,
        };

        let header = Header {
            alg: "HS256".to_string(),
            typ: "JWT".to_string(),
        };

        let header_json =
            serde_json::to_vec(&header).map_err(|e| TokenError::Encoding(e.to_string()))?;
        let claims_json =
            serde_json::to_vec(&claims).map_err(|e| TokenError::Encoding(e.to_string()))?;

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header_json),
            URL_SAFE_NO_PAD.encode(claims_json)
        );
        let signature = self.mac(&signing_input)?.finalize().into_bytes();

        Ok(format!(
            "{signing_input}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut parts = token.trim().split('.');
        let (Some(header_b64), Some(payload_b64), Some(sig_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed);
        };

        let header: Header = decode_json(header_b64)?;
        if header.alg != "HS256" || !header.typ.eq_ignore_ascii_case("JWT") {
            return Err(TokenError::UnsupportedHeader);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::Malformed)?;
        self.mac(&format!("{header_b64}.{payload_b64}"))?
            .verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let claims: Claims = decode_json(payload_b64)?;
        let now = now.timestamp();
        if now < claims.nbf {
            return Err(TokenError::NotYetValid);
        }
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    fn mac(&self, signing_input: &str) -> Result<HmacSha256, TokenError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| TokenError::Encoding(format!("Invalid HMAC key: {e}")))?;
        mac.update(signing_input.as_bytes());
        Ok(mac)
    }
}

fn decode_json<T: serde::de::DeserializeOwned>(segment: &str) -> Result<T, TokenError> {
    let raw = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&raw).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("super-secret", Duration::minutes(15))
    }

    #[test]
    fn test_issue_then_verify() {
        let token = signer().issue("luke@rebellion.org").unwrap();
        assert_eq!(token.split('.').count(), 3);

        let claims = signer().verify(&token).unwrap();
        assert_eq!(claims.sub, "luke@rebellion.org");
        assert_eq!(claims.token_type, "access");
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = signer().issue("luke@rebellion.org").unwrap();
        let other = TokenSigner::new("another-secret", Duration::minutes(15));
        assert_eq!(other.verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = signer().issue("luke@rebellion.org").unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut claims: Claims =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        claims.sub = "vader@empire.gov".to_string();
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());

        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);
        assert_eq!(signer().verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_expiry() {
        let issued = Utc::now() - Duration::minutes(30);
        let token = signer().issue_at("luke@rebellion.org", issued).unwrap();
        assert_eq!(signer().verify(&token), Err(TokenError::Expired));

        let claims = signer()
            .verify_at(&token, issued + Duration::minutes(14))
            .unwrap();
        assert_eq!(claims.sub, "luke@rebellion.org");
    }

    #[test]
    fn test_not_yet_valid() {
        let issued = Utc::now() + Duration::minutes(5);
        let token = signer().issue_at("luke@rebellion.org", issued).unwrap();
        assert_eq!(signer().verify(&token), Err(TokenError::NotYetValid));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(signer().verify(""), Err(TokenError::Malformed));
        assert_eq!(signer().verify("a.b"), Err(TokenError::Malformed));
        assert_eq!(signer().verify("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(signer().verify("!!.??.##"), Err(TokenError::Malformed));
    }

    #[test]
    fn test_alg_none_rejected() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let token = signer().issue("luke@rebellion.org").unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{header}.{}.", parts[1]);
        assert_eq!(signer().verify(&forged), Err(TokenError::UnsupportedHeader));
    }
}
