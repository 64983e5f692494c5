use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("Malformed bearer token: {0}")]
    Malformed(String),
}

/// Reads the tenant claim from a bearer token issued by the auth subsystem.
pub trait TokenClaimsReader: Send + Sync {
    /// `Ok(None)` when the token is well formed but carries no tenant claim.
    fn tenant_id(&self, token: &str) -> Result<Option<i32>, ClaimsError>;
}

/// [`TokenClaimsReader`] backed by `jsonwebtoken`.
///
/// Without a secret only the payload is inspected: the token has already
/// passed the authentication guard, which owns signature checks. With a
/// secret the HS256 signature and expiry are verified here as well.
#[derive(Clone)]
pub struct JwtClaimsReader {
    key: DecodingKey,
    validation: Validation,
}

impl JwtClaimsReader {
    /// Inspect payloads of tokens verified upstream
    pub fn payload_only() -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
        }
    }

    /// Verify HS256 signature and expiry before reading claims
    pub fn verifying(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_aud = false;

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn from_secret(secret: Option<&str>) -> Self {
        match secret {
            Some(secret) => Self::verifying(secret),
            None => Self::payload_only(),
        }
    }
}

impl TokenClaimsReader for JwtClaimsReader {
    fn tenant_id(&self, token: &str) -> Result<Option<i32>, ClaimsError> {
        let data = decode::<Map<String, Value>>(token, &self.key, &self.validation)
            .map_err(|e| ClaimsError::Malformed(e.to_string()))?;

        let claim = data.claims.get("tenantId").or_else(|| data.claims.get("tenant_id"));

        match claim {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(|id| i32::try_from(id).ok())
                .map(Some)
                .ok_or_else(|| ClaimsError::Malformed(format!("tenantId claim out of range: {}", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse::<i32>()
                .map(Some)
                .map_err(|_| ClaimsError::Malformed(format!("tenantId claim is not numeric: {}", s))),
            Some(other) => Err(ClaimsError::Malformed(format!("unexpected tenantId claim: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    fn token(claims: Value, secret: &str) -> String {
        encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    #[test]
    fn reads_numeric_and_string_claims() {
        let reader = JwtClaimsReader::payload_only();
        assert_eq!(reader.tenant_id(&token(json!({"tenantId": 7}), "any")), Ok(Some(7)));
        assert_eq!(reader.tenant_id(&token(json!({"tenant_id": "12"}), "other")), Ok(Some(12)));
    }

    #[test]
    fn missing_claim_is_none() {
        let reader = JwtClaimsReader::payload_only();
        assert_eq!(reader.tenant_id(&token(json!({"sub": "user-1"}), "x")), Ok(None));
    }

    #[test]
    fn garbage_is_malformed() {
        let reader = JwtClaimsReader::payload_only();
        assert!(reader.tenant_id("not-a-jwt").is_err());
        assert!(reader.tenant_id(&token(json!({"tenantId": "abc"}), "x")).is_err());
        assert!(reader.tenant_id(&token(json!({"tenantId": [1]}), "x")).is_err());
    }

    #[test]
    fn verifying_reader_rejects_foreign_signatures() {
        let exp = chrono::Utc::now().timestamp() + 3600;
        let reader = JwtClaimsReader::verifying("right");
        assert_eq!(reader.tenant_id(&token(json!({"tenantId": 3, "exp": exp}), "right")), Ok(Some(3)));
        assert!(reader.tenant_id(&token(json!({"tenantId": 3, "exp": exp}), "wrong")).is_err());
    }
}
