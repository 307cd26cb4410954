use super::model::{parse_roles, AuthenticatedUser, Role};
use crate::core::config::AuthConfig;
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    roles_claim: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // exp, iss and aud are checked by jsonwebtoken during decode
    sub: String,
    #[serde(default)]
    email: Option<String>,
    // Absent on providers that never verify addresses
    #[serde(default)]
    email_verified: bool,

    // Namespaced custom claims vary per provider and are looked up by name
    #[serde(flatten)]
    extra: HashMap<String, Value>,
}

impl JwtValidator {
    pub fn new(jwks_client: Arc<JwksClient>, config: &AuthConfig) -> Self {
        Self {
            jwks_client,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            roles_claim: config.roles_claim.clone(),
            leeway: config.jwt_leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let claims = token_data.claims;
        let roles = extract_roles(&claims.extra, &self.roles_claim);

        Ok(AuthenticatedUser {
            sub: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            roles,
        })
    }
}

/// Read roles from the configured claim.
///
/// The claim may hold `{ "roles": [...] }`, a bare array or a single string.
/// A top-level `roles` claim is used when the configured one is absent.
fn extract_roles(extra: &HashMap<String, Value>, roles_claim: &str) -> Vec<Role> {
    let value = match extra.get(roles_claim) {
        Some(Value::Object(map)) => map.get("roles"),
        Some(other) => Some(other),
        None => extra.get("roles"),
    };

    match value {
        Some(Value::Array(items)) => parse_roles(items.iter().filter_map(Value::as_str)),
        Some(Value::String(single)) => parse_roles([single.as_str()]),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const CLAIM: &str = "https://safedocs.app/claims";

    fn extra(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_roles_from_namespaced_object() {
        let claims = extra(json!({ CLAIM: { "roles": ["admin", "quimico"] } }));
        assert_eq!(
            extract_roles(&claims, CLAIM),
            vec![Role::Admin, Role::Chemist]
        );
    }

    #[test]
    fn test_roles_from_bare_array_and_string() {
        let claims = extra(json!({ CLAIM: ["metrologista"] }));
        assert_eq!(extract_roles(&claims, CLAIM), vec![Role::Metrologist]);

        let claims = extra(json!({ CLAIM: "chemist" }));
        assert_eq!(extract_roles(&claims, CLAIM), vec![Role::Chemist]);
    }

    #[test]
    fn test_roles_fall_back_to_top_level_claim() {
        let claims = extra(json!({ "roles": ["admin"] }));
        assert_eq!(extract_roles(&claims, CLAIM), vec![Role::Admin]);
    }

    #[test]
    fn test_missing_or_malformed_roles_are_empty() {
        assert!(extract_roles(&HashMap::new(), CLAIM).is_empty());

        let claims = extra(json!({ CLAIM: { "roles": 42 } }));
        assert!(extract_roles(&claims, CLAIM).is_empty());
    }

    #[test]
    fn test_claims_deserialize_with_extra_fields() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|123",
            "email": "a@b.test",
            "iss": "https://issuer.test/",
            "exp": 1,
            CLAIM: { "roles": ["admin"] }
        }))
        .unwrap();

        assert_eq!(claims.sub, "auth0|123");
        assert_eq!(claims.email.as_deref(), Some("a@b.test"));
        assert!(!claims.email_verified);
        assert_eq!(extract_roles(&claims.extra, CLAIM), vec![Role::Admin]);
    }

    #[test]
    fn test_claims_decode_email_verified() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "auth0|456",
            "email": "chem@b.test",
            "email_verified": true
        }))
        .unwrap();

        assert!(claims.email_verified);
        assert!(!claims.extra.contains_key("email_verified"));
    }
}
