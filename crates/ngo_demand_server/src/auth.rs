//! Bearer-token authentication.
//!
//! Token issuing lives outside this server. Handlers take a [`Principal`] argument; the
//! extractor resolves it through the [`TokenVerifier`] held in [`AppState`] and rejects the
//! request with 401 before any handler code runs.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use anyhow::Context;
use std::collections::HashMap;
use std::future::{ready, Ready};
use std::path::Path;

use crate::error::DemandError;
use crate::model::principal::Principal;
use crate::state::AppState;

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Option<Principal>;
}

/// Fixed token table, loaded from a JSON object of `token -> principal`.
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    tokens: HashMap<String, Principal>,
}

impl StaticTokenVerifier {
    pub fn new(tokens: HashMap<String, Principal>) -> Self {
        StaticTokenVerifier { tokens }
    }

    pub fn with_token(mut self, token: impl Into<String>, principal: Principal) -> Self {
        self.tokens.insert(token.into(), principal);
        self
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read tokens file {}", path.display()))?;
        let tokens: HashMap<String, Principal> = serde_json::from_str(&text)
            .with_context(|| format!("Invalid tokens file {}", path.display()))?;
        log::info!("Loaded {} API tokens from {}", tokens.len(), path.display());
        Ok(StaticTokenVerifier { tokens })
    }
}

impl TokenVerifier for StaticTokenVerifier {
    fn verify(&self, token: &str) -> Option<Principal> {
        self.tokens.get(token).cloned()
    }
}

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn authenticate(req: &HttpRequest) -> Result<Principal, DemandError> {
    let state = req.app_data::<web::Data<AppState>>().ok_or_else(|| {
        DemandError::Internal(anyhow::anyhow!("Application state is not configured"))
    })?;
    let token = bearer_token(req).ok_or_else(|| {
        log::debug!("{} {} without bearer token", req.method(), req.path());
        DemandError::Unauthorized
    })?;
    state.verifier.verify(token).ok_or_else(|| {
        log::debug!("{} {} with unknown token", req.method(), req.path());
        DemandError::Unauthorized
    })
}

impl FromRequest for Principal {
    type Error = DemandError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::principal::Role;

    #[test]
    fn test_static_verifier() {
        let verifier = StaticTokenVerifier::default()
            .with_token("tok-r1", Principal::new("u1", Role::Restaurant, "R1"));
        assert_eq!(
            verifier.verify("tok-r1").map(|p| p.organization_id),
            Some("R1".to_string())
        );
        assert!(verifier.verify("nope").is_none());
    }

    #[test]
    fn test_tokens_file() {
        let path = std::env::temp_dir().join(format!("tokens-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"{"abc":{"id":"u2","role":"ngo_admin","organizationId":"N1"}}"#,
        )
        .unwrap();
        let verifier = StaticTokenVerifier::from_file(&path).unwrap();
        let principal = verifier.verify("abc").unwrap();
        assert_eq!(principal.role, Role::NgoAdmin);
        assert_eq!(principal.organization_id, "N1");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_bearer_token_parsing() {
        let req = actix_web::test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Bearer  tok "))
            .to_http_request();
        assert_eq!(bearer_token(&req), Some("tok"));

        let req = actix_web::test::TestRequest::default()
            .insert_header((AUTHORIZATION, "Basic abc"))
            .to_http_request();
        assert_eq!(bearer_token(&req), None);
    }
}
