//! Per-request context: forwarded credentials, cart ids, and store override.
//!
//! The gateway is stateless between requests. Everything it knows about the
//! caller arrives in headers on each request and is threaded explicitly into
//! every adapter call - no global or process-wide state ever changes on
//! behalf of one request.
//!
//! # Headers consumed
//!
//! - `Cookie` - browser session cookie, forwarded to the backend
//! - `Authorization: Bearer <token>` - business token or user session token
//! - `X-Session-Tokens` - JSON map of store id to per-store session token
//! - `X-Cart-Ids` - JSON map of store id to cart id
//! - `X-Marketplace-Config` - JSON array overriding the default store list
//!   for this request only

use std::collections::HashMap;

use axum::http::HeaderMap;
use marketplace_core::StoreConfig;
use secrecy::{ExposeSecret, SecretString};

use crate::config::parse_store_list;
use crate::error::GatewayError;

/// Prefix marking a bearer token as a trusted business integration rather
/// than an individual shopper session. Any other bearer token is treated as
/// a user session token.
pub const BUSINESS_TOKEN_PREFIX: &str = "biz_";

/// The single credential selected for one outbound backend call.
///
/// Precedence is fixed: a session token scoped to the target store wins,
/// then the bearer token, then the cookie. Exactly one is ever sent.
#[derive(Debug, Clone)]
pub enum EffectiveCredential {
    /// Store-scoped session token, sent as a bearer.
    SessionToken(SecretString),
    /// Caller-supplied bearer (business or user session token).
    Bearer(SecretString),
    /// Browser cookie, forwarded verbatim.
    Cookie(SecretString),
    /// Anonymous call.
    None,
}

/// Credentials forwarded by the caller for this request.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    cookie: Option<SecretString>,
    bearer: Option<SecretString>,
    /// Store id -> session token. Tokens are store-scoped: a token for store
    /// A is never sent to store B.
    session_tokens: HashMap<String, SecretString>,
}

impl Credentials {
    #[must_use]
    pub fn new(
        cookie: Option<String>,
        bearer: Option<String>,
        session_tokens: HashMap<String, String>,
    ) -> Self {
        Self {
            cookie: cookie.map(SecretString::from),
            bearer: bearer.map(SecretString::from),
            session_tokens: session_tokens
                .into_iter()
                .map(|(k, v)| (k, SecretString::from(v)))
                .collect(),
        }
    }

    /// Select the effective credential for a call to the given store.
    #[must_use]
    pub fn effective_for(&self, store_id: &str) -> EffectiveCredential {
        if let Some(token) = self.session_tokens.get(store_id) {
            return EffectiveCredential::SessionToken(token.clone());
        }
        if let Some(bearer) = &self.bearer {
            return EffectiveCredential::Bearer(bearer.clone());
        }
        if let Some(cookie) = &self.cookie {
            return EffectiveCredential::Cookie(cookie.clone());
        }
        EffectiveCredential::None
    }

    /// Whether the caller presented a credential that may identify an
    /// individual shopper session for this store: a store-scoped session
    /// token, a browser cookie, or a bearer token without the business
    /// prefix. A cookie only *may* carry an identity, so callers still have
    /// to resolve the actual customer against the backend.
    #[must_use]
    pub fn has_user_session(&self, store_id: &str) -> bool {
        if self.session_tokens.contains_key(store_id) || self.cookie.is_some() {
            return true;
        }
        self.bearer
            .as_ref()
            .is_some_and(|b| !b.expose_secret().starts_with(BUSINESS_TOKEN_PREFIX))
    }

    /// Clone these credentials with an additional store-scoped session token.
    ///
    /// Used by the guest-bootstrap branch of the checkout state machine: the
    /// freshly minted token is the effective credential for the remainder of
    /// that transition only and is never persisted by the gateway.
    #[must_use]
    pub fn with_session_token(&self, store_id: &str, token: &str) -> Self {
        let mut next = self.clone();
        next.session_tokens
            .insert(store_id.to_string(), SecretString::from(token.to_string()));
        next
    }
}

/// Everything extracted from one inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub credentials: Credentials,
    /// Store id -> cart id, persisted by the caller between turns.
    pub cart_ids: HashMap<String, String>,
    /// Per-request store list override; `None` means use the static default.
    pub store_override: Option<Vec<StoreConfig>>,
}

impl RequestContext {
    #[must_use]
    pub fn new(
        credentials: Credentials,
        cart_ids: HashMap<String, String>,
        store_override: Option<Vec<StoreConfig>>,
    ) -> Self {
        Self {
            credentials,
            cart_ids,
            store_override,
        }
    }

    /// Extract the request context from inbound headers.
    ///
    /// # Errors
    ///
    /// Returns an error if one of the JSON-valued headers fails to parse.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, GatewayError> {
        let cookie = header_str(headers, "cookie").map(ToString::to_string);

        let bearer = header_str(headers, "authorization")
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(ToString::to_string);

        let session_tokens: HashMap<String, String> =
            parse_json_header(headers, "x-session-tokens")?.unwrap_or_default();

        let cart_ids: HashMap<String, String> =
            parse_json_header(headers, "x-cart-ids")?.unwrap_or_default();

        let store_override = match header_str(headers, "x-marketplace-config") {
            Some(raw) => Some(parse_store_list(raw).map_err(|detail| {
                GatewayError::InvalidHeader {
                    name: "X-Marketplace-Config",
                    detail,
                }
            })?),
            None => None,
        };

        Ok(Self {
            credentials: Credentials::new(cookie, bearer, session_tokens),
            cart_ids,
            store_override,
        })
    }

    /// Caller-persisted cart id for a store, if any.
    #[must_use]
    pub fn cart_id_for(&self, store_id: &str) -> Option<&str> {
        self.cart_ids.get(store_id).map(String::as_str)
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn parse_json_header<T: serde::de::DeserializeOwned>(
    headers: &HeaderMap,
    name: &'static str,
) -> Result<Option<T>, GatewayError> {
    header_str(headers, name)
        .map(|raw| {
            serde_json::from_str(raw).map_err(|e| GatewayError::InvalidHeader {
                name,
                detail: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_session_token_wins_over_bearer_and_cookie() {
        let ctx = RequestContext::from_headers(&headers(&[
            ("cookie", "session=abc"),
            ("authorization", "Bearer biz_token123"),
            ("x-session-tokens", r#"{"store-1": "tok_store1"}"#),
        ]))
        .unwrap();

        match ctx.credentials.effective_for("store-1") {
            EffectiveCredential::SessionToken(t) => {
                assert_eq!(t.expose_secret(), "tok_store1");
            }
            other => panic!("expected session token, got {other:?}"),
        }
        // Store without a session token falls back to the bearer.
        match ctx.credentials.effective_for("store-2") {
            EffectiveCredential::Bearer(t) => assert_eq!(t.expose_secret(), "biz_token123"),
            other => panic!("expected bearer, got {other:?}"),
        }
    }

    #[test]
    fn test_cookie_is_last_resort() {
        let ctx =
            RequestContext::from_headers(&headers(&[("cookie", "session=abc")])).unwrap();
        match ctx.credentials.effective_for("store-1") {
            EffectiveCredential::Cookie(c) => assert_eq!(c.expose_secret(), "session=abc"),
            other => panic!("expected cookie, got {other:?}"),
        }
    }

    #[test]
    fn test_business_bearer_is_not_a_user_session() {
        let ctx = RequestContext::from_headers(&headers(&[(
            "authorization",
            "Bearer biz_token123",
        )]))
        .unwrap();
        assert!(!ctx.credentials.has_user_session("store-1"));

        let ctx = RequestContext::from_headers(&headers(&[(
            "authorization",
            "Bearer usertoken456",
        )]))
        .unwrap();
        assert!(ctx.credentials.has_user_session("store-1"));
    }

    #[test]
    fn test_cookie_counts_as_possible_user_session() {
        let ctx =
            RequestContext::from_headers(&headers(&[("cookie", "session=abc")])).unwrap();
        assert!(ctx.credentials.has_user_session("store-1"));

        let ctx = RequestContext::from_headers(&headers(&[])).unwrap();
        assert!(!ctx.credentials.has_user_session("store-1"));
    }

    #[test]
    fn test_cart_ids_header() {
        let ctx = RequestContext::from_headers(&headers(&[(
            "x-cart-ids",
            r#"{"store-1": "cart-abc", "store-2": "cart-def"}"#,
        )]))
        .unwrap();
        assert_eq!(ctx.cart_id_for("store-1"), Some("cart-abc"));
        assert_eq!(ctx.cart_id_for("store-3"), None);
    }

    #[test]
    fn test_malformed_cart_ids_header_rejected() {
        let result =
            RequestContext::from_headers(&headers(&[("x-cart-ids", "not json")]));
        assert!(matches!(
            result,
            Err(GatewayError::InvalidHeader { name: "x-cart-ids", .. })
        ));
    }

    #[test]
    fn test_store_override_header() {
        let ctx = RequestContext::from_headers(&headers(&[(
            "x-marketplace-config",
            r#"[{"baseUrl": "https://other.example.com", "platform": "openfront"}]"#,
        )]))
        .unwrap();
        let stores = ctx.store_override.unwrap();
        assert_eq!(stores.len(), 1);
        assert_eq!(stores[0].base_url, "https://other.example.com");
    }

    #[test]
    fn test_with_session_token_does_not_mutate_original() {
        let creds = Credentials::new(None, None, HashMap::new());
        let scoped = creds.with_session_token("store-1", "guest_tok");
        assert!(matches!(
            creds.effective_for("store-1"),
            EffectiveCredential::None
        ));
        assert!(matches!(
            scoped.effective_for("store-1"),
            EffectiveCredential::SessionToken(_)
        ));
    }
}
