//! Builder for test bearer tokens.

use crate::crypto_fixtures::TEST_PRIVATE_KEY_PEM;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Map, Value};

/// Builder for minting test tokens.
///
/// Defaults to a well-formed RS256 token signed with the gateway's test
/// keypair, expiring one hour from now.
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new().with_tier("gold").mint();
///
/// let expired = TestTokenBuilder::new()
///     .with_tier("gold")
///     .expires_in(-3600)
///     .mint();
/// ```
pub struct TestTokenBuilder {
    claims: Map<String, Value>,
}

impl TestTokenBuilder {
    /// New builder with a one-hour expiry and no tier.
    pub fn new() -> Self {
        let mut claims = Map::new();
        claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(3600)).timestamp()),
        );
        claims.insert("iat".to_string(), json!(Utc::now().timestamp()));
        Self { claims }
    }

    /// Set the tier claim.
    pub fn with_tier(mut self, tier: &str) -> Self {
        self.claims.insert("tier".to_string(), json!(tier));
        self
    }

    /// Set an arbitrary claim (including a non-string `tier`).
    pub fn with_claim(mut self, name: &str, value: Value) -> Self {
        self.claims.insert(name.to_string(), value);
        self
    }

    /// Set expiry relative to now; negative values produce an already
    /// expired token.
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.claims.insert(
            "exp".to_string(),
            json!((Utc::now() + Duration::seconds(seconds)).timestamp()),
        );
        self
    }

    /// Set a not-before claim relative to now.
    pub fn not_before_in(mut self, seconds: i64) -> Self {
        self.claims.insert(
            "nbf".to_string(),
            json!((Utc::now() + Duration::seconds(seconds)).timestamp()),
        );
        self
    }

    /// Remove every temporal claim, leaving the token valid on signature
    /// grounds alone.
    pub fn without_temporal_claims(mut self) -> Self {
        self.claims.remove("exp");
        self.claims.remove("nbf");
        self.claims.remove("iat");
        self
    }

    /// Mint an RS256 token signed with the gateway's test private key.
    pub fn mint(self) -> String {
        self.mint_with_key(TEST_PRIVATE_KEY_PEM)
    }

    /// Mint an RS256 token signed with an arbitrary RSA private key
    /// (e.g. [`crate::OTHER_PRIVATE_KEY_PEM`] for invalid-signature tests).
    pub fn mint_with_key(self, private_key_pem: &str) -> String {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .expect("test private key should parse");
        encode(&Header::new(Algorithm::RS256), &self.claims, &key)
            .expect("test token should encode")
    }

    /// Mint an HS256 token. The gateway must reject it for its algorithm
    /// before any signature handling.
    pub fn mint_hs256(self) -> String {
        let key = EncodingKey::from_secret(b"test-shared-secret");
        encode(&Header::new(Algorithm::HS256), &self.claims, &key)
            .expect("test token should encode")
    }

    /// Build an unsigned token declaring `alg: none`, with an empty
    /// signature segment.
    pub fn mint_unsigned(self) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_string(&self.claims).expect("test claims should serialize"),
        );
        format!("{header}.{payload}.")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
