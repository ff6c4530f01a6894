//! Session token codec
//!
//! HMAC-signed (HS256) token issuance and verification. Stateless after
//! construction and safe for unlimited concurrent calls; revocation
//! awareness is layered on by the session store and the gateway.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode,
};

use crate::auth::types::{Claims, Role, TokenConfig, TokenPair};
use crate::error::{ApiError, Result};

/// Outcome of verifying a token's signature and structure.
///
/// Expiry is reported as data rather than an error so callers that need the
/// claims of an expired token (logout computing the revocation TTL) can
/// still read them. A signature or format failure is the only error case.
#[derive(Debug, Clone)]
pub struct Verification {
    /// Decoded claims, trustworthy because the signature checked out
    pub claims: Claims,
    /// Whether the embedded expiry has passed
    pub expired: bool,
}

/// Issues and verifies signed session tokens
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    config: TokenConfig,
}

impl TokenCodec {
    /// Create a codec from configuration
    pub fn new(config: TokenConfig) -> Result<Self> {
        if config.secret.len() < 32 {
            return Err(crate::config_error!(
                "tokens.secret must be at least 32 bytes"
            ));
        }

        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        // Expiry is checked explicitly in `verify` so that claims survive
        // decoding an expired token.
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            config,
        })
    }

    /// Issue a signed token with the given TTL
    pub fn issue(&self, user_id: i32, email: &str, role: Role, ttl_secs: i64) -> Result<String> {
        let claims = Claims::new(user_id, email.to_string(), role, &self.config.issuer, ttl_secs);

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| ApiError::internal_with_source("token generation failed", e))
    }

    /// Issue an access + refresh pair for one account
    pub fn issue_pair(&self, user_id: i32, email: &str, role: Role) -> Result<TokenPair> {
        let access_token = self.issue(user_id, email, role, self.config.access_ttl_secs)?;
        let refresh_token = self.issue(user_id, email, role, self.config.refresh_ttl_secs)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_ttl_secs,
        })
    }

    /// Verify signature and structure, reporting expiry as data
    pub fn verify(&self, token: &str) -> Result<Verification> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding_key, &self.validation)
            .map_err(|e| ApiError::unauthorized_with_source("token validation failed", e))?;

        let claims = token_data.claims;
        let expired = claims.is_expired();

        Ok(Verification { claims, expired })
    }

    /// Refresh token TTL from configuration
    #[must_use]
    pub const fn refresh_ttl_secs(&self) -> i64 {
        self.config.refresh_ttl_secs
    }
}
