// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator authentication: password verification and access tokens.
//!
//! Operators are loaded once at startup and are immutable for the life of the
//! process. Tokens are stateless HS256 JWTs, so validation needs no locks and
//! no I/O and can run on every request. There is no revocation channel; a
//! token dies only by reaching its expiry.

use std::collections::HashMap;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::config::GatewayConfig;
use crate::error::GatewayError;

/// An operator identity attached to authenticated requests.
#[derive(Debug, Clone, Serialize)]
pub struct Operator {
    pub username: String,
    pub role: String,
}

/// One record from the operators file. The hash is a PHC-format argon2
/// string and never leaves this module.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorRecord {
    pub username: String,
    pub password_hash: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "admin".to_owned()
}

/// On-disk operators file: `{"operators": [...]}`.
#[derive(Debug, Deserialize)]
struct OperatorsFile {
    operators: Vec<OperatorRecord>,
}

/// Claims carried by an access token. Times are epoch seconds.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: u64,
    exp: u64,
}

/// Verifies operator credentials and mints/validates access tokens.
pub struct Authenticator {
    operators: HashMap<String, OperatorRecord>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl_secs: u64,
}

impl Authenticator {
    pub fn new(records: Vec<OperatorRecord>, secret: &[u8], token_ttl_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Default leeway is 60s; expiry must be exact so a token minted for
        // 60 minutes is dead at 60 minutes.
        validation.leeway = 0;
        let operators = records.into_iter().map(|r| (r.username.clone(), r)).collect();
        Self {
            operators,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl_secs,
        }
    }

    /// Build an authenticator from config.
    ///
    /// Loads the operators file when one is given, otherwise falls back to a
    /// bootstrap `admin` operator. Without a configured secret, a random
    /// per-process one is generated.
    pub fn from_config(config: &GatewayConfig) -> anyhow::Result<Self> {
        let records = match config.operators_file {
            Some(ref path) => {
                let contents = std::fs::read_to_string(path)?;
                let file: OperatorsFile = serde_json::from_str(&contents)?;
                anyhow::ensure!(!file.operators.is_empty(), "operators file lists no operators");
                file.operators
            }
            None => {
                tracing::warn!("no operators file configured, using bootstrap admin/admin");
                vec![bootstrap_admin()?]
            }
        };

        let secret = match config.token_secret {
            Some(ref s) => s.as_bytes().to_vec(),
            None => {
                let mut buf = vec![0u8; 32];
                rand::rng().fill_bytes(&mut buf);
                buf
            }
        };

        Ok(Self::new(records, &secret, config.token_ttl_secs()))
    }

    /// Verify credentials and mint a signed access token.
    ///
    /// An unknown username and a wrong password produce the same error.
    pub fn login(&self, username: &str, password: &str) -> Result<String, GatewayError> {
        let record = self.operators.get(username).ok_or(GatewayError::InvalidCredentials)?;
        let parsed = PasswordHash::new(&record.password_hash)
            .map_err(|_| GatewayError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| GatewayError::InvalidCredentials)?;

        let now = epoch_secs();
        let claims =
            Claims { sub: record.username.clone(), iat: now, exp: now + self.token_ttl_secs };
        jsonwebtoken::encode(&jsonwebtoken::Header::default(), &claims, &self.encoding_key)
            .map_err(|_| GatewayError::Internal)
    }

    /// Validate a presented token and resolve its operator.
    ///
    /// Bad signature, malformed payload, an expired token, and an unknown
    /// subject all collapse into `InvalidToken`; the caller learns nothing
    /// about which check failed.
    pub fn authenticate(&self, token: &str) -> Result<Operator, GatewayError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| GatewayError::InvalidToken)?;
        let record = self.operators.get(&data.claims.sub).ok_or(GatewayError::InvalidToken)?;
        Ok(Operator { username: record.username.clone(), role: record.role.clone() })
    }
}

/// Built-in `admin`/`admin` operator used when no operators file is
/// configured.
fn bootstrap_admin() -> anyhow::Result<OperatorRecord> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(b"admin", &salt)
        .map_err(|e| anyhow::anyhow!("hash bootstrap password: {e}"))?;
    Ok(OperatorRecord {
        username: "admin".to_owned(),
        password_hash: hash.to_string(),
        role: "admin".to_owned(),
    })
}

fn epoch_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
