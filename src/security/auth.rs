//! Verification of signed web-app payloads.
//!
//! The Telegram WebApp front-end signs every `initData` payload with
//! HMAC-SHA256 keyed off the bot token. This module is the trust boundary:
//! everything downstream trusts the [`Identity`] recovered here and performs
//! no further authorization checks.

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Domain-separation constant fixed by Telegram's WebApp signing scheme.
const KEY_DOMAIN: &[u8] = b"WebAppData";

/// Payloads whose `auth_date` is older than this are replayable captures.
pub const FRESHNESS_WINDOW_SECS: i64 = 24 * 60 * 60;

/// Why verification failed. The HTTP layer collapses every variant into an
/// opaque 403 so callers learn nothing about which check tripped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("payload has no hash field")]
    MissingHash,
    #[error("payload is stale")]
    Expired,
    #[error("signature mismatch")]
    BadSignature,
    #[error("user identity missing or malformed")]
    MalformedIdentity,
}

/// The authenticated caller, decoded from the signed `user` field.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Verifies an inbound payload and recovers the caller's identity.
///
/// Kept behind a trait so the HMAC scheme is one pluggable implementation
/// and handler tests can substitute a stub verifier.
pub trait RequestAuthenticator: Send + Sync {
    fn authenticate(&self, payload: &str) -> Result<Identity, AuthError>;
}

/// Concrete verifier for Telegram WebApp `initData` payloads.
pub struct InitDataVerifier {
    secret_key: Vec<u8>,
}

impl InitDataVerifier {
    /// Derives the long-lived secret key: `HMAC-SHA256("WebAppData", bot_token)`.
    ///
    /// HMAC accepts keys of any length, so derivation cannot actually fail;
    /// should that ever change, the empty fallback key makes every
    /// verification fail closed with a signature mismatch.
    pub fn new(bot_token: &str) -> Self {
        let secret_key = HmacSha256::new_from_slice(KEY_DOMAIN)
            .map(|mut mac| {
                mac.update(bot_token.as_bytes());
                mac.finalize().into_bytes().to_vec()
            })
            .unwrap_or_default();
        Self { secret_key }
    }

    /// Like [`RequestAuthenticator::authenticate`] with an injectable clock,
    /// so freshness checks are testable without waiting.
    pub fn authenticate_at(&self, payload: &str, now_unix: i64) -> Result<Identity, AuthError> {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        let mut supplied_hash = None;
        for field in payload.split('&') {
            let Some((key, value)) = field.split_once('=') else {
                continue;
            };
            if key == "hash" {
                supplied_hash = Some(value);
            } else {
                pairs.push((key, value));
            }
        }
        let supplied_hash = supplied_hash.ok_or(AuthError::MissingHash)?;

        let auth_date: i64 = pairs
            .iter()
            .find(|(k, _)| *k == "auth_date")
            .and_then(|(_, v)| v.parse().ok())
            .unwrap_or(0);
        if now_unix - auth_date > FRESHNESS_WINDOW_SECS {
            debug!("rejecting stale payload");
            return Err(AuthError::Expired);
        }

        pairs.sort_by_key(|(k, _)| *k);
        let check_string = pairs
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");

        let Ok(mut mac) = HmacSha256::new_from_slice(&self.secret_key) else {
            return Err(AuthError::BadSignature);
        };
        mac.update(check_string.as_bytes());
        let supplied = hex::decode(supplied_hash).map_err(|_| AuthError::BadSignature)?;
        // verify_slice is a constant-time comparison.
        mac.verify_slice(&supplied)
            .map_err(|_| AuthError::BadSignature)?;

        let user_json = pairs
            .iter()
            .find(|(k, _)| *k == "user")
            .map(|(_, v)| urlencoding::decode(v).unwrap_or_else(|_| (*v).into()))
            .ok_or(AuthError::MalformedIdentity)?;
        serde_json::from_str(&user_json).map_err(|_| AuthError::MalformedIdentity)
    }
}

impl RequestAuthenticator for InitDataVerifier {
    fn authenticate(&self, payload: &str) -> Result<Identity, AuthError> {
        self.authenticate_at(payload, Utc::now().timestamp())
    }
}
