//! Access gate for shared workstations.
//!
//! This module provides:
//! - Argon2id hashing of the unlock passphrase (PHC string format)
//! - Passphrase verification against the stored hash
//! - Time-limited session tokens issued on successful unlock
//!
//! The gate sits entirely outside the scoring core. Scoring never depends on
//! whether a session exists.
//!
//! # Security
//!
//! - Uses Argon2id (memory-hard) with a random salt per hash
//! - Session tokens are 256 bits from ChaCha20 seeded by OS entropy
//! - Tokens are zeroized on drop and never printed by `Debug`

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Session lifetime when none is configured.
pub const DEFAULT_SESSION_TTL: std::time::Duration = std::time::Duration::from_secs(30 * 60);

/// Errors raised by the access gate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("stored passphrase hash is not a valid Argon2 PHC string")]
    InvalidHash,

    #[error("invalid passphrase")]
    InvalidCredentials,

    #[error("session expired")]
    Expired,

    #[error("passphrase must not be empty")]
    EmptyPassphrase,

    #[error("session lifetime out of range")]
    InvalidTtl,

    #[error("passphrase hashing failed: {0}")]
    Hashing(String),
}

/// An unlocked session.
///
/// # Security
///
/// - Implements `ZeroizeOnDrop`: the token is erased when dropped
/// - `Debug` implementation does NOT expose the token
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Session {
    token: String,

    #[zeroize(skip)]
    issued_at: DateTime<Utc>,

    #[zeroize(skip)]
    expires_at: DateTime<Utc>,
}

impl Session {
    fn issue(now: DateTime<Utc>, ttl: chrono::Duration) -> Self {
        Self {
            token: random_token(),
            issued_at: now,
            expires_at: now + ttl,
        }
    }

    /// Opaque bearer token for this session.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Time left before expiry, zero once expired.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        (self.expires_at - now).max(chrono::Duration::zero())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Passphrase check plus session issuance.
#[derive(Debug, Clone)]
pub struct AccessGate {
    /// Argon2 PHC string, `None` when the gate is disabled
    passphrase_hash: Option<String>,
    ttl: chrono::Duration,
}

impl AccessGate {
    /// Gate that requires the passphrase matching `passphrase_hash`.
    ///
    /// # Errors
    /// Returns `InvalidHash` if the string is not a PHC hash, `InvalidTtl` if
    /// the lifetime is zero or too large to represent.
    pub fn new(
        passphrase_hash: impl Into<String>,
        ttl: std::time::Duration,
    ) -> Result<Self, AccessError> {
        let passphrase_hash = passphrase_hash.into().trim().to_string();
        PasswordHash::new(&passphrase_hash).map_err(|_| AccessError::InvalidHash)?;

        Ok(Self {
            passphrase_hash: Some(passphrase_hash),
            ttl: session_ttl(ttl)?,
        })
    }

    /// Gate with no passphrase configured: every unlock succeeds.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            passphrase_hash: None,
            ttl: chrono::Duration::seconds(DEFAULT_SESSION_TTL.as_secs() as i64),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.passphrase_hash.is_some()
    }

    /// Verify `passphrase` and issue a session.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` if the passphrase does not match.
    pub fn unlock(&self, passphrase: &str) -> Result<Session, AccessError> {
        self.unlock_at(passphrase, Utc::now())
    }

    fn unlock_at(&self, passphrase: &str, now: DateTime<Utc>) -> Result<Session, AccessError> {
        let Some(stored) = &self.passphrase_hash else {
            tracing::debug!("Access gate disabled, issuing session");
            return Ok(Session::issue(now, self.ttl));
        };

        let parsed = PasswordHash::new(stored).map_err(|_| AccessError::InvalidHash)?;

        // Parameters come from the PHC string, not from this instance.
        if Argon2::default()
            .verify_password(passphrase.as_bytes(), &parsed)
            .is_err()
        {
            tracing::warn!("Failed unlock attempt");
            return Err(AccessError::InvalidCredentials);
        }

        let session = Session::issue(now, self.ttl);
        tracing::info!("Session unlocked, expires at {}", session.expires_at);
        Ok(session)
    }

    /// Check that `session` is still valid at `now`.
    ///
    /// Sessions from a disabled gate never expire.
    ///
    /// # Errors
    /// Returns `Expired` once `now` reaches the session's expiry.
    pub fn check(&self, session: &Session, now: DateTime<Utc>) -> Result<(), AccessError> {
        if self.is_enabled() && now >= session.expires_at {
            return Err(AccessError::Expired);
        }
        Ok(())
    }
}

fn session_ttl(ttl: std::time::Duration) -> Result<chrono::Duration, AccessError> {
    if ttl.is_zero() {
        return Err(AccessError::InvalidTtl);
    }
    chrono::Duration::from_std(ttl).map_err(|_| AccessError::InvalidTtl)
}

/// Hash a passphrase with Argon2id for storage in configuration.
///
/// # Errors
/// Returns error if the passphrase is empty or hashing fails.
pub fn hash_passphrase(passphrase: &str) -> Result<String, AccessError> {
    if passphrase.is_empty() {
        return Err(AccessError::EmptyPassphrase);
    }

    let params = Params::new(47104, 1, 1, Some(32))
        .map_err(|e| AccessError::Hashing(format!("Invalid Argon2 params: {e}")))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccessError::Hashing(e.to_string()))
}

/// 256-bit hex token from a CSPRNG.
fn random_token() -> String {
    use rand::Rng;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    let mut rng = ChaCha20Rng::from_entropy();
    let mut bytes: [u8; 32] = rng.gen();
    let token = bytes.iter().map(|b| format!("{b:02x}")).collect();
    bytes.zeroize();
    token
}
