/**
 * Connection Credentials
 *
 * A credential is what a verified bearer token leaves behind once the
 * signature has been checked: the subject it was issued to and the instant
 * it stops being valid. The connection registry keeps one per live
 * connection so the expiry sweeper can evict connections whose token ran
 * out while the socket stayed open.
 */

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Opaque user identifier
pub type UserId = String;

/// Why a credential could not yield an expiry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credential has no expiry")]
    MissingExpiry,
    #[error("credential expiry {0} is out of range")]
    ExpiryOutOfRange(u64),
}

/// Verified identity attached to a live connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Subject the token was issued to
    pub subject: UserId,
    /// Raw `exp` claim (seconds since the Unix epoch)
    pub expires_at: Option<u64>,
}

impl Credential {
    pub fn new(subject: impl Into<UserId>, expires_at: u64) -> Self {
        Self {
            subject: subject.into(),
            expires_at: Some(expires_at),
        }
    }

    /// Credential expiring at the given instant
    ///
    /// Instants before the epoch cannot be represented as an `exp` claim and
    /// produce a credential without expiry.
    pub fn expiring_at(subject: impl Into<UserId>, at: DateTime<Utc>) -> Self {
        Self {
            subject: subject.into(),
            expires_at: u64::try_from(at.timestamp()).ok(),
        }
    }

    /// Absolute expiry of this credential
    pub fn expiry(&self) -> Result<DateTime<Utc>, CredentialError> {
        let exp = self.expires_at.ok_or(CredentialError::MissingExpiry)?;
        i64::try_from(exp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .ok_or(CredentialError::ExpiryOutOfRange(exp))
    }

    /// True when the credential is expired at `now` or carries no usable expiry.
    ///
    /// The boundary is inclusive: a credential expiring exactly at `now` is
    /// already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry() {
            Ok(expiry) => now >= expiry,
            Err(_) => true,
        }
    }
}
