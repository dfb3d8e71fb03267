//! OAuth access-token expiry bookkeeping. Token acquisition and refresh
//! happen outside this crate; the client only needs to know whether the
//! token it was handed is still usable.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};

#[derive(Clone, Debug)]
pub struct AccessToken {
    token: SecretString,
    obtained_at: DateTime<Utc>,
    expires_in_secs: i64,
}

impl AccessToken {
    pub fn new(token: SecretString, obtained_at: DateTime<Utc>, expires_in_secs: i64) -> Self {
        Self { token, obtained_at, expires_in_secs }
    }

    pub fn issued_now(token: SecretString, expires_in_secs: i64) -> Self {
        Self::new(token, Utc::now(), expires_in_secs)
    }

    pub fn expose(&self) -> &str {
        self.token.expose_secret()
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.seconds_until_expiry_at(now) == 0
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn seconds_until_expiry_at(&self, now: DateTime<Utc>) -> i64 {
        let age = (now - self.obtained_at).num_seconds();
        (self.expires_in_secs - age).max(0)
    }

    pub fn seconds_until_expiry(&self) -> i64 {
        self.seconds_until_expiry_at(Utc::now())
    }
}
