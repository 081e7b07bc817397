//! Opaque identifiers used throughout the hub.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Opaque user identifier, supplied by the pre-authenticated caller.
///
/// The hub never interprets this value; it only uses it as a map key
/// for the per-user connection quota and for routing control events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw user id string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Opaque page-key identifier: an HMAC over a canonical URL, computed by
/// the client under the user's data-encryption key.
///
/// The hub treats this as an uninterpreted fan-out discriminator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageKey(String);

impl PageKey {
    /// Wrap a raw page-key string.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the underlying string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The backplane channel name this page key is fanned out on.
    #[must_use]
    pub fn channel(&self) -> String {
        format!("page:{}", self.0)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PageKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for PageKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Process-local session identifier, issued by the hub on admission.
///
/// Unlike [`UserId`] and [`PageKey`], a `SessionId` is never supplied by
/// a caller — it is generated fresh for every live connection so that
/// hub-internal indices have a cheap, `Copy` key to compare by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate the next session id from a process-wide counter.
    ///
    /// Starts at 1 so that `0` is never a valid, live session id and can
    /// be used as a sentinel in adjacent code if needed.
    #[must_use]
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw numeric value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}
