//! Request identifiers

use std::fmt;

/// Unique identifier for one extraction request, based on UUIDv7
///
/// UUIDv7 sorts chronologically, which keeps log lines from the same
/// process in request order when grouped by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u128);

impl RequestId {
    /// Generate a new UUIDv7-based RequestId
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// assert_ne!(id, RequestId::new());
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Parse a RequestId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use sift_domain::RequestId;
    ///
    /// let id = RequestId::new();
    /// let parsed = RequestId::from_string(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid request id: {}", e))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}
