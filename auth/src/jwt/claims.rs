use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a bearer token.
///
/// A token encodes exactly the subject's identity and its validity window.
/// No other data is embedded, so tokens stay stateless and independently
/// verifiable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject expiring `ttl_hours` from now.
    pub fn for_subject(subject: impl ToString, ttl_hours: i64) -> Self {
        let now = Utc::now();
        let expiry = now + Duration::hours(ttl_hours);

        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_subject_sets_validity_window() {
        let claims = Claims::for_subject("user123", 1);

        assert_eq!(claims.sub, "user123");
        assert_eq!(claims.exp - claims.iat, 60 * 60); // 1 hour
    }
}
