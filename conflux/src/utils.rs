//! Correlation token and timestamp helpers.

use chrono::Utc;
use uuid::Uuid;

/// Generates a fresh correlation token.
///
/// # Examples
///
/// ```
/// use conflux::utils::correlation_token;
///
/// let token = correlation_token();
/// assert_eq!(token.len(), 36);
/// ```
#[must_use]
pub fn correlation_token() -> String {
    Uuid::new_v4().to_string()
}

/// Returns the current UTC time as an ISO-8601 string.
#[must_use]
pub fn iso_timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S%.6f+00:00").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique() {
        assert_ne!(correlation_token(), correlation_token());
    }

    #[test]
    fn timestamp_looks_like_iso() {
        let ts = iso_timestamp();
        assert!(ts.contains('T'));
        assert!(ts.ends_with("+00:00"));
    }
}
