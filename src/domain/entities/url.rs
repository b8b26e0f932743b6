//! Shortened URL record.

use chrono::{DateTime, Utc};

/// A stored origin URL and its identifier.
///
/// The short code is never stored: it is derived from
/// `(origin_url length, id)` by the codec on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub id: i64,
    pub origin_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        origin_url: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            origin_url,
            created_at,
            updated_at,
        }
    }

    /// Length of the origin URL in characters, the first value of the
    /// encoded pair.
    pub fn origin_length(&self) -> u64 {
        self.origin_url.chars().count() as u64
    }
}

/// Input data for storing a new origin URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrl {
    pub origin_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_record_creation() {
        let now = Utc::now();
        let record = UrlRecord::new(7, "https://www.example.com".to_string(), now, now);

        assert_eq!(record.id, 7);
        assert_eq!(record.origin_url, "https://www.example.com");
        assert_eq!(record.created_at, now);
    }

    #[test]
    fn test_origin_length_counts_characters() {
        let now = Utc::now();
        let ascii = UrlRecord::new(1, "https://a.io".to_string(), now, now);
        let unicode = UrlRecord::new(2, "https://пример.рф".to_string(), now, now);

        assert_eq!(ascii.origin_length(), 12);
        assert_eq!(unicode.origin_length(), 17);
    }
}
