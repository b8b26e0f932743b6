//! Encode and decode use cases.

use std::sync::Arc;

use tracing::debug;

use crate::codec::Codec;
use crate::domain::entities::{NewUrl, UrlRecord};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Service turning origin URLs into short codes and back.
///
/// A code encodes the pair `[origin length, record id]`; decoding reads the
/// id from position 1 and looks the record up.
pub struct ShortenService {
    repository: Arc<dyn UrlRepository>,
    codec: Arc<Codec>,
}

impl ShortenService {
    /// Creates a new shorten service.
    pub fn new(repository: Arc<dyn UrlRepository>, codec: Arc<Codec>) -> Self {
        Self { repository, codec }
    }

    pub fn repository(&self) -> &Arc<dyn UrlRepository> {
        &self.repository
    }

    /// Finds or stores `origin_url` and returns its code.
    ///
    /// The same origin URL always yields the same code because its record id
    /// is stable and the codec is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage or encoding failures.
    pub async fn encode(&self, origin_url: &str) -> Result<String, AppError> {
        let record = match self.repository.find_by_origin_url(origin_url).await? {
            Some(existing) => existing,
            None => {
                self.repository
                    .create(NewUrl {
                        origin_url: origin_url.to_string(),
                    })
                    .await?
            }
        };

        self.code_for(&record)
    }

    /// Computes the code for a stored record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] for a negative id or an encoding failure.
    pub fn code_for(&self, record: &UrlRecord) -> Result<String, AppError> {
        let id = u64::try_from(record.id)
            .map_err(|_| AppError::internal(format!("Invalid record id {}", record.id)))?;

        self.codec
            .encode(&[record.origin_length(), id])
            .map_err(|e| AppError::internal(e.to_string()))
    }

    /// Resolves a code to its stored record.
    ///
    /// A code that does not decode to exactly `[length, id]` is reported the
    /// same way as a well-formed code with no record behind it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for undecodable or unknown codes and
    /// [`AppError::Internal`] on storage errors.
    pub async fn decode(&self, code: &str) -> Result<UrlRecord, AppError> {
        let id = match self.codec.decode(code).as_deref() {
            Some(&[_length, id]) => id,
            _ => {
                debug!(code, "Code did not decode to a record id");
                return Err(AppError::record_not_found());
            }
        };

        let id = i64::try_from(id).map_err(|_| AppError::record_not_found())?;

        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::record_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Alphabet, DEFAULT_MIN_LENGTH};
    use crate::domain::repositories::MockUrlRepository;
    use chrono::Utc;

    fn record(id: i64, url: &str) -> UrlRecord {
        UrlRecord::new(id, url.to_string(), Utc::now(), Utc::now())
    }

    fn codec() -> Codec {
        Codec::new(Alphabet::default(), DEFAULT_MIN_LENGTH).unwrap()
    }

    fn service(repo: MockUrlRepository) -> ShortenService {
        ShortenService::new(Arc::new(repo), Arc::new(codec()))
    }

    #[tokio::test]
    async fn test_encode_creates_new_record() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_origin_url()
            .times(1)
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|new_url| new_url.origin_url == "https://www.example.com")
            .times(1)
            .returning(|new_url| Ok(record(1, &new_url.origin_url)));

        let code = service(repo).encode("https://www.example.com").await.unwrap();

        assert!(code.len() >= 6);
        assert_eq!(
            codec().decode(&code),
            Some(vec!["https://www.example.com".len() as u64, 1])
        );
    }

    #[tokio::test]
    async fn test_encode_reuses_existing_record() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_origin_url()
            .times(2)
            .returning(|url| Ok(Some(record(5, url))));
        repo.expect_create().times(0);

        let service = service(repo);
        let first = service.encode("https://www.example.com").await.unwrap();
        let second = service.encode("https://www.example.com").await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_encode_surfaces_storage_failure() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_origin_url()
            .times(1)
            .returning(|_| Err(AppError::internal("Unexpected error")));

        let err = service(repo)
            .encode("https://www.example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
        assert_eq!(err.to_string(), "Unexpected error");
    }

    #[tokio::test]
    async fn test_decode_returns_record() {
        let stored = record(42, "https://www.example.com");
        let code = codec().encode(&[stored.origin_length(), 42]).unwrap();

        let mut repo = MockUrlRepository::new();
        let found = stored.clone();
        repo.expect_find_by_id()
            .withf(|id| *id == 42)
            .times(1)
            .returning(move |_| Ok(Some(found.clone())));

        let result = service(repo).decode(&code).await.unwrap();
        assert_eq!(result, stored);
    }

    #[tokio::test]
    async fn test_decode_unknown_id_is_not_found() {
        let code = codec().encode(&[20, 7]).unwrap();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_id().times(1).returning(|_| Ok(None));

        let err = service(repo).decode(&code).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(err.to_string(), "Record not found");
    }

    #[tokio::test]
    async fn test_decode_garbage_skips_lookup() {
        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_id().times(0);

        let service = service(repo);
        for code in ["", "nonexist", "invalidcode#", "zzzz99"] {
            let err = service.decode(code).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }), "{code}");
        }
    }

    #[tokio::test]
    async fn test_decode_wrong_arity_is_not_found() {
        let codec = codec();
        let single = codec.encode(&[7]).unwrap();
        let triple = codec.encode(&[1, 2, 3]).unwrap();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_id().times(0);

        let service = service(repo);
        assert!(service.decode(&single).await.is_err());
        assert!(service.decode(&triple).await.is_err());
    }

    #[tokio::test]
    async fn test_decode_id_beyond_i64_is_not_found() {
        let code = codec().encode(&[10, u64::MAX]).unwrap();

        let mut repo = MockUrlRepository::new();
        repo.expect_find_by_id().times(0);

        let err = service(repo).decode(&code).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }
}
