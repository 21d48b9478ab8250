//! Certification repository behind the data endpoint.
//!
//! There is no persistence: [`MemoryRepository`] answers every id with the
//! demonstration certification, except ids explicitly marked missing.

use std::collections::HashSet;

use lawva_core::model::{self, Certification};

/// Errors from certification lookups.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No certification exists under this id.
    #[error("certification {id} not found")]
    NotFound { id: i64 },
}

/// Read access to stored certifications.
#[async_trait::async_trait]
pub trait CertificationRepository: Send + Sync + 'static {
    /// Look up one certification.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::NotFound`] if the id is unknown.
    async fn get(&self, id: i64) -> Result<Certification, RepositoryError>;
}

/// In-memory mock repository.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    missing: HashSet<i64>,
}

impl MemoryRepository {
    /// A repository that reports the given ids as missing.
    pub fn with_missing(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            missing: ids.into_iter().collect(),
        }
    }
}

#[async_trait::async_trait]
impl CertificationRepository for MemoryRepository {
    async fn get(&self, id: i64) -> Result<Certification, RepositoryError> {
        if self.missing.contains(&id) {
            return Err(RepositoryError::NotFound { id });
        }
        Ok(model::sample(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn any_id_resolves_to_the_sample() {
        let repo = MemoryRepository::default();
        let cert = repo.get(42).await.unwrap();
        assert_eq!(cert.id, 42);
        assert_eq!(cert.title, "계약 이행 증명서");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let repo = MemoryRepository::with_missing([7]);
        assert!(matches!(
            repo.get(7).await,
            Err(RepositoryError::NotFound { id: 7 })
        ));
    }

    #[tokio::test]
    async fn only_listed_ids_are_missing() {
        let repo = MemoryRepository::with_missing([7, 9]);
        assert!(repo.get(7).await.is_err());
        assert!(repo.get(9).await.is_err());
        assert_eq!(repo.get(8).await.unwrap().id, 8);
    }
}
