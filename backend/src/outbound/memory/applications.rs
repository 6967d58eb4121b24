//! In-memory `ApplicationRepository`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::ports::{ApplicationRepository, ApplicationRepositoryError};
use crate::domain::{ApplicationId, ApplicationRecord};

/// Applications held in insertion order.
#[derive(Debug, Default)]
pub struct MemoryApplicationRepository {
    rows: RwLock<Vec<ApplicationRecord>>,
}

impl MemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ApplicationRepository for MemoryApplicationRepository {
    async fn insert(&self, record: &ApplicationRecord) -> Result<(), ApplicationRepositoryError> {
        let mut rows = self.rows.write().await;
        if rows.iter().any(|row| row.id() == record.id()) {
            return Err(ApplicationRepositoryError::query(format!(
                "application {} already exists",
                record.id()
            )));
        }
        rows.push(record.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &ApplicationId,
    ) -> Result<Option<ApplicationRecord>, ApplicationRepositoryError> {
        let rows = self.rows.read().await;
        Ok(rows.iter().find(|row| row.id() == *id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ApplicationRecord>, ApplicationRepositoryError> {
        let mut all = self.rows.read().await.clone();
        all.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(all)
    }

    async fn update_workflow(
        &self,
        record: &ApplicationRecord,
        expected_updated_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApplicationRepositoryError> {
        let mut rows = self.rows.write().await;
        let Some(stored) = rows.iter_mut().find(|row| row.id() == record.id()) else {
            return Err(ApplicationRepositoryError::not_found(record.id().to_string()));
        };
        if expected_updated_at.is_some_and(|expected| stored.updated_at() != expected) {
            return Err(ApplicationRepositoryError::stale(record.id().to_string()));
        }
        *stored = record.clone();
        Ok(())
    }
}
