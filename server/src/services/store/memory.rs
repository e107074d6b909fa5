use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{RegistrantStore, StoreError};
use crate::models::registrant::{NewRegistrant, Registrant};

/// Process-local store. Lookup and insert share one lock, so duplicate
/// rejection is exact.
#[derive(Default)]
pub struct InMemoryRegistrantStore {
    rows: Mutex<Vec<Registrant>>,
}

impl InMemoryRegistrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.lock().await.is_empty()
    }
}

#[async_trait]
impl RegistrantStore for InMemoryRegistrantStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Registrant>, StoreError> {
        let rows = self.rows.lock().await;
        Ok(rows.iter().find(|r| r.email == email).cloned())
    }

    async fn insert(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        let stored = record.into_registrant(Uuid::new_v4(), Utc::now());
        self.rows.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn submit(&self, record: NewRegistrant) -> Result<Registrant, StoreError> {
        let mut rows = self.rows.lock().await;
        if rows.iter().any(|r| r.email == record.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let stored = record.into_registrant(Uuid::new_v4(), Utc::now());
        rows.push(stored.clone());
        Ok(stored)
    }
}
