//! Generic persistence for every entity in [`crate::models`].

use crate::errors::Result;
use crate::models::Entity;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryProvider, InMemoryRepository};
pub use postgres::{PgRepository, PostgresProvider};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub fn new(limit: i64, offset: i64) -> Self {
        Page {
            limit: limit.max(0),
            offset: offset.max(0),
        }
    }

    pub fn all() -> Self {
        Page {
            limit: i64::MAX,
            offset: 0,
        }
    }
}

/// Storage operations shared by all entities. Listings are ordered by
/// creation time, then id.
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>>;

    async fn find_all(&self, page: Page) -> Result<Vec<E>>;

    async fn find_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<E>>;

    async fn find_primary(&self, owner_id: Uuid) -> Result<Option<E>>;

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64>;

    /// Insert or replace by id.
    async fn save(&self, entity: &E) -> Result<()>;

    /// Saves a record flagged primary and un-flags every other primary record
    /// of the same owner in one atomic step. Returns the demoted ids.
    async fn save_primary(&self, entity: &E) -> Result<Vec<Uuid>>;

    /// Returns whether a record was removed.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Hands out a repository per entity type for one storage backend.
pub trait RepositoryProvider {
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>>;
}
