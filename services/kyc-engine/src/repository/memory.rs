use super::{Page, Repository, RepositoryProvider};
use crate::errors::Result;
use crate::models::Entity;
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Process-local repository. Backs the `memory` storage mode and the tests.
pub struct InMemoryRepository<E> {
    records: RwLock<HashMap<Uuid, E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        InMemoryRepository {
            records: RwLock::new(HashMap::new()),
        }
    }

    fn paged<'a>(records: impl Iterator<Item = &'a E>, page: Page) -> Vec<E> {
        let mut sorted: Vec<E> = records.cloned().collect();
        sorted.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(&b.id()))
        });

        let offset = usize::try_from(page.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        sorted.into_iter().skip(offset).take(limit).collect()
    }
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<E>> {
        Ok(self.records.read().get(&id).cloned())
    }

    async fn find_all(&self, page: Page) -> Result<Vec<E>> {
        let records = self.records.read();
        Ok(Self::paged(records.values(), page))
    }

    async fn find_by_owner(&self, owner_id: Uuid, page: Page) -> Result<Vec<E>> {
        let records = self.records.read();
        Ok(Self::paged(
            records.values().filter(|e| e.owner_id() == owner_id),
            page,
        ))
    }

    async fn find_primary(&self, owner_id: Uuid) -> Result<Option<E>> {
        let records = self.records.read();
        Ok(records
            .values()
            .find(|e| e.owner_id() == owner_id && e.is_primary())
            .cloned())
    }

    async fn count_by_owner(&self, owner_id: Uuid) -> Result<i64> {
        let records = self.records.read();
        Ok(records.values().filter(|e| e.owner_id() == owner_id).count() as i64)
    }

    async fn save(&self, entity: &E) -> Result<()> {
        self.records.write().insert(entity.id(), entity.clone());
        Ok(())
    }

    async fn save_primary(&self, entity: &E) -> Result<Vec<Uuid>> {
        let now = Utc::now();
        let mut records = self.records.write();

        let mut demoted = Vec::new();
        for record in records.values_mut() {
            if record.id() != entity.id()
                && record.owner_id() == entity.owner_id()
                && record.is_primary()
            {
                record.set_primary(false);
                record.touch(now);
                demoted.push(record.id());
            }
        }

        records.insert(entity.id(), entity.clone());
        debug!(
            "Saved primary {} {} (demoted {})",
            E::KIND,
            entity.id(),
            demoted.len()
        );
        Ok(demoted)
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        Ok(self.records.write().remove(&id).is_some())
    }
}

/// Keeps one [`InMemoryRepository`] per entity type so every service asking
/// for the same entity shares its records.
#[derive(Default)]
pub struct InMemoryProvider {
    repositories: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryProvider {
    fn repository<E: Entity>(&self) -> Arc<dyn Repository<E>> {
        let mut repositories = self.repositories.lock();
        let slot = repositories.entry(TypeId::of::<E>()).or_insert_with(|| {
            let repository: Arc<dyn Repository<E>> = Arc::new(InMemoryRepository::<E>::new());
            Box::new(repository)
        });

        match slot.downcast_ref::<Arc<dyn Repository<E>>>() {
            Some(repository) => repository.clone(),
            // Entries are keyed by the entity's TypeId, so the cast always holds
            None => Arc::new(InMemoryRepository::<E>::new()),
        }
    }
}
