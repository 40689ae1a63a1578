//! Cross-store reconciliation after cascading mutations.
//!
//! # Responsibility
//! - Own one store per entity kind over a shared gateway.
//! - After an archive/restore, refresh every store whose kind the cascade
//!   receipt names, so no client cache keeps tombstoned entities as active.
//!
//! # Invariants
//! - The mutated kind's store is refreshed by its own `archive`/`restore`;
//!   this module refreshes the remaining affected kinds.
//! - Refresh is driven by the receipt, never by re-deriving cascade rules
//!   client-side.
//!
//! A lone [`EntityStore`] used outside a `StoreSet` does NOT get this: its
//! `archive`/`restore` refresh only itself, and downstream stores go stale
//! until their owner re-fetches them. That caller-responsibility contract is
//! the single most likely source of stale-view bugs; route cascading
//! mutations through here when more than one store is alive.

use crate::gateway::{CascadeReceipt, EntityGateway};
use crate::model::{EntityId, EntityKind, Goal, LifeArea, Note, Project, Task};
use crate::store::{EntityStore, StoreResult};
use log::info;
use std::sync::Arc;

/// One store per kind, reconciled as a unit.
///
/// Fields are public: read access and kind-specific operations go straight
/// to the member stores. Cascading mutations should go through
/// [`StoreSet::archive`]/[`StoreSet::restore`].
pub struct StoreSet<G> {
    pub life_areas: EntityStore<LifeArea, G>,
    pub goals: EntityStore<Goal, G>,
    pub projects: EntityStore<Project, G>,
    pub tasks: EntityStore<Task, G>,
    pub notes: EntityStore<Note, G>,
}

impl<G> StoreSet<G>
where
    G: EntityGateway<LifeArea>
        + EntityGateway<Goal>
        + EntityGateway<Project>
        + EntityGateway<Task>
        + EntityGateway<Note>,
{
    /// Builds five independent stores sharing one gateway handle.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            life_areas: EntityStore::new(Arc::clone(&gateway)),
            goals: EntityStore::new(Arc::clone(&gateway)),
            projects: EntityStore::new(Arc::clone(&gateway)),
            tasks: EntityStore::new(Arc::clone(&gateway)),
            notes: EntityStore::new(gateway),
        }
    }

    /// Loads every collection from the gateway.
    pub async fn fetch_all(&mut self) -> StoreResult<()> {
        self.life_areas.fetch_all().await?;
        self.goals.fetch_all().await?;
        self.projects.fetch_all().await?;
        self.tasks.fetch_all().await?;
        self.notes.fetch_all().await?;
        Ok(())
    }

    /// Archives `id` through its kind's store, then refreshes every other
    /// store the receipt names.
    ///
    /// On a refresh failure the error propagates; stores already refreshed
    /// stay refreshed, the rest keep their previous (stale) collections and
    /// their own `last_error` stays unset.
    pub async fn archive(&mut self, kind: EntityKind, id: EntityId) -> StoreResult<CascadeReceipt> {
        let receipt = match kind {
            EntityKind::LifeArea => self.life_areas.archive(id).await?,
            EntityKind::Goal => self.goals.archive(id).await?,
            EntityKind::Project => self.projects.archive(id).await?,
            EntityKind::Task => self.tasks.archive(id).await?,
            EntityKind::Note => self.notes.archive(id).await?,
        };
        self.refresh_affected(kind, &receipt).await?;
        Ok(receipt)
    }

    /// Restores `id` through its kind's store, then refreshes every other
    /// store the receipt names. Same failure behavior as [`Self::archive`].
    pub async fn restore(&mut self, kind: EntityKind, id: EntityId) -> StoreResult<CascadeReceipt> {
        let receipt = match kind {
            EntityKind::LifeArea => self.life_areas.restore(id).await?,
            EntityKind::Goal => self.goals.restore(id).await?,
            EntityKind::Project => self.projects.restore(id).await?,
            EntityKind::Task => self.tasks.restore(id).await?,
            EntityKind::Note => self.notes.restore(id).await?,
        };
        self.refresh_affected(kind, &receipt).await?;
        Ok(receipt)
    }

    async fn refresh_affected(
        &mut self,
        origin: EntityKind,
        receipt: &CascadeReceipt,
    ) -> StoreResult<()> {
        let mut refreshed = 0usize;
        for kind in receipt.affected_kinds() {
            // The origin store already re-fetched inside its own mutation.
            if kind == origin {
                continue;
            }
            match kind {
                EntityKind::LifeArea => self.life_areas.fetch_all().await?,
                EntityKind::Goal => self.goals.fetch_all().await?,
                EntityKind::Project => self.projects.fetch_all().await?,
                EntityKind::Task => self.tasks.fetch_all().await?,
                EntityKind::Note => self.notes.fetch_all().await?,
            }
            refreshed += 1;
        }
        info!(
            "event=reconcile module=reconcile status=ok origin={} changes={} refreshed_stores={refreshed}",
            origin.plural().replace(' ', "_"),
            receipt.len()
        );
        Ok(())
    }
}
