//! Client-side entity store: one cached collection per entity kind.
//!
//! # Responsibility
//! - Hold the client-visible collection of one kind plus selection, loading
//!   flag, and last error.
//! - Offer a uniform action surface over the gateway and pure derived views.
//!
//! # Invariants
//! - A failed fetch leaves the previous collection untouched.
//! - A failed mutation leaves the collection untouched and propagates.
//! - The loading flag is per-store, not per-operation, and is always
//!   cleared when an operation finishes.
//!
//! Cascades never run here; `archive`/`restore` re-fetch this store and
//! hand the receipt to the caller. Archiving through a lone store leaves
//! every downstream store stale — use [`crate::reconcile::StoreSet`] when a
//! consistent cross-kind view matters.

use crate::gateway::{CascadeReceipt, EntityGateway, GatewayError};
use crate::model::{Entity, EntityId};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod kinds;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store-level failure: a human-readable message plus the gateway cause.
#[derive(Debug)]
pub struct StoreError {
    message: String,
    cause: GatewayError,
}

impl StoreError {
    fn new(message: String, cause: GatewayError) -> Self {
        Self { message, cause }
    }

    /// The message also recorded as the store's `last_error`.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cause(&self) -> &GatewayError {
        &self.cause
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.cause)
    }
}

/// Cache and action surface for one entity kind.
///
/// Generic over the gateway so tests can substitute failing doubles. There
/// is no interior locking: `&mut self` receivers serialize operations per
/// instance, and separate stores share nothing.
pub struct EntityStore<E: Entity, G> {
    gateway: Arc<G>,
    items: Vec<E>,
    selected_id: Option<EntityId>,
    loading: bool,
    last_error: Option<String>,
}

impl<E: Entity, G> EntityStore<E, G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            items: Vec::new(),
            selected_id: None,
            loading: false,
            last_error: None,
        }
    }

    /// The full cached collection, tombstones included.
    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn selected_id(&self) -> Option<EntityId> {
        self.selected_id
    }

    /// Pure local state; selecting an id absent from the collection is
    /// legal and simply yields no selected item.
    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected_id = id;
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
    }

    pub fn selected_item(&self) -> Option<&E> {
        let id = self.selected_id?;
        self.items.iter().find(|item| item.id() == id)
    }

    /// Entities with `archived_at` unset.
    pub fn active(&self) -> Vec<&E> {
        self.items.iter().filter(|item| item.is_active()).collect()
    }

    /// Tombstoned entities.
    pub fn archived(&self) -> Vec<&E> {
        self.items.iter().filter(|item| !item.is_active()).collect()
    }

    /// Groups parented entities by parent id, preserving first-seen order
    /// of both keys and members.
    pub fn by_parent(&self) -> Vec<(EntityId, Vec<&E>)> {
        let mut groups: Vec<(EntityId, Vec<&E>)> = Vec::new();
        for item in &self.items {
            let Some(parent_id) = item.parent_id() else {
                continue;
            };
            match groups.iter_mut().find(|(key, _)| *key == parent_id) {
                Some((_, members)) => members.push(item),
                None => groups.push((parent_id, vec![item])),
            }
        }
        groups
    }

    fn record_error(&mut self, message: String, cause: GatewayError) -> StoreError {
        warn!(
            "event=store_error module=store kind={} error={cause}",
            E::KIND.plural().replace(' ', "_")
        );
        self.last_error = Some(message.clone());
        StoreError::new(message, cause)
    }

    fn replace_in_place(&mut self, entity: E) {
        if let Some(slot) = self
            .items
            .iter_mut()
            .find(|item| item.id() == entity.id())
        {
            *slot = entity;
        }
    }
}

impl<E: Entity, G: EntityGateway<E>> EntityStore<E, G> {
    /// Replaces the collection with the authoritative list.
    ///
    /// On failure the previous collection stays in place and `last_error`
    /// is set to a kind-specific message.
    pub async fn fetch_all(&mut self) -> StoreResult<()> {
        self.loading = true;
        let outcome = self.gateway.get_all().await;
        self.loading = false;
        match outcome {
            Ok(items) => {
                self.items = items;
                self.last_error = None;
                Ok(())
            }
            Err(cause) => Err(self.record_error(
                format!("Failed to fetch {}", E::KIND.plural()),
                cause,
            )),
        }
    }

    /// Narrows the collection to children of one parent.
    pub async fn fetch_by_parent(&mut self, parent_id: EntityId) -> StoreResult<()> {
        self.loading = true;
        let outcome = self.gateway.get_by_parent(parent_id).await;
        self.loading = false;
        match outcome {
            Ok(items) => {
                self.items = items;
                self.last_error = None;
                Ok(())
            }
            Err(cause) => Err(self.record_error(
                format!("Failed to fetch {}", E::KIND.plural()),
                cause,
            )),
        }
    }

    /// Creates through the gateway and appends the returned entity.
    pub async fn create(&mut self, payload: E::CreatePayload) -> StoreResult<E> {
        let outcome = self.gateway.create(payload).await;
        match outcome {
            Ok(entity) => {
                self.items.push(entity.clone());
                self.last_error = None;
                Ok(entity)
            }
            Err(cause) => Err(self.record_error(
                format!("Failed to create {}", E::KIND.singular()),
                cause,
            )),
        }
    }

    /// Updates through the gateway and replaces the matching entity in
    /// place. An entity absent from the narrowed collection stays absent.
    pub async fn update(&mut self, id: EntityId, payload: E::UpdatePayload) -> StoreResult<E> {
        let outcome = self.gateway.update(id, payload).await;
        match outcome {
            Ok(entity) => {
                self.replace_in_place(entity.clone());
                self.last_error = None;
                Ok(entity)
            }
            Err(cause) => Err(self.record_error(
                format!("Failed to update {}", E::KIND.singular()),
                cause,
            )),
        }
    }

    /// Archives through the gateway, then re-fetches this store.
    ///
    /// Only this store is refreshed. The cascade may have tombstoned
    /// entities of other kinds — the returned receipt says which; callers
    /// owning downstream stores must refresh them (or go through
    /// [`crate::reconcile::StoreSet::archive`], which does it for them).
    pub async fn archive(&mut self, id: EntityId) -> StoreResult<CascadeReceipt> {
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        let outcome = self.gateway.archive(id).await;
        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(cause) => {
                return Err(self.record_error(
                    format!("Failed to archive {}", E::KIND.singular()),
                    cause,
                ))
            }
        };
        self.fetch_all().await?;
        Ok(receipt)
    }

    /// Restores through the gateway, then re-fetches this store. Same
    /// cross-store caveat as [`Self::archive`].
    pub async fn restore(&mut self, id: EntityId) -> StoreResult<CascadeReceipt> {
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        let outcome = self.gateway.restore(id).await;
        let receipt = match outcome {
            Ok(receipt) => receipt,
            Err(cause) => {
                return Err(self.record_error(
                    format!("Failed to restore {}", E::KIND.singular()),
                    cause,
                ))
            }
        };
        self.fetch_all().await?;
        Ok(receipt)
    }
}
