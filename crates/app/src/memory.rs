//! In-memory Collaborators
//!
//! Catalog and promotion store kept in process memory. Every write builds a new collection
//! and swaps it in whole, so readers holding the previous `Arc` never see a partial update.

use std::sync::Arc;

use async_trait::async_trait;
use carta::{
    ids::{ItemId, PromotionId},
    items::SellableItem,
    promotions::{Promotion, PromotionDefinition},
};
use tokio::sync::RwLock;

use crate::{
    catalog::{CatalogService, CatalogServiceError},
    store::{PersistenceError, PromotionStore},
};

/// Menu held in memory.
#[derive(Debug, Default)]
pub struct InMemoryCatalogService {
    items: RwLock<Arc<Vec<SellableItem<'static>>>>,
}

impl InMemoryCatalogService {
    /// Create a catalog holding `items`, in menu order.
    pub fn new(items: impl IntoIterator<Item = SellableItem<'static>>) -> Self {
        Self {
            items: RwLock::new(Arc::new(items.into_iter().collect())),
        }
    }

    /// Replace the whole menu, e.g. after a price change.
    pub async fn replace(&self, items: impl IntoIterator<Item = SellableItem<'static>>) {
        *self.items.write().await = Arc::new(items.into_iter().collect());
    }

    async fn snapshot(&self) -> Arc<Vec<SellableItem<'static>>> {
        Arc::clone(&*self.items.read().await)
    }
}

#[async_trait]
impl CatalogService for InMemoryCatalogService {
    async fn get_unit_price(
        &self,
        item: ItemId,
    ) -> Result<SellableItem<'static>, CatalogServiceError> {
        self.snapshot()
            .await
            .iter()
            .find(|candidate| candidate.id() == item)
            .cloned()
            .ok_or(CatalogServiceError::NotFound(item))
    }

    async fn list_items(&self) -> Result<Vec<SellableItem<'static>>, CatalogServiceError> {
        Ok(self.snapshot().await.as_ref().clone())
    }
}

/// Promotions held in memory, in creation order.
#[derive(Debug, Default)]
pub struct InMemoryPromotionStore {
    promotions: RwLock<Arc<Vec<Promotion<'static>>>>,
}

impl InMemoryPromotionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    async fn replace_one<F>(
        &self,
        id: PromotionId,
        build: F,
    ) -> Result<Promotion<'static>, PersistenceError>
    where
        F: FnOnce(
                &[Promotion<'static>],
                &Promotion<'static>,
            ) -> Result<Promotion<'static>, PersistenceError>
            + Send,
    {
        let mut promotions = self.promotions.write().await;

        let existing = promotions
            .iter()
            .find(|promotion| promotion.id() == id)
            .ok_or(PersistenceError::NotFound(id))?;

        let replacement = build(&promotions, existing)?;

        let next = promotions
            .iter()
            .map(|promotion| {
                if promotion.id() == id {
                    replacement.clone()
                } else {
                    promotion.clone()
                }
            })
            .collect();

        *promotions = Arc::new(next);

        Ok(replacement)
    }
}

/// Denominations compare trimmed and case-insensitively.
fn same_denomination(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn ensure_unique(
    promotions: &[Promotion<'static>],
    definition: &PromotionDefinition<'static>,
    except: Option<PromotionId>,
) -> Result<(), PersistenceError> {
    let taken = promotions.iter().any(|promotion| {
        Some(promotion.id()) != except
            && same_denomination(promotion.denomination(), definition.denomination())
    });

    if taken {
        return Err(PersistenceError::AlreadyExists(
            definition.denomination().to_string(),
        ));
    }

    Ok(())
}

#[async_trait]
impl PromotionStore for InMemoryPromotionStore {
    async fn list(&self) -> Result<Vec<Promotion<'static>>, PersistenceError> {
        Ok(self.promotions.read().await.as_ref().clone())
    }

    async fn create(
        &self,
        definition: PromotionDefinition<'static>,
    ) -> Result<Promotion<'static>, PersistenceError> {
        let mut promotions = self.promotions.write().await;

        ensure_unique(&promotions, &definition, None)?;

        let promotion = Promotion::new(PromotionId::new(), definition);

        let mut next = promotions.as_ref().clone();

        next.push(promotion.clone());

        *promotions = Arc::new(next);

        Ok(promotion)
    }

    async fn update(
        &self,
        id: PromotionId,
        definition: PromotionDefinition<'static>,
    ) -> Result<Promotion<'static>, PersistenceError> {
        self.replace_one(id, move |promotions, _existing| {
            ensure_unique(promotions, &definition, Some(id))?;

            Ok(Promotion::new(id, definition))
        })
        .await
    }

    async fn set_enabled(
        &self,
        id: PromotionId,
        enabled: bool,
    ) -> Result<Promotion<'static>, PersistenceError> {
        self.replace_one(id, move |_promotions, existing| {
            Ok(Promotion::new(id, existing.with_enabled(enabled)))
        })
        .await
    }
}
