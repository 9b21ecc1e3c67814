//! Catalog Service
//!
//! Async source of menu items and their current unit prices.

use async_trait::async_trait;
use carta::{catalog::CatalogError, ids::ItemId, items::SellableItem};
use mockall::automock;
use thiserror::Error;

/// Catalog service error variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogServiceError {
    /// Item is not on the menu.
    #[error("menu item {0} not found")]
    NotFound(ItemId),

    /// Catalog could not be reached.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

impl From<CatalogError> for CatalogServiceError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::NotFound(item) => Self::NotFound(item),
        }
    }
}

/// Source of menu items and prices.
#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Fetch an item with its current unit price.
    async fn get_unit_price(
        &self,
        item: ItemId,
    ) -> Result<SellableItem<'static>, CatalogServiceError>;

    /// Every item on the menu, in menu order.
    async fn list_items(&self) -> Result<Vec<SellableItem<'static>>, CatalogServiceError>;
}
