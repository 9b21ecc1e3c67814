//! Promotion Store
//!
//! Persistence seam for authored promotions. The store assigns ids and enforces unique
//! denominations; everything else about a promotion is decided before it gets here.

use async_trait::async_trait;
use carta::{
    ids::PromotionId,
    promotions::{Promotion, PromotionDefinition},
};
use mockall::automock;
use thiserror::Error;

/// Promotion store error variants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PersistenceError {
    /// Another promotion already uses the denomination.
    #[error("a promotion named {0:?} already exists")]
    AlreadyExists(String),

    /// Promotion was not found.
    #[error("promotion {0} not found")]
    NotFound(PromotionId),

    /// Store could not be reached.
    #[error("promotion store unavailable: {0}")]
    Unavailable(String),
}

#[automock]
#[async_trait]
pub trait PromotionStore: Send + Sync {
    /// Every stored promotion, in creation order.
    async fn list(&self) -> Result<Vec<Promotion<'static>>, PersistenceError>;

    /// Store a new promotion under a fresh id.
    async fn create(
        &self,
        definition: PromotionDefinition<'static>,
    ) -> Result<Promotion<'static>, PersistenceError>;

    /// Replace the definition of an existing promotion.
    async fn update(
        &self,
        id: PromotionId,
        definition: PromotionDefinition<'static>,
    ) -> Result<Promotion<'static>, PersistenceError>;

    /// Flip the administrator override of an existing promotion.
    async fn set_enabled(
        &self,
        id: PromotionId,
        enabled: bool,
    ) -> Result<Promotion<'static>, PersistenceError>;
}
