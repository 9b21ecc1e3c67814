//! Promotions Service
//!
//! Authoring writes go draft -> [`PromotionAuthor`] -> [`PromotionStore`] -> snapshot refresh.
//! Reads work off the current [`PromotionSnapshot`] and derive lifecycle states at the
//! instant they are asked for.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use carta::{
    catalog::MenuCatalog,
    ids::{ItemId, PromotionId},
    items::SellableItem,
    offers::{OfferError, OfferLabel, best_offer},
    pricing::{PricingError, PromotionTotals, compute_totals},
    promotions::{
        Promotion, PromotionDefinition, authoring::PromotionAuthor, drafts::PromotionDraft,
        lifecycle::LifecycleState, validation::ValidationErrors,
    },
};
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{Span, info, warn};

use crate::{
    catalog::{CatalogService, CatalogServiceError},
    snapshot::{PromotionSnapshot, SnapshotCoordinator},
    store::{PersistenceError, PromotionStore},
};

/// Promotions service error variants.
#[derive(Debug, Error, PartialEq)]
pub enum PromotionsServiceError {
    /// The draft has field errors; nothing was written.
    #[error("invalid promotion: {0}")]
    Validation(#[from] ValidationErrors),

    /// The store rejected or failed the write.
    #[error(transparent)]
    Persistence(PersistenceError),

    /// A referenced menu item could not be resolved.
    #[error(transparent)]
    Lookup(#[from] CatalogServiceError),

    /// Totals could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The best offer could not be resolved.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Promotion was not found.
    #[error("promotion {0} not found")]
    NotFound(PromotionId),
}

impl From<PersistenceError> for PromotionsServiceError {
    fn from(error: PersistenceError) -> Self {
        match error {
            PersistenceError::NotFound(id) => Self::NotFound(id),
            other => Self::Persistence(other),
        }
    }
}

/// A promotion with the lifecycle state it had when listed.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionListing {
    /// Stored promotion.
    pub promotion: Promotion<'static>,

    /// State at the listing instant.
    pub state: LifecycleState,
}

/// The best active offer for one menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOffer {
    /// Item the offer applies to, at its current price.
    pub item: SellableItem<'static>,

    /// Winning promotion.
    pub promotion: Promotion<'static>,

    /// Discount as percentage points of the item's unit price.
    pub normalized: Decimal,

    /// Display label.
    pub label: OfferLabel<'static>,

    /// Unit price once the discount is applied.
    pub unit_price_after_discount: Money<'static, Currency>,
}

/// Promotions service backed by the pure engine.
pub struct EnginePromotionsService {
    author: PromotionAuthor<'static>,
    catalog: Arc<dyn CatalogService>,
    store: Arc<dyn PromotionStore>,
    snapshot: Arc<SnapshotCoordinator>,
}

impl fmt::Debug for EnginePromotionsService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnginePromotionsService")
            .field("author", &self.author)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl EnginePromotionsService {
    /// Create a service authoring in `author`'s zone and currency.
    #[must_use]
    pub fn new(
        author: PromotionAuthor<'static>,
        catalog: Arc<dyn CatalogService>,
        store: Arc<dyn PromotionStore>,
        snapshot: Arc<SnapshotCoordinator>,
    ) -> Self {
        Self {
            author,
            catalog,
            store,
            snapshot,
        }
    }

    /// Snapshot the service reads from.
    pub fn snapshot(&self) -> &Arc<SnapshotCoordinator> {
        &self.snapshot
    }

    /// Refresh after a successful write. The write stands even if the refresh fails.
    async fn refresh_after_write(&self) {
        if let Err(error) = self.snapshot.refresh(self.store.as_ref()).await {
            warn!(%error, "promotion snapshot refresh failed after write");
        }
    }

    /// Resolve every item `definition` references into a catalog for pricing.
    async fn catalog_for(
        &self,
        definition: &PromotionDefinition<'static>,
    ) -> Result<MenuCatalog<'static>, CatalogServiceError> {
        let mut ids: SmallVec<[ItemId; 8]> = SmallVec::new();

        for line in definition.lines() {
            if !ids.contains(&line.item()) {
                ids.push(line.item());
            }
        }

        let mut catalog = MenuCatalog::new();

        for id in ids {
            catalog.insert(self.catalog.get_unit_price(id).await?);
        }

        Ok(catalog)
    }
}

#[async_trait]
impl PromotionsService for EnginePromotionsService {
    #[tracing::instrument(
        name = "promotions.service.refresh",
        skip(self),
        fields(sequence = tracing::field::Empty, promotion_count = tracing::field::Empty),
        err
    )]
    async fn refresh(&self) -> Result<Arc<PromotionSnapshot>, PromotionsServiceError> {
        let snapshot = self.snapshot.refresh(self.store.as_ref()).await?;

        let span = Span::current();

        span.record("sequence", tracing::field::display(snapshot.sequence()));
        span.record(
            "promotion_count",
            tracing::field::display(snapshot.promotions().len()),
        );

        Ok(snapshot)
    }

    #[tracing::instrument(
        name = "promotions.service.create_promotion",
        skip(self, draft),
        fields(
            promotion_kind = %draft.kind(),
            promotion_id = tracing::field::Empty,
            line_count = tracing::field::Empty
        ),
        err
    )]
    async fn create_promotion(
        &self,
        draft: &PromotionDraft,
    ) -> Result<Promotion<'static>, PromotionsServiceError> {
        let definition = self.author.normalize(draft)?;

        let span = Span::current();

        span.record("line_count", tracing::field::display(definition.lines().len()));

        let promotion = self.store.create(definition).await?;

        span.record("promotion_id", tracing::field::display(promotion.id()));

        self.refresh_after_write().await;

        info!(promotion_id = %promotion.id(), "created promotion");

        Ok(promotion)
    }

    #[tracing::instrument(
        name = "promotions.service.update_promotion",
        skip(self, draft),
        fields(promotion_id = %id, promotion_kind = %draft.kind()),
        err
    )]
    async fn update_promotion(
        &self,
        id: PromotionId,
        draft: &PromotionDraft,
    ) -> Result<Promotion<'static>, PromotionsServiceError> {
        let definition = self.author.normalize(draft)?;

        let promotion = self.store.update(id, definition).await?;

        self.refresh_after_write().await;

        info!(promotion_id = %promotion.id(), "updated promotion");

        Ok(promotion)
    }

    #[tracing::instrument(
        name = "promotions.service.set_enabled",
        skip(self),
        fields(promotion_id = %id),
        err
    )]
    async fn set_enabled(
        &self,
        id: PromotionId,
        enabled: bool,
    ) -> Result<Promotion<'static>, PromotionsServiceError> {
        let promotion = self.store.set_enabled(id, enabled).await?;

        self.refresh_after_write().await;

        info!(promotion_id = %promotion.id(), enabled, "toggled promotion");

        Ok(promotion)
    }

    #[tracing::instrument(
        name = "promotions.service.list_with_states",
        skip(self),
        fields(promotion_count = tracing::field::Empty),
        err
    )]
    async fn list_with_states(
        &self,
        now: Timestamp,
    ) -> Result<Vec<PromotionListing>, PromotionsServiceError> {
        let snapshot = self.snapshot.current();

        Span::current().record(
            "promotion_count",
            tracing::field::display(snapshot.promotions().len()),
        );

        Ok(snapshot
            .promotions()
            .iter()
            .map(|promotion| PromotionListing {
                promotion: promotion.clone(),
                state: promotion.state_at(now),
            })
            .collect())
    }

    #[tracing::instrument(
        name = "promotions.service.resolve_best_offer",
        skip(self),
        fields(
            item_id = %item,
            active_count = tracing::field::Empty,
            promotion_id = tracing::field::Empty
        ),
        err
    )]
    async fn resolve_best_offer(
        &self,
        item: ItemId,
        now: Timestamp,
    ) -> Result<Option<ItemOffer>, PromotionsServiceError> {
        let item = self.catalog.get_unit_price(item).await?;
        let snapshot = self.snapshot.current();

        let active: Vec<&Promotion<'static>> = snapshot
            .promotions()
            .iter()
            .filter(|promotion| promotion.state_at(now).is_active())
            .collect();

        let span = Span::current();

        span.record("active_count", tracing::field::display(active.len()));

        let Some(offer) = best_offer(&item, active)? else {
            return Ok(None);
        };

        span.record(
            "promotion_id",
            tracing::field::display(offer.promotion().id()),
        );

        Ok(Some(ItemOffer {
            promotion: offer.promotion().clone(),
            normalized: offer.normalized(),
            label: *offer.label(),
            unit_price_after_discount: offer.unit_price_after_discount(),
            item,
        }))
    }

    #[tracing::instrument(
        name = "promotions.service.compute_totals",
        skip(self, promotion),
        fields(denomination = %promotion.denomination()),
        err
    )]
    async fn compute_totals(
        &self,
        promotion: &PromotionDefinition<'static>,
    ) -> Result<PromotionTotals<'static>, PromotionsServiceError> {
        let catalog = self.catalog_for(promotion).await?;

        Ok(compute_totals(promotion, &catalog)?)
    }

    #[tracing::instrument(
        name = "promotions.service.preview_totals",
        skip(self, draft),
        fields(promotion_kind = %draft.kind()),
        err
    )]
    async fn preview_totals(
        &self,
        draft: &PromotionDraft,
    ) -> Result<PromotionTotals<'static>, PromotionsServiceError> {
        let definition = self.author.normalize(draft)?;
        let catalog = self.catalog_for(&definition).await?;

        Ok(compute_totals(&definition, &catalog)?)
    }

    fn lifecycle_state(
        &self,
        promotion: &PromotionDefinition<'static>,
        now: Timestamp,
    ) -> LifecycleState {
        promotion.state_at(now)
    }
}

#[automock]
#[async_trait]
pub trait PromotionsService: Send + Sync {
    /// Re-fetch every promotion from the store into the snapshot.
    async fn refresh(&self) -> Result<Arc<PromotionSnapshot>, PromotionsServiceError>;

    /// Author and store a new promotion. The draft is only borrowed, so a failed write
    /// can be retried with it unchanged.
    async fn create_promotion(
        &self,
        draft: &PromotionDraft,
    ) -> Result<Promotion<'static>, PromotionsServiceError>;

    /// Author and store a replacement definition for an existing promotion.
    async fn update_promotion(
        &self,
        id: PromotionId,
        draft: &PromotionDraft,
    ) -> Result<Promotion<'static>, PromotionsServiceError>;

    /// Flip the administrator override.
    async fn set_enabled(
        &self,
        id: PromotionId,
        enabled: bool,
    ) -> Result<Promotion<'static>, PromotionsServiceError>;

    /// Every promotion with its state at `now`.
    async fn list_with_states(
        &self,
        now: Timestamp,
    ) -> Result<Vec<PromotionListing>, PromotionsServiceError>;

    /// Best offer for `item` among the promotions active at `now`; `None` if there is none.
    async fn resolve_best_offer(
        &self,
        item: ItemId,
        now: Timestamp,
    ) -> Result<Option<ItemOffer>, PromotionsServiceError>;

    /// Bundle totals at current catalog prices.
    async fn compute_totals(
        &self,
        promotion: &PromotionDefinition<'static>,
    ) -> Result<PromotionTotals<'static>, PromotionsServiceError>;

    /// Bundle totals for a draft before it is stored.
    async fn preview_totals(
        &self,
        draft: &PromotionDraft,
    ) -> Result<PromotionTotals<'static>, PromotionsServiceError>;

    /// Lifecycle state of `promotion` at `now`.
    fn lifecycle_state(
        &self,
        promotion: &PromotionDefinition<'static>,
        now: Timestamp,
    ) -> LifecycleState;
}
