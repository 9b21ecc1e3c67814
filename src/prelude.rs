//! Carta prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    board::{Board, BoardError},
    catalog::{Catalog, CatalogError, MenuCatalog},
    discounts::{DiscountError, DiscountType, PromotionDiscount},
    fixtures::{Fixture, FixtureError},
    ids::{ItemId, PromotionId, TypedUuid},
    items::SellableItem,
    offers::{BestOffer, OfferError, OfferLabel, best_offer, resolve_best_offer},
    pricing::{PricingError, PromotionTotals, compute_totals},
    promotions::{
        DetailLine, Promotion, PromotionDefinition, PromotionKind, ValidityWindow,
        authoring::PromotionAuthor,
        drafts::{ComboDraft, DraftInstant, DraftLine, NxMDraft, PromotionDraft},
        lifecycle::{LifecycleState, lifecycle_state},
        validation::{FieldError, FieldErrorKind, PromotionField, ValidationErrors},
    },
};
