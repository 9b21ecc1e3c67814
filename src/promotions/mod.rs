//! Promotions
//!
//! Canonical promotion records. Both authored shapes (combo and N×M) normalize into a
//! [`PromotionDefinition`]; the store wraps it with an id to form a [`Promotion`].

use std::{fmt, ops::Deref};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    discounts::{DiscountType, PromotionDiscount},
    ids::{ItemId, PromotionId},
};

pub mod authoring;
pub mod drafts;
pub mod lifecycle;
pub mod validation;

/// Which authored shape a promotion came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionKind {
    /// Fixed bundle of items and quantities at a single discount.
    Combo,

    /// Buy N of an eligible set, pay for M.
    #[serde(rename = "NXM")]
    NxM,
}

impl fmt::Display for PromotionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combo => f.write_str("COMBO"),
            Self::NxM => f.write_str("NXM"),
        }
    }
}

/// One referenced item and its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailLine {
    item: ItemId,
    quantity: u32,
}

impl DetailLine {
    pub(crate) fn new(item: ItemId, quantity: u32) -> Self {
        Self { item, quantity }
    }

    /// Return the referenced item id.
    pub fn item(&self) -> ItemId {
        self.item
    }

    /// Return the quantity, always at least 1.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }
}

/// The instants a promotion is valid between, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidityWindow {
    from: Timestamp,
    until: Timestamp,
}

impl ValidityWindow {
    /// Create a window, or `None` unless `until` is strictly after `from`.
    pub fn new(from: Timestamp, until: Timestamp) -> Option<Self> {
        (until > from).then_some(Self { from, until })
    }

    /// Start of the window.
    pub fn from(&self) -> Timestamp {
        self.from
    }

    /// End of the window.
    pub fn until(&self) -> Timestamp {
        self.until
    }
}

/// Canonical promotion content, as produced by authoring.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionDefinition<'a> {
    denomination: String,
    description: Option<String>,
    kind: PromotionKind,
    discount: PromotionDiscount<'a>,
    minimum_quantity: u32,
    window: ValidityWindow,
    enabled_by_admin: bool,
    lines: SmallVec<[DetailLine; 4]>,
    images: Vec<String>,
}

impl<'a> PromotionDefinition<'a> {
    #[expect(
        clippy::too_many_arguments,
        reason = "only called from authoring after validation"
    )]
    pub(crate) fn new(
        denomination: String,
        description: Option<String>,
        kind: PromotionKind,
        discount: PromotionDiscount<'a>,
        minimum_quantity: u32,
        window: ValidityWindow,
        enabled_by_admin: bool,
        lines: SmallVec<[DetailLine; 4]>,
        images: Vec<String>,
    ) -> Self {
        Self {
            denomination,
            description,
            kind,
            discount,
            minimum_quantity,
            window,
            enabled_by_admin,
            lines,
            images,
        }
    }

    /// Return a copy with the administrator override set.
    #[must_use]
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self {
            enabled_by_admin: enabled,
            ..self.clone()
        }
    }

    /// Promotion name, at least three characters.
    pub fn denomination(&self) -> &str {
        &self.denomination
    }

    /// Optional free text description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Authored shape.
    pub fn kind(&self) -> PromotionKind {
        self.kind
    }

    /// Discount granted on the bundle.
    pub fn discount(&self) -> &PromotionDiscount<'a> {
        &self.discount
    }

    /// Discount type tag.
    pub fn discount_type(&self) -> DiscountType {
        self.discount.discount_type()
    }

    /// Number of units required: the line quantity sum for combos, the "buy" count for N×M.
    pub fn minimum_quantity(&self) -> u32 {
        self.minimum_quantity
    }

    /// Validity window.
    pub fn window(&self) -> &ValidityWindow {
        &self.window
    }

    /// Start of validity.
    pub fn valid_from(&self) -> Timestamp {
        self.window.from
    }

    /// End of validity.
    pub fn valid_until(&self) -> Timestamp {
        self.window.until
    }

    /// Administrator override; `false` always means inactive.
    pub fn enabled_by_admin(&self) -> bool {
        self.enabled_by_admin
    }

    /// Detail lines, never empty.
    pub fn lines(&self) -> &[DetailLine] {
        &self.lines
    }

    /// Display-only image references.
    pub fn images(&self) -> &[String] {
        &self.images
    }

    /// Return whether any detail line references the item.
    pub fn references(&self, item: ItemId) -> bool {
        self.lines.iter().any(|line| line.item == item)
    }
}

/// A stored promotion.
#[derive(Debug, Clone, PartialEq)]
pub struct Promotion<'a> {
    id: PromotionId,
    definition: PromotionDefinition<'a>,
}

impl<'a> Promotion<'a> {
    /// Attach a store-issued id to a definition.
    pub fn new(id: PromotionId, definition: PromotionDefinition<'a>) -> Self {
        Self { id, definition }
    }

    /// Return the promotion id.
    pub fn id(&self) -> PromotionId {
        self.id
    }

    /// Return the canonical definition.
    pub fn definition(&self) -> &PromotionDefinition<'a> {
        &self.definition
    }

    /// Take the canonical definition.
    pub fn into_definition(self) -> PromotionDefinition<'a> {
        self.definition
    }
}

impl<'a> Deref for Promotion<'a> {
    type Target = PromotionDefinition<'a>;

    fn deref(&self) -> &Self::Target {
        &self.definition
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use jiff::Timestamp;
    use rust_decimal::Decimal;
    use smallvec::SmallVec;

    use super::*;

    pub(crate) fn window(from: &str, until: &str) -> ValidityWindow {
        let from: Timestamp = from.parse().unwrap_or_default();
        let until: Timestamp = until.parse().unwrap_or_default();

        ValidityWindow { from, until }
    }

    pub(crate) fn combo<'a>(
        denomination: &str,
        discount: PromotionDiscount<'a>,
        lines: &[(ItemId, u32)],
    ) -> PromotionDefinition<'a> {
        let lines: SmallVec<[DetailLine; 4]> = lines
            .iter()
            .map(|&(item, quantity)| DetailLine::new(item, quantity))
            .collect();

        let minimum_quantity = lines.iter().map(DetailLine::quantity).sum::<u32>().max(1);

        PromotionDefinition::new(
            denomination.to_string(),
            None,
            PromotionKind::Combo,
            discount,
            minimum_quantity,
            window("2024-01-10T00:00:00Z", "2024-01-20T23:59:00Z"),
            true,
            lines,
            Vec::new(),
        )
    }

    pub(crate) fn percentage<'a>(points: i64) -> PromotionDiscount<'a> {
        PromotionDiscount::Percentage(Decimal::from(points))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};

    use super::{test_support::*, *};

    #[test]
    fn window_requires_until_after_from() {
        let from: Timestamp = "2024-01-10T00:00:00Z".parse().unwrap_or_default();

        assert!(ValidityWindow::new(from, from).is_none());
        assert!(ValidityWindow::new(from, from + jiff::SignedDuration::from_secs(1)).is_some());
    }

    #[test]
    fn references_matches_any_line() {
        let burger = ItemId::new();
        let fries = ItemId::new();
        let soda = ItemId::new();

        let promo = combo("Lunch", percentage(20), &[(burger, 2), (fries, 1)]);

        assert!(promo.references(burger));
        assert!(promo.references(fries));
        assert!(!promo.references(soda));
    }

    #[test]
    fn with_enabled_returns_new_record() {
        let promo = combo("Lunch", percentage(20), &[(ItemId::new(), 1)]);
        let disabled = promo.with_enabled(false);

        assert!(promo.enabled_by_admin());
        assert!(!disabled.enabled_by_admin());
        assert_eq!(disabled.denomination(), promo.denomination());
    }

    #[test]
    fn promotion_derefs_to_definition() {
        let id = PromotionId::new();
        let definition = combo(
            "Family",
            PromotionDiscount::FixedAmount(Money::from_minor(300, USD)),
            &[(ItemId::new(), 3)],
        );

        let promo = Promotion::new(id, definition.clone());

        assert_eq!(promo.id(), id);
        assert_eq!(promo.minimum_quantity(), 3);
        assert_eq!(promo.discount_type(), DiscountType::FixedAmount);
        assert_eq!(promo.into_definition(), definition);
    }

    #[test]
    fn kind_displays_as_tag() {
        assert_eq!(PromotionKind::Combo.to_string(), "COMBO");
        assert_eq!(PromotionKind::NxM.to_string(), "NXM");
    }
}
