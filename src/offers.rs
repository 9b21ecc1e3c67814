//! Best Offers
//!
//! Picks the single most advantageous active promotion for a menu item. Candidates are
//! compared by their discount expressed as a percentage of the item's own unit price.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    discounts::{DiscountError, PromotionDiscount},
    ids::ItemId,
    items::SellableItem,
    promotions::Promotion,
};

/// Errors that can occur while resolving offers.
#[derive(Debug, Error, PartialEq)]
pub enum OfferError {
    /// The item could not be found.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Applying the discount failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// Normalizing the discount overflowed.
    #[error("normalized discount overflowed")]
    Overflow,
}

/// Display label for an offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OfferLabel<'a> {
    /// Percentage points off.
    Percentage(Decimal),

    /// Fixed amount off.
    Amount(Money<'a, Currency>),
}

impl<'a> From<&PromotionDiscount<'a>> for OfferLabel<'a> {
    fn from(discount: &PromotionDiscount<'a>) -> Self {
        match discount {
            PromotionDiscount::Percentage(points) => Self::Percentage(*points),
            PromotionDiscount::FixedAmount(amount) => Self::Amount(*amount),
        }
    }
}

impl fmt::Display for OfferLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(points) => write!(f, "{}% OFF", points.normalize()),
            Self::Amount(amount) => write!(f, "{amount}"),
        }
    }
}

/// The winning promotion for an item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestOffer<'p, 'a> {
    promotion: &'p Promotion<'a>,
    normalized: Decimal,
    label: OfferLabel<'a>,
    unit_price_after_discount: Money<'a, Currency>,
}

impl<'p, 'a> BestOffer<'p, 'a> {
    /// Winning promotion.
    pub fn promotion(&self) -> &'p Promotion<'a> {
        self.promotion
    }

    /// Discount as percentage points of the item's unit price.
    pub fn normalized(&self) -> Decimal {
        self.normalized
    }

    /// Display label.
    pub fn label(&self) -> &OfferLabel<'a> {
        &self.label
    }

    /// Unit price once the discount is applied, never negative.
    pub fn unit_price_after_discount(&self) -> Money<'a, Currency> {
        self.unit_price_after_discount
    }
}

/// Express a discount as percentage points of `unit_price`.
///
/// Fixed amounts on a zero-priced item normalize to zero.
///
/// # Errors
///
/// - [`OfferError::Money`]: the fixed amount is in another currency.
/// - [`OfferError::Overflow`]: the ratio cannot be represented.
pub fn normalized_discount<'a>(
    discount: &PromotionDiscount<'a>,
    unit_price: &Money<'a, Currency>,
) -> Result<Decimal, OfferError> {
    let amount = match discount {
        PromotionDiscount::Percentage(points) => return Ok(*points),
        PromotionDiscount::FixedAmount(amount) => amount,
    };

    let expected = unit_price.currency().iso_alpha_code;
    let actual = amount.currency().iso_alpha_code;

    if expected != actual {
        return Err(MoneyError::CurrencyMismatch { expected, actual }.into());
    }

    let price_minor = unit_price.to_minor_units();

    if price_minor == 0 {
        return Ok(Decimal::ZERO);
    }

    Decimal::from(amount.to_minor_units())
        .checked_div(Decimal::from(price_minor))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .ok_or(OfferError::Overflow)
}

/// Pick the best offer for `item` among `promotions`.
///
/// Only promotions referencing the item are considered, and callers are expected to have
/// filtered them to the active ones. The candidate with the strictly greatest normalized
/// discount wins; on a tie the first encountered candidate is kept.
///
/// # Errors
///
/// Returns an error if a candidate's discount cannot be normalized or applied.
pub fn best_offer<'p, 'a: 'p>(
    item: &SellableItem<'a>,
    promotions: impl IntoIterator<Item = &'p Promotion<'a>>,
) -> Result<Option<BestOffer<'p, 'a>>, OfferError> {
    let mut best: Option<(&'p Promotion<'a>, Decimal)> = None;

    for promotion in promotions {
        if !promotion.references(item.id()) {
            continue;
        }

        let normalized = normalized_discount(promotion.discount(), item.price())?;

        if best.is_none_or(|(_, current)| normalized > current) {
            best = Some((promotion, normalized));
        }
    }

    best.map(|(promotion, normalized)| -> Result<_, OfferError> {
        let unit_price_after_discount = promotion.discount().apply_to(item.price())?;

        Ok(BestOffer {
            promotion,
            normalized,
            label: OfferLabel::from(promotion.discount()),
            unit_price_after_discount,
        })
    })
    .transpose()
}

/// Resolve the best offer for an item among the promotions active at `now`.
///
/// Returns `Ok(None)` when no active promotion references the item.
///
/// # Errors
///
/// - [`OfferError::Catalog`]: the item is not in the catalog.
/// - any error from [`best_offer`].
pub fn resolve_best_offer<'p, 'a: 'p>(
    item: ItemId,
    catalog: &impl Catalog<'a>,
    promotions: &'p [Promotion<'a>],
    now: Timestamp,
) -> Result<Option<BestOffer<'p, 'a>>, OfferError> {
    let item = catalog.lookup(item)?;

    best_offer(
        item,
        promotions
            .iter()
            .filter(|promotion| promotion.state_at(now).is_active()),
    )
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use crate::{
        catalog::MenuCatalog,
        ids::PromotionId,
        promotions::test_support::{combo, percentage},
    };

    use super::*;

    fn promotion(
        denomination: &str,
        discount: PromotionDiscount<'static>,
        item: ItemId,
    ) -> Promotion<'static> {
        Promotion::new(PromotionId::new(), combo(denomination, discount, &[(item, 1)]))
    }

    fn fixed(minor: i64) -> PromotionDiscount<'static> {
        PromotionDiscount::FixedAmount(Money::from_minor(minor, USD))
    }

    fn burger() -> SellableItem<'static> {
        SellableItem::new(ItemId::new(), "Burger", Money::from_minor(1000, USD))
    }

    #[test]
    fn fixed_amount_beats_smaller_percentage() -> TestResult {
        let item = burger();
        let promotions = [
            promotion("Fifteen Off", percentage(15), item.id()),
            promotion("Three Dollars", fixed(300), item.id()),
        ];

        let Some(offer) = best_offer(&item, &promotions)? else {
            unreachable!("expected an offer");
        };

        assert_eq!(offer.promotion().denomination(), "Three Dollars");
        assert_eq!(offer.normalized(), Decimal::from(30));
        assert_eq!(offer.unit_price_after_discount(), Money::from_minor(700, USD));

        Ok(())
    }

    #[test]
    fn ties_keep_first_candidate() -> TestResult {
        let item = burger();
        let promotions = [
            promotion("Two Off", fixed(200), item.id()),
            promotion("Twenty Percent", percentage(20), item.id()),
        ];

        let Some(offer) = best_offer(&item, &promotions)? else {
            unreachable!("expected an offer");
        };

        assert_eq!(
            Some(offer.promotion().id()),
            promotions.first().map(Promotion::id)
        );

        Ok(())
    }

    #[test]
    fn unrelated_promotions_yield_no_offer() -> TestResult {
        let item = burger();
        let promotions = [promotion("Fries Deal", percentage(50), ItemId::new())];

        assert!(best_offer(&item, &promotions)?.is_none());

        Ok(())
    }

    #[test]
    fn winner_has_greatest_normalized_discount() -> TestResult {
        let item = burger();
        let promotions = [
            promotion("Ten", percentage(10), item.id()),
            promotion("Four Fifty", fixed(450), item.id()),
            promotion("Forty", percentage(40), item.id()),
            promotion("One", fixed(100), item.id()),
        ];

        let Some(offer) = best_offer(&item, &promotions)? else {
            unreachable!("expected an offer");
        };

        let greatest = promotions
            .iter()
            .map(|promo| normalized_discount(promo.discount(), item.price()))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .max()
            .unwrap_or_default();

        assert_eq!(offer.normalized(), greatest);
        assert_eq!(offer.promotion().denomination(), "Four Fifty");

        Ok(())
    }

    #[test]
    fn labels_render_percentage_and_amount() {
        assert_eq!(OfferLabel::from(&percentage(15)).to_string(), "15% OFF");
        assert_eq!(
            OfferLabel::from(&fixed(300)),
            OfferLabel::Amount(Money::from_minor(300, USD))
        );
    }

    #[test]
    fn fixed_amount_on_free_item_normalizes_to_zero() -> TestResult {
        let price = Money::from_minor(0, USD);

        assert_eq!(normalized_discount(&fixed(300), &price)?, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn fixed_amount_in_other_currency_is_an_error() {
        let price = Money::from_minor(1000, EUR);

        assert_eq!(
            normalized_discount(&fixed(300), &price),
            Err(OfferError::Money(MoneyError::CurrencyMismatch {
                expected: EUR.iso_alpha_code,
                actual: USD.iso_alpha_code,
            }))
        );
    }

    #[test]
    fn resolve_considers_only_active_promotions() -> TestResult {
        let item = burger();
        let item_id = item.id();
        let catalog: MenuCatalog<'static> = [item].into_iter().collect();

        let promotions = [
            Promotion::new(
                PromotionId::new(),
                combo("Disabled", percentage(90), &[(item_id, 1)]).with_enabled(false),
            ),
            promotion("Lunch", percentage(20), item_id),
        ];

        let Some(offer) = resolve_best_offer(
            item_id,
            &catalog,
            &promotions,
            "2024-01-15T12:00:00Z".parse()?,
        )?
        else {
            unreachable!("expected an offer");
        };

        assert_eq!(offer.promotion().denomination(), "Lunch");
        assert_eq!(offer.label().to_string(), "20% OFF");

        let expired = resolve_best_offer(
            item_id,
            &catalog,
            &promotions,
            "2024-02-01T00:00:00Z".parse()?,
        )?;

        assert!(expired.is_none());

        Ok(())
    }

    #[test]
    fn resolve_unknown_item_is_a_lookup_failure() -> TestResult {
        let catalog = MenuCatalog::new();
        let missing = ItemId::new();

        assert_eq!(
            resolve_best_offer(missing, &catalog, &[], "2024-01-15T12:00:00Z".parse()?),
            Err(OfferError::Catalog(CatalogError::NotFound(missing)))
        );

        Ok(())
    }
}
