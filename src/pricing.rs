//! Promotion Pricing
//!
//! Original, discounted and savings totals for a promotion's bundle.

use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

use crate::{
    catalog::{Catalog, CatalogError},
    discounts::DiscountError,
    promotions::{DetailLine, PromotionDefinition},
};

/// Errors that can occur while computing promotion totals.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A referenced item could not be found.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Applying the discount failed.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),

    /// The promotion has no lines, so currency could not be determined.
    #[error("promotion has no lines; cannot determine currency")]
    NoLines,

    /// A line total does not fit in minor units.
    #[error("line total overflowed")]
    Overflow,
}

/// Bundle totals for a promotion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PromotionTotals<'a> {
    /// Sum of line quantity times unit price.
    pub original: Money<'a, Currency>,

    /// Total after the discount, never negative.
    pub discounted: Money<'a, Currency>,

    /// Difference between the original and discounted totals.
    pub savings: Money<'a, Currency>,
}

/// Compute the totals for a promotion, resolving unit prices through `catalog`.
///
/// # Errors
///
/// - [`PricingError::Catalog`]: a line references an item the catalog does not know.
/// - [`PricingError::Money`]: items are priced in different currencies, or the
///   fixed amount is in another currency.
/// - [`PricingError::Discount`]: the percentage could not be applied.
/// - [`PricingError::NoLines`]: the promotion has no lines.
/// - [`PricingError::Overflow`]: a line total does not fit in minor units.
pub fn compute_totals<'a>(
    promotion: &PromotionDefinition<'a>,
    catalog: &impl Catalog<'a>,
) -> Result<PromotionTotals<'a>, PricingError> {
    let original = original_total(promotion.lines(), catalog)?;
    let discounted = promotion.discount().apply_to(&original)?;
    let savings = original.sub(discounted)?;

    Ok(PromotionTotals {
        original,
        discounted,
        savings,
    })
}

fn original_total<'a>(
    lines: &[DetailLine],
    catalog: &impl Catalog<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    let first = lines.first().ok_or(PricingError::NoLines)?;
    let currency = catalog.lookup(first.item())?.price().currency();

    lines
        .iter()
        .try_fold(Money::from_minor(0, currency), |total, line| {
            let price = catalog.lookup(line.item())?.price();

            let line_minor = price
                .to_minor_units()
                .checked_mul(i64::from(line.quantity()))
                .ok_or(PricingError::Overflow)?;

            Ok(total.add(Money::from_minor(line_minor, price.currency()))?)
        })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{EUR, USD};
    use testresult::TestResult;

    use crate::{
        catalog::MenuCatalog,
        discounts::PromotionDiscount,
        ids::ItemId,
        items::SellableItem,
        promotions::test_support::{combo, percentage},
    };

    use super::*;

    fn menu() -> (MenuCatalog<'static>, ItemId, ItemId) {
        let burger = SellableItem::new(ItemId::new(), "Burger", Money::from_minor(1000, USD));
        let fries = SellableItem::new(ItemId::new(), "Fries", Money::from_minor(500, USD));

        let ids = (burger.id(), fries.id());

        ([burger, fries].into_iter().collect(), ids.0, ids.1)
    }

    #[test]
    fn percentage_combo_totals() -> TestResult {
        let (catalog, burger, fries) = menu();
        let promo = combo("Lunch Combo", percentage(20), &[(burger, 2), (fries, 1)]);

        let totals = compute_totals(&promo, &catalog)?;

        assert_eq!(totals.original, Money::from_minor(2500, USD));
        assert_eq!(totals.discounted, Money::from_minor(2000, USD));
        assert_eq!(totals.savings, Money::from_minor(500, USD));

        Ok(())
    }

    #[test]
    fn fixed_amount_totals_floor_at_zero() -> TestResult {
        let (catalog, burger, _) = menu();
        let promo = combo(
            "Huge Discount",
            PromotionDiscount::FixedAmount(Money::from_minor(99_900, USD)),
            &[(burger, 1)],
        );

        let totals = compute_totals(&promo, &catalog)?;

        assert_eq!(totals.discounted, Money::from_minor(0, USD));
        assert_eq!(totals.savings, totals.original);

        Ok(())
    }

    #[test]
    fn fixed_amount_totals_subtract() -> TestResult {
        let (catalog, burger, fries) = menu();
        let promo = combo(
            "Three Off",
            PromotionDiscount::FixedAmount(Money::from_minor(300, USD)),
            &[(burger, 1), (fries, 2)],
        );

        let totals = compute_totals(&promo, &catalog)?;

        assert_eq!(totals.original, Money::from_minor(2000, USD));
        assert_eq!(totals.discounted, Money::from_minor(1700, USD));
        assert_eq!(totals.savings, Money::from_minor(300, USD));

        Ok(())
    }

    #[test]
    fn unknown_item_is_a_lookup_failure() {
        let (catalog, burger, _) = menu();
        let missing = ItemId::new();
        let promo = combo("Lunch", percentage(20), &[(burger, 1), (missing, 1)]);

        assert_eq!(
            compute_totals(&promo, &catalog),
            Err(PricingError::Catalog(CatalogError::NotFound(missing)))
        );
    }

    #[test]
    fn mixed_currencies_are_an_error() {
        let (mut catalog, burger, _) = menu();
        let crepe = SellableItem::new(ItemId::new(), "Crepe", Money::from_minor(400, EUR));
        let crepe_id = crepe.id();

        catalog.insert(crepe);

        let promo = combo("Mixed", percentage(10), &[(burger, 1), (crepe_id, 1)]);

        assert!(matches!(
            compute_totals(&promo, &catalog),
            Err(PricingError::Money(_))
        ));
    }
}
