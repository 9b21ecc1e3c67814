//! Discounts

use std::fmt;

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// How a promotion's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Percentage off, expressed in points (`20` is 20%).
    Percentage,

    /// A fixed currency amount off.
    FixedAmount,
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage => f.write_str("PERCENTAGE"),
            Self::FixedAmount => f.write_str("FIXED_AMOUNT"),
        }
    }
}

/// The discount a promotion grants on its bundle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PromotionDiscount<'a> {
    /// Percentage off in points, expected within `0..=100`.
    Percentage(Decimal),

    /// Fixed amount off.
    FixedAmount(Money<'a, Currency>),
}

impl<'a> PromotionDiscount<'a> {
    /// Return the discount type tag.
    pub fn discount_type(&self) -> DiscountType {
        match self {
            Self::Percentage(_) => DiscountType::Percentage,
            Self::FixedAmount(_) => DiscountType::FixedAmount,
        }
    }

    /// Apply the discount to a price, never going below zero.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the percentage cannot be represented (`DiscountError::PercentConversion`).
    /// - money arithmetic fails, e.g. the fixed amount is in another currency
    ///   (`DiscountError::Money`).
    pub fn apply_to(
        &self,
        price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        let discounted_minor = match self {
            Self::Percentage(points) => {
                let original_minor = price.to_minor_units();
                let percent = percentage_from_points(*points)?;

                original_minor
                    .checked_sub(percent_of_minor(&percent, original_minor)?)
                    .ok_or(DiscountError::PercentConversion)?
            }
            Self::FixedAmount(amount) => price.sub(*amount)?.to_minor_units(),
        };

        Ok(Money::from_minor(discounted_minor.max(0), price.currency()))
    }
}

impl fmt::Display for PromotionDiscount<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage(points) => write!(f, "{}% OFF", points.normalize()),
            Self::FixedAmount(amount) => write!(f, "{amount}"),
        }
    }
}

/// Convert percentage points (`20` for 20%) into a [`Percentage`].
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the value cannot be represented.
pub fn percentage_from_points(points: Decimal) -> Result<Percentage, DiscountError> {
    let fraction = points
        .checked_div(Decimal::ONE_HUNDRED)
        .and_then(|fraction| fraction.to_f64())
        .ok_or(DiscountError::PercentConversion)?;

    Ok(Percentage::from(fraction))
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage does not expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Convert an amount in major units into `currency` minor units, rounding half away from
/// zero. Returns `None` if the result does not fit.
pub fn major_to_minor(amount: Decimal, currency: &Currency) -> Option<i64> {
    let scale = 10_i64.checked_pow(currency.exponent)?;

    amount
        .checked_mul(Decimal::from(scale))?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
