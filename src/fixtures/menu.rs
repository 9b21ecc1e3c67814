//! Menu Fixtures

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;

use crate::{discounts::major_to_minor, fixtures::FixtureError, ids::ItemId, items::SellableItem};

/// Wrapper for menu items in YAML
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Menu items, in display order
    pub items: Vec<MenuItemFixture>,
}

/// Menu item fixture from YAML
#[derive(Debug, Deserialize)]
pub struct MenuItemFixture {
    /// Key other fixtures use to reference the item
    pub key: String,

    /// Optional fixed id; generated when omitted
    #[serde(default)]
    pub id: Option<ItemId>,

    /// Display name
    pub name: String,

    /// Price string (e.g., "10.00 USD")
    pub price: String,
}

impl MenuItemFixture {
    /// Convert into a sellable item, generating an id if the fixture has none.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn try_into_item<'a>(self) -> Result<SellableItem<'a>, FixtureError> {
        let (minor_units, currency) = parse_price(&self.price)?;

        Ok(SellableItem::new(
            self.id.unwrap_or_default(),
            self.name,
            Money::from_minor(minor_units, currency),
        ))
    }
}

/// Parse a price string like "2.99 GBP" into minor units and currency
///
/// # Errors
///
/// Returns an error if the price string is malformed or the currency is unknown.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|err| FixtureError::InvalidPrice(format!("{s}: {err}")))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(format!("{s}: price is negative")));
    }

    let currency = currency_from_code(currency_code)?;

    let minor_units = major_to_minor(amount, currency)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Resolve one of the supported ISO currency codes.
///
/// # Errors
///
/// Returns [`FixtureError::UnknownCurrency`] for anything but GBP, USD or EUR.
pub fn currency_from_code(code: &str) -> Result<&'static Currency, FixtureError> {
    match code {
        "GBP" => Ok(GBP),
        "USD" => Ok(USD),
        "EUR" => Ok(EUR),
        other => Err(FixtureError::UnknownCurrency(other.to_string())),
    }
}
