//! Items

use rusty_money::{Money, iso::Currency};

use crate::ids::ItemId;

/// A menu item as currently priced by the catalog.
///
/// This is an immutable snapshot; a later lookup for the same id may return a different price.
#[derive(Debug, Clone, PartialEq)]
pub struct SellableItem<'a> {
    id: ItemId,
    name: String,
    price: Money<'a, Currency>,
}

impl<'a> SellableItem<'a> {
    /// Create a new sellable item.
    pub fn new(id: ItemId, name: impl Into<String>, price: Money<'a, Currency>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
        }
    }

    /// Return the item id.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Return the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Return the unit price.
    pub fn price(&self) -> &Money<'a, Currency> {
        &self.price
    }
}
