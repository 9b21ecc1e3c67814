//! Catalog

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{ids::ItemId, items::SellableItem};

/// Errors raised while resolving items against the catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// The catalog does not know the referenced item.
    #[error("item {0} not found in catalog")]
    NotFound(ItemId),
}

/// Resolves item ids to their current name and unit price.
pub trait Catalog<'a> {
    /// Look up a single item.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] if the id is unknown.
    fn lookup(&self, item: ItemId) -> Result<&SellableItem<'a>, CatalogError>;
}

/// An in-memory catalog snapshot keyed by item id.
#[derive(Debug, Clone, Default)]
pub struct MenuCatalog<'a> {
    items: FxHashMap<ItemId, SellableItem<'a>>,
}

impl<'a> MenuCatalog<'a> {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item, returning the previous entry.
    pub fn insert(&mut self, item: SellableItem<'a>) -> Option<SellableItem<'a>> {
        self.items.insert(item.id(), item)
    }

    /// Number of items in the catalog.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over all items, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &SellableItem<'a>> {
        self.items.values()
    }
}

impl<'a> Catalog<'a> for MenuCatalog<'a> {
    fn lookup(&self, item: ItemId) -> Result<&SellableItem<'a>, CatalogError> {
        self.items.get(&item).ok_or(CatalogError::NotFound(item))
    }
}

impl<'a> FromIterator<SellableItem<'a>> for MenuCatalog<'a> {
    fn from_iter<I: IntoIterator<Item = SellableItem<'a>>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().map(|item| (item.id(), item)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use super::*;

    #[test]
    fn lookup_returns_inserted_item() -> TestResult {
        let id = ItemId::new();
        let mut catalog = MenuCatalog::new();

        catalog.insert(SellableItem::new(id, "Fries", Money::from_minor(500, USD)));

        let item = catalog.lookup(id)?;

        assert_eq!(item.name(), "Fries");
        assert_eq!(catalog.len(), 1);

        Ok(())
    }

    #[test]
    fn lookup_unknown_item_returns_not_found() {
        let catalog = MenuCatalog::new();
        let id = ItemId::new();

        assert_eq!(catalog.lookup(id), Err(CatalogError::NotFound(id)));
        assert!(catalog.is_empty());
    }

    #[test]
    fn insert_replaces_existing_price() {
        let id = ItemId::new();
        let mut catalog = MenuCatalog::new();

        catalog.insert(SellableItem::new(id, "Soda", Money::from_minor(200, USD)));

        let previous = catalog.insert(SellableItem::new(id, "Soda", Money::from_minor(250, USD)));

        assert_eq!(
            previous.map(|item| item.price().to_minor_units()),
            Some(200)
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn collects_from_items() {
        let catalog: MenuCatalog<'_> = [
            SellableItem::new(ItemId::new(), "Burger", Money::from_minor(1000, USD)),
            SellableItem::new(ItemId::new(), "Fries", Money::from_minor(500, USD)),
        ]
        .into_iter()
        .collect();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.iter().count(), 2);
    }
}
