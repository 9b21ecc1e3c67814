//! Fixtures
//!
//! A fixture set is a menu (`menu/<name>.yml`) and a list of promotion drafts
//! (`promotions/<name>.yml`) under a common base path. Drafts are authored on load, so a
//! loaded set only ever holds canonical promotions.

use std::{fs, path::PathBuf};

use jiff::tz::TimeZone;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    catalog::{Catalog, MenuCatalog},
    fixtures::{menu::MenuFixture, promotions::PromotionsFixture},
    ids::{ItemId, PromotionId},
    items::SellableItem,
    promotions::{
        Promotion, authoring::PromotionAuthor, drafts::PromotionDraft,
        validation::ValidationErrors,
    },
};

pub mod menu;
pub mod promotions;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between menu items
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No menu loaded yet
    #[error("No menu loaded yet; currency unknown")]
    NoCurrency,

    /// Key used twice in one fixture set
    #[error("Duplicate fixture key: {0}")]
    DuplicateKey(String),

    /// Item not found
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Promotion not found
    #[error("Promotion not found: {0}")]
    PromotionNotFound(String),

    /// A promotion draft failed authoring
    #[error("Invalid promotion draft {key}: {errors}")]
    Validation {
        /// Fixture key of the draft
        key: String,

        /// Every field error in the draft
        #[source]
        errors: ValidationErrors,
    },
}

/// Fixture
#[derive(Debug)]
pub struct Fixture<'a> {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Zone draft dates are read in
    time_zone: TimeZone,

    /// Loaded menu
    catalog: MenuCatalog<'a>,

    /// Menu item ids in file order
    item_order: Vec<ItemId>,

    /// String key -> id mappings for lookups
    item_keys: FxHashMap<String, ItemId>,
    promotion_keys: FxHashMap<String, PromotionId>,

    /// Drafts as read, keyed by fixture key
    drafts: Vec<(String, PromotionDraft)>,

    /// Authored promotions
    promotions: Vec<Promotion<'a>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl<'a> Fixture<'a> {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            time_zone: TimeZone::UTC,
            catalog: MenuCatalog::new(),
            item_order: Vec::new(),
            item_keys: FxHashMap::default(),
            promotion_keys: FxHashMap::default(),
            drafts: Vec::new(),
            promotions: Vec::new(),
            currency: None,
        }
    }

    /// Read draft dates in `time_zone` instead of UTC
    #[must_use]
    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Load menu items from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a key repeats, or if
    /// items are priced in different currencies.
    pub fn load_menu(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("menu").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: MenuFixture = serde_norway::from_str(&contents)?;

        for item_fixture in fixture.items {
            let key = item_fixture.key.clone();

            if self.item_keys.contains_key(&key) {
                return Err(FixtureError::DuplicateKey(key));
            }

            // Parse to get currency first (before creating the item)
            let (_minor_units, currency) = menu::parse_price(&item_fixture.price)?;

            if let Some(existing_currency) = self.currency {
                if existing_currency != currency {
                    return Err(FixtureError::CurrencyMismatch(
                        existing_currency.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
            } else {
                self.currency = Some(currency);
            }

            let item: SellableItem<'a> = item_fixture.try_into_item()?;

            self.item_keys.insert(key, item.id());
            self.item_order.push(item.id());
            self.catalog.insert(item);
        }

        Ok(self)
    }

    /// Read promotion drafts from a YAML fixture file without authoring them
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a draft references
    /// an item key the loaded menu does not have.
    pub fn read_drafts(&self, name: &str) -> Result<Vec<(String, PromotionDraft)>, FixtureError> {
        let file_path = self
            .base_path
            .join("promotions")
            .join(format!("{name}.yml"));

        let contents = fs::read_to_string(&file_path)?;
        let fixture: PromotionsFixture = serde_norway::from_str(&contents)?;

        fixture
            .promotions
            .into_iter()
            .map(|promotion| promotion.try_into_draft(&self.item_keys))
            .collect()
    }

    /// Load and author promotion drafts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the drafts cannot be read, if a key repeats, or if any draft
    /// fails authoring.
    pub fn load_promotions(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let author = self.author()?;

        for (key, draft) in self.read_drafts(name)? {
            if self.promotion_keys.contains_key(&key) {
                return Err(FixtureError::DuplicateKey(key));
            }

            let definition = match author.normalize(&draft) {
                Ok(definition) => definition,
                Err(errors) => return Err(FixtureError::Validation { key, errors }),
            };

            let promotion = Promotion::new(PromotionId::new(), definition);

            self.promotion_keys.insert(key.clone(), promotion.id());
            self.promotions.push(promotion);
            self.drafts.push((key, draft));
        }

        Ok(self)
    }

    /// Load a complete fixture set (menu and promotions with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_menu(name)?.load_promotions(name)?;

        Ok(fixture)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_at(
        base_path: impl Into<PathBuf>,
        name: &str,
        time_zone: TimeZone,
    ) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path).with_time_zone(time_zone);

        fixture.load_menu(name)?.load_promotions(name)?;

        Ok(fixture)
    }

    /// Author for drafts against this fixture's menu
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::NoCurrency`] if no menu has been loaded yet.
    pub fn author(&self) -> Result<PromotionAuthor<'static>, FixtureError> {
        Ok(PromotionAuthor::new(self.time_zone.clone(), self.currency()?))
    }

    /// Get an item id by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found.
    pub fn item_id(&self, key: &str) -> Result<ItemId, FixtureError> {
        self.item_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
    }

    /// Get an item by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the item is not found.
    pub fn item(&self, key: &str) -> Result<&SellableItem<'a>, FixtureError> {
        let id = self.item_id(key)?;

        self.catalog
            .lookup(id)
            .map_err(|err| FixtureError::ItemNotFound(format!("{key}: {err}")))
    }

    /// Get a promotion by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the promotion is not found.
    pub fn promotion(&self, key: &str) -> Result<&Promotion<'a>, FixtureError> {
        let id = self
            .promotion_keys
            .get(key)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))?;

        self.promotions
            .iter()
            .find(|promotion| promotion.id() == *id)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get a draft by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the draft is not found.
    pub fn draft(&self, key: &str) -> Result<&PromotionDraft, FixtureError> {
        self.drafts
            .iter()
            .find(|(draft_key, _)| draft_key == key)
            .map(|(_, draft)| draft)
            .ok_or_else(|| FixtureError::PromotionNotFound(key.to_string()))
    }

    /// Get the loaded menu
    pub fn catalog(&self) -> &MenuCatalog<'a> {
        &self.catalog
    }

    /// Get all menu items, in file order
    pub fn items(&self) -> impl Iterator<Item = &SellableItem<'a>> {
        self.item_order
            .iter()
            .filter_map(|id| self.catalog.lookup(*id).ok())
    }

    /// Get every menu item key with its id
    pub fn item_keys(&self) -> impl Iterator<Item = (&str, ItemId)> {
        self.item_keys.iter().map(|(key, id)| (key.as_str(), *id))
    }

    /// Get all promotions, in file order
    pub fn promotions(&self) -> &[Promotion<'a>] {
        &self.promotions
    }

    /// Get all authored drafts with their keys, in file order
    pub fn drafts(&self) -> &[(String, PromotionDraft)] {
        &self.drafts
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no menu has been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    /// Get the zone draft dates are read in
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }
}

impl Default for Fixture<'_> {
    fn default() -> Self {
        Self::new()
    }
}
