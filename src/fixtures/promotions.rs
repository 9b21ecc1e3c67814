//! Promotion Fixtures
//!
//! Promotion drafts in YAML reference menu items by fixture key rather than by id.

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    discounts::DiscountType,
    fixtures::FixtureError,
    ids::ItemId,
    promotions::drafts::{ComboDraft, DraftInstant, DraftLine, NxMDraft, PromotionDraft},
};

/// Wrapper for promotion drafts in YAML
#[derive(Debug, Deserialize)]
pub struct PromotionsFixture {
    /// Drafts, in authoring order
    pub promotions: Vec<PromotionFixture>,
}

/// Promotion draft fixture from YAML
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionFixture {
    /// Combo draft
    Combo(ComboFixture),

    /// N×M draft
    #[serde(rename = "nxm")]
    NxM(NxMFixture),
}

/// Combo draft fixture
#[derive(Debug, Deserialize)]
pub struct ComboFixture {
    /// Key tests and the CLI use to find the promotion
    pub key: String,

    /// Promotion name
    pub denomination: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Discount type
    pub discount_type: DiscountType,

    /// Discount value, in points or currency units
    pub discount_value: Decimal,

    /// Start of validity
    pub valid_from: DraftInstant,

    /// End of validity
    pub valid_until: DraftInstant,

    /// Administrator override
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Bundle lines
    #[serde(default)]
    pub lines: Vec<LineFixture>,

    /// Image references
    #[serde(default)]
    pub images: Vec<String>,
}

/// Combo line fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Menu item key
    pub item: String,

    /// Quantity
    pub quantity: i64,
}

/// N×M draft fixture
#[derive(Debug, Deserialize)]
pub struct NxMFixture {
    /// Key tests and the CLI use to find the promotion
    pub key: String,

    /// Optional promotion name
    #[serde(default)]
    pub denomination: Option<String>,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Units bought
    pub buy: i64,

    /// Units paid for
    pub pay: i64,

    /// Menu item keys
    #[serde(default)]
    pub eligible_items: Vec<String>,

    /// Start of validity
    pub valid_from: DraftInstant,

    /// End of validity
    pub valid_until: DraftInstant,

    /// Administrator override
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Image references
    #[serde(default)]
    pub images: Vec<String>,
}

const fn enabled_by_default() -> bool {
    true
}

impl PromotionFixture {
    /// Fixture key
    pub fn key(&self) -> &str {
        match self {
            Self::Combo(combo) => &combo.key,
            Self::NxM(nxm) => &nxm.key,
        }
    }

    /// Resolve item keys and build the draft.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::ItemNotFound`] if a referenced item key is unknown.
    pub fn try_into_draft(
        self,
        items: &FxHashMap<String, ItemId>,
    ) -> Result<(String, PromotionDraft), FixtureError> {
        let resolve = |key: &str| {
            items
                .get(key)
                .copied()
                .ok_or_else(|| FixtureError::ItemNotFound(key.to_string()))
        };

        match self {
            Self::Combo(combo) => {
                let lines = combo
                    .lines
                    .iter()
                    .map(|line| {
                        Ok(DraftLine {
                            item: resolve(&line.item)?,
                            quantity: line.quantity,
                        })
                    })
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                let draft = ComboDraft {
                    denomination: combo.denomination,
                    description: combo.description,
                    discount_type: combo.discount_type,
                    discount_value: combo.discount_value,
                    valid_from: combo.valid_from,
                    valid_until: combo.valid_until,
                    enabled: combo.enabled,
                    lines,
                    images: combo.images,
                };

                Ok((combo.key, PromotionDraft::Combo(draft)))
            }
            Self::NxM(nxm) => {
                let eligible_items = nxm
                    .eligible_items
                    .iter()
                    .map(|key| resolve(key))
                    .collect::<Result<Vec<_>, FixtureError>>()?;

                let draft = NxMDraft {
                    denomination: nxm.denomination,
                    description: nxm.description,
                    buy: nxm.buy,
                    pay: nxm.pay,
                    eligible_items,
                    valid_from: nxm.valid_from,
                    valid_until: nxm.valid_until,
                    enabled: nxm.enabled,
                    images: nxm.images,
                };

                Ok((nxm.key, PromotionDraft::NxM(draft)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn parse(yaml: &str) -> Result<PromotionsFixture, serde_norway::Error> {
        serde_norway::from_str(yaml)
    }

    #[test]
    fn combo_fixture_resolves_item_keys() -> TestResult {
        let burger = ItemId::new();
        let items = FxHashMap::from_iter([("burger".to_string(), burger)]);

        let fixture = parse(
            r#"
promotions:
  - kind: combo
    key: lunch
    denomination: Lunch Combo
    discount_type: PERCENTAGE
    discount_value: 20
    valid_from: { date: "2024-01-10" }
    valid_until: { date: "2024-01-20" }
    lines:
      - item: burger
        quantity: 2
"#,
        )?;

        let mut fixtures = fixture.promotions.into_iter();

        let Some(promotion) = fixtures.next() else {
            unreachable!("expected a promotion");
        };

        assert_eq!(promotion.key(), "lunch");

        let (key, draft) = promotion.try_into_draft(&items)?;

        let PromotionDraft::Combo(combo) = draft else {
            unreachable!("expected a combo draft");
        };

        assert_eq!(key, "lunch");
        assert_eq!(
            combo.lines,
            vec![DraftLine {
                item: burger,
                quantity: 2
            }]
        );

        Ok(())
    }

    #[test]
    fn unknown_item_key_is_reported() -> TestResult {
        let fixture = parse(
            r#"
promotions:
  - kind: nxm
    key: tacos
    buy: 3
    pay: 2
    eligible_items: [taco]
    valid_from: { date: "2024-01-10" }
    valid_until: { date: "2024-01-20" }
"#,
        )?;

        let result = fixture
            .promotions
            .into_iter()
            .map(|promotion| promotion.try_into_draft(&FxHashMap::default()))
            .collect::<Result<Vec<_>, _>>();

        assert!(matches!(result, Err(FixtureError::ItemNotFound(key)) if key == "taco"));

        Ok(())
    }
}
