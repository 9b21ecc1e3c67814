//! Promotion Drafts
//!
//! User-supplied, unvalidated promotion input. A draft is turned into a canonical
//! [`PromotionDefinition`](crate::promotions::PromotionDefinition) by
//! [`PromotionAuthor::normalize`](crate::promotions::authoring::PromotionAuthor::normalize).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{discounts::DiscountType, ids::ItemId, promotions::PromotionKind};

/// A promotion draft in one of the two authored shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PromotionDraft {
    /// Fixed bundle draft.
    Combo(ComboDraft),

    /// Buy-N-pay-M draft.
    #[serde(rename = "nxm")]
    NxM(NxMDraft),
}

impl PromotionDraft {
    /// Kind of promotion the draft authors.
    pub fn kind(&self) -> PromotionKind {
        match self {
            Self::Combo(_) => PromotionKind::Combo,
            Self::NxM(_) => PromotionKind::NxM,
        }
    }
}

/// A date with an optional time of day, interpreted in the authoring time zone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftInstant {
    /// Calendar date, `YYYY-MM-DD`.
    pub date: String,

    /// Time of day, `HH:MM` or `HH:MM:SS`.
    #[serde(default)]
    pub time: Option<String>,
}

impl DraftInstant {
    /// Create an instant from a date and time.
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: Some(time.into()),
        }
    }

    /// Create an instant from a date alone.
    pub fn date(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: None,
        }
    }
}

/// One line of a combo draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftLine {
    /// Referenced item.
    pub item: ItemId,

    /// Requested quantity; must be at least 1 to validate.
    pub quantity: i64,
}

/// Combo promotion draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboDraft {
    /// Promotion name.
    pub denomination: String,

    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,

    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,

    /// Percentage points or currency amount.
    pub discount_value: Decimal,

    /// Start of validity.
    pub valid_from: DraftInstant,

    /// End of validity.
    pub valid_until: DraftInstant,

    /// Administrator override.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Bundle lines.
    #[serde(default)]
    pub lines: Vec<DraftLine>,

    /// Display-only image references.
    #[serde(default)]
    pub images: Vec<String>,
}

impl ComboDraft {
    /// Units required to redeem the combo, derived from the current lines.
    ///
    /// Always at least 1, even while the draft has no lines.
    pub fn minimum_quantity(&self) -> i64 {
        self.lines
            .iter()
            .fold(0_i64, |sum, line| sum.saturating_add(line.quantity))
            .max(1)
    }

    /// Append a line.
    pub fn push_line(&mut self, item: ItemId, quantity: i64) {
        self.lines.push(DraftLine { item, quantity });
    }

    /// Remove the line at `index`, if present.
    pub fn remove_line(&mut self, index: usize) -> Option<DraftLine> {
        (index < self.lines.len()).then(|| self.lines.remove(index))
    }

    /// Change the quantity of the line at `index`. Returns `false` if there is no such line.
    pub fn set_quantity(&mut self, index: usize, quantity: i64) -> bool {
        self.lines
            .get_mut(index)
            .map(|line| line.quantity = quantity)
            .is_some()
    }
}

/// Buy-N-pay-M promotion draft.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NxMDraft {
    /// Promotion name; synthesized from `buy` and `pay` when absent.
    #[serde(default)]
    pub denomination: Option<String>,

    /// Optional description; synthesized when absent.
    #[serde(default)]
    pub description: Option<String>,

    /// Units bought.
    pub buy: i64,

    /// Units paid for.
    pub pay: i64,

    /// Items any of which count towards the bundle.
    #[serde(default)]
    pub eligible_items: Vec<ItemId>,

    /// Start of validity.
    pub valid_from: DraftInstant,

    /// End of validity.
    pub valid_until: DraftInstant,

    /// Administrator override.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,

    /// Display-only image references.
    #[serde(default)]
    pub images: Vec<String>,
}

const fn enabled_by_default() -> bool {
    true
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub(crate) fn combo_draft(lines: &[(ItemId, i64)]) -> ComboDraft {
        ComboDraft {
            denomination: "Lunch Combo".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(20),
            valid_from: DraftInstant::new("2024-01-10", "00:00"),
            valid_until: DraftInstant::new("2024-01-20", "23:59"),
            enabled: true,
            lines: lines
                .iter()
                .map(|&(item, quantity)| DraftLine { item, quantity })
                .collect(),
            images: Vec::new(),
        }
    }

    pub(crate) fn nxm_draft(buy: i64, pay: i64, eligible_items: &[ItemId]) -> NxMDraft {
        NxMDraft {
            denomination: None,
            description: None,
            buy,
            pay,
            eligible_items: eligible_items.to_vec(),
            valid_from: DraftInstant::new("2024-01-10", "00:00"),
            valid_until: DraftInstant::new("2024-01-20", "23:59"),
            enabled: true,
            images: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::{test_support::*, *};

    #[test]
    fn minimum_quantity_sums_line_quantities() {
        let draft = combo_draft(&[(ItemId::new(), 2), (ItemId::new(), 1)]);

        assert_eq!(draft.minimum_quantity(), 3);
    }

    #[test]
    fn minimum_quantity_is_at_least_one() {
        let draft = combo_draft(&[]);

        assert_eq!(draft.minimum_quantity(), 1);
    }

    #[test]
    fn minimum_quantity_follows_line_edits() {
        let burger = ItemId::new();
        let fries = ItemId::new();
        let soda = ItemId::new();

        let mut draft = combo_draft(&[(burger, 2)]);

        draft.push_line(fries, 1);
        assert_eq!(draft.minimum_quantity(), 3);

        draft.push_line(soda, 4);
        assert_eq!(draft.minimum_quantity(), 7);

        assert!(draft.set_quantity(0, 1));
        assert_eq!(draft.minimum_quantity(), 6);

        let removed = draft.remove_line(2);

        assert_eq!(removed.map(|line| line.item), Some(soda));
        assert_eq!(draft.minimum_quantity(), 2);

        assert!(draft.remove_line(5).is_none());
        assert!(!draft.set_quantity(5, 3));
        assert_eq!(draft.minimum_quantity(), 2);
    }

    #[test]
    fn drafts_deserialize_by_kind_tag() -> TestResult {
        let yaml = r#"
kind: nxm
buy: 3
pay: 2
eligible_items: ["019c8e08-0000-7000-8000-000000000001"]
valid_from:
  date: "2024-01-10"
valid_until:
  date: "2024-01-20"
  time: "23:59"
"#;

        let draft: PromotionDraft = serde_norway::from_str(yaml)?;

        let PromotionDraft::NxM(nxm) = draft else {
            unreachable!("expected an N×M draft");
        };

        assert_eq!(nxm.buy, 3);
        assert_eq!(nxm.pay, 2);
        assert_eq!(nxm.eligible_items.len(), 1);
        assert!(nxm.enabled);
        assert_eq!(nxm.valid_from.time, None);

        Ok(())
    }

    #[test]
    fn combo_draft_deserializes_discount_type() -> TestResult {
        let yaml = r#"
kind: combo
denomination: Lunch
discount_type: FIXED_AMOUNT
discount_value: 3.50
valid_from:
  date: "2024-01-10"
valid_until:
  date: "2024-01-20"
lines:
  - item: "019c8e08-0000-7000-8000-000000000001"
    quantity: 2
"#;

        let draft: PromotionDraft = serde_norway::from_str(yaml)?;

        let PromotionDraft::Combo(combo) = draft else {
            unreachable!("expected a combo draft");
        };

        assert_eq!(combo.discount_type, DiscountType::FixedAmount);
        assert_eq!(combo.discount_value, Decimal::new(350, 2));
        assert_eq!(combo.minimum_quantity(), 2);

        Ok(())
    }
}
