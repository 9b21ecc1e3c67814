//! Test Helpers

use carta::{
    discounts::DiscountType,
    ids::ItemId,
    promotions::{
        authoring::PromotionAuthor,
        drafts::{ComboDraft, DraftInstant, DraftLine, NxMDraft, PromotionDraft},
    },
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::USD;

/// Mid-window instant for the drafts below.
pub(crate) const MID_WINDOW: &str = "2024-01-15T12:00:00Z";

pub(crate) fn author() -> PromotionAuthor<'static> {
    PromotionAuthor::utc(USD)
}

pub(crate) fn mid_window() -> Result<Timestamp, jiff::Error> {
    MID_WINDOW.parse()
}

pub(crate) fn combo_draft(
    denomination: &str,
    discount_type: DiscountType,
    discount_value: i64,
    lines: &[(ItemId, i64)],
) -> PromotionDraft {
    PromotionDraft::Combo(ComboDraft {
        denomination: denomination.to_string(),
        description: None,
        discount_type,
        discount_value: Decimal::from(discount_value),
        valid_from: DraftInstant::new("2024-01-10", "00:00"),
        valid_until: DraftInstant::new("2024-01-20", "23:59"),
        enabled: true,
        lines: lines
            .iter()
            .map(|&(item, quantity)| DraftLine { item, quantity })
            .collect(),
        images: Vec::new(),
    })
}

/// 20% off two of `item`.
pub(crate) fn lunch_combo(item: ItemId) -> PromotionDraft {
    combo_draft("Lunch Combo", DiscountType::Percentage, 20, &[(item, 2)])
}

pub(crate) fn nxm_draft(buy: i64, pay: i64, eligible_items: &[ItemId]) -> PromotionDraft {
    PromotionDraft::NxM(NxMDraft {
        denomination: None,
        description: None,
        buy,
        pay,
        eligible_items: eligible_items.to_vec(),
        valid_from: DraftInstant::new("2024-01-10", "00:00"),
        valid_until: DraftInstant::new("2024-01-20", "23:59"),
        enabled: true,
        images: Vec::new(),
    })
}
