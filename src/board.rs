//! Boards
//!
//! Text tables for an admin promotion list and a per-item offer list. Lifecycle states and
//! offers are derived at the board's instant every time a board is written.

use std::io;

use jiff::{Timestamp, tz::TimeZone};
use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    catalog::Catalog,
    items::SellableItem,
    offers::{OfferError, best_offer},
    pricing::{PricingError, compute_totals},
    promotions::{Promotion, lifecycle::LifecycleState},
};

/// Errors that can occur when writing a board.
#[derive(Debug, Error)]
pub enum BoardError {
    /// Totals for a promotion could not be computed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// An offer could not be resolved.
    #[error(transparent)]
    Offer(#[from] OfferError),

    /// Writing the table failed.
    #[error("failed to write board: {0}")]
    Io(#[from] io::Error),
}

/// Renders promotion and offer tables as seen at one instant.
#[derive(Debug, Clone)]
pub struct Board {
    now: Timestamp,
    time_zone: TimeZone,
}

impl Board {
    /// Create a board for `now`, showing dates in `time_zone`.
    pub fn new(now: Timestamp, time_zone: TimeZone) -> Self {
        Self { now, time_zone }
    }

    /// Instant states and offers are derived at.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Write every promotion with its state and bundle totals.
    ///
    /// # Errors
    ///
    /// Returns an error if totals cannot be computed for a promotion, or if writing fails.
    pub fn write_promotions<'a>(
        &self,
        mut out: impl io::Write,
        promotions: &[Promotion<'a>],
        catalog: &impl Catalog<'a>,
    ) -> Result<(), BoardError> {
        let mut builder = Builder::default();

        builder.push_record([
            "Promotion",
            "Kind",
            "Discount",
            "State",
            "Valid From",
            "Valid Until",
            "Min Qty",
            "Original",
            "Discounted",
            "Savings",
        ]);

        let mut states = Vec::with_capacity(promotions.len());

        for promotion in promotions {
            let totals = compute_totals(promotion, catalog)?;
            let state = promotion.state_at(self.now);

            states.push(state);

            builder.push_record([
                promotion.denomination().to_string(),
                promotion.kind().to_string(),
                promotion.discount().to_string(),
                state.to_string(),
                self.format_instant(promotion.valid_from()),
                self.format_instant(promotion.valid_until()),
                promotion.minimum_quantity().to_string(),
                totals.original.to_string(),
                totals.discounted.to_string(),
                totals.savings.to_string(),
            ]);
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(6..10), Alignment::right());

        for (idx, state) in states.into_iter().enumerate() {
            table.modify((idx + 1, 3), state_color(state));
        }

        writeln!(out, "\n{table}")?;

        Ok(())
    }

    /// Write the best active offer for each item.
    ///
    /// # Errors
    ///
    /// Returns an error if an offer cannot be resolved, or if writing fails.
    pub fn write_offers<'i, 'a: 'i>(
        &self,
        mut out: impl io::Write,
        items: impl IntoIterator<Item = &'i SellableItem<'a>>,
        promotions: &[Promotion<'a>],
    ) -> Result<(), BoardError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Unit Price", "Best Promotion", "Offer", "Offer Price"]);

        for item in items {
            let active = promotions
                .iter()
                .filter(|promotion| promotion.state_at(self.now).is_active());

            match best_offer(item, active)? {
                Some(offer) => builder.push_record([
                    item.name().to_string(),
                    item.price().to_string(),
                    offer.promotion().denomination().to_string(),
                    offer.label().to_string(),
                    offer.unit_price_after_discount().to_string(),
                ]),
                None => builder.push_record([
                    item.name().to_string(),
                    item.price().to_string(),
                    "-".to_string(),
                    "-".to_string(),
                    item.price().to_string(),
                ]),
            }
        }

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..2), Alignment::right());
        table.modify(Columns::new(4..5), Alignment::right());

        writeln!(out, "\n{table}")?;

        Ok(())
    }

    fn format_instant(&self, instant: Timestamp) -> String {
        instant
            .to_zoned(self.time_zone.clone())
            .strftime("%Y-%m-%d %H:%M")
            .to_string()
    }
}

fn state_color(state: LifecycleState) -> Color {
    match state {
        LifecycleState::Active => Color::FG_GREEN,
        LifecycleState::Scheduled => Color::FG_YELLOW,
        LifecycleState::Expired | LifecycleState::Inactive => color_dark_grey(),
    }
}

/// ANSI dark grey (states that cannot be offered).
fn color_dark_grey() -> Color {
    Color::new("\x1b[90m", "\x1b[0m")
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::USD};
    use testresult::TestResult;

    use crate::{
        catalog::MenuCatalog,
        ids::{ItemId, PromotionId},
        promotions::test_support::{combo, percentage},
    };

    use super::*;

    fn board() -> Result<Board, jiff::Error> {
        Ok(Board::new("2024-01-15T12:00:00Z".parse()?, TimeZone::UTC))
    }

    #[test]
    fn promotion_board_lists_states_and_totals() -> TestResult {
        let burger = SellableItem::new(ItemId::new(), "Burger", Money::from_minor(1000, USD));
        let promotions = [
            Promotion::new(
                PromotionId::new(),
                combo("Lunch Combo", percentage(20), &[(burger.id(), 2)]),
            ),
            Promotion::new(
                PromotionId::new(),
                combo("Old Deal", percentage(10), &[(burger.id(), 1)]).with_enabled(false),
            ),
        ];
        let catalog: MenuCatalog<'_> = [burger].into_iter().collect();

        let mut out = Vec::new();

        board()?.write_promotions(&mut out, &promotions, &catalog)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Lunch Combo"));
        assert!(rendered.contains("ACTIVE"));
        assert!(rendered.contains("INACTIVE"));
        assert!(rendered.contains("20% OFF"));
        assert!(rendered.contains("2024-01-10 00:00"));

        Ok(())
    }

    #[test]
    fn offer_board_marks_items_without_offers() -> TestResult {
        let burger = SellableItem::new(ItemId::new(), "Burger", Money::from_minor(1000, USD));
        let salad = SellableItem::new(ItemId::new(), "Salad", Money::from_minor(725, USD));
        let promotions = [Promotion::new(
            PromotionId::new(),
            combo("Lunch Combo", percentage(20), &[(burger.id(), 2)]),
        )];

        let mut out = Vec::new();

        board()?.write_offers(&mut out, [&burger, &salad], &promotions)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Lunch Combo"));
        assert!(rendered.contains("Salad"));
        assert!(rendered.contains(" - "));

        Ok(())
    }

    #[test]
    fn promotion_board_reports_missing_items() -> TestResult {
        let promotions = [Promotion::new(
            PromotionId::new(),
            combo("Ghost", percentage(20), &[(ItemId::new(), 1)]),
        )];
        let catalog = MenuCatalog::new();

        let result = board()?.write_promotions(Vec::new(), &promotions, &catalog);

        assert!(matches!(result, Err(BoardError::Pricing(PricingError::Catalog(_)))));

        Ok(())
    }
}
