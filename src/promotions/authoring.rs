//! Promotion Authoring
//!
//! Validates combo and N×M drafts and normalizes both into the same canonical
//! [`PromotionDefinition`]. N×M drafts become a plain percentage discount over their
//! eligible items; the buy/pay pair is not recoverable from the result.

use jiff::{
    Timestamp,
    civil::{self, Date, Time},
    tz::TimeZone,
};
use rust_decimal::{Decimal, RoundingStrategy};
use rustc_hash::FxHashSet;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    discounts::{DiscountType, PromotionDiscount, major_to_minor},
    ids::ItemId,
    promotions::{
        DetailLine, PromotionDefinition, PromotionKind, ValidityWindow,
        drafts::{ComboDraft, DraftInstant, DraftLine, NxMDraft, PromotionDraft},
        validation::{FieldErrorKind, PromotionField, ValidationErrors},
    },
};

/// Shortest accepted denomination, in characters.
pub const MIN_DENOMINATION_CHARS: usize = 3;

/// Smallest accepted N×M "buy" count.
pub const MIN_NXM_BUY: i64 = 2;

/// Smallest accepted N×M "pay" count.
pub const MIN_NXM_PAY: i64 = 1;

/// Turns drafts into canonical promotion definitions.
#[derive(Debug, Clone)]
pub struct PromotionAuthor<'a> {
    time_zone: TimeZone,
    currency: &'a Currency,
}

impl<'a> PromotionAuthor<'a> {
    /// Create an author that reads draft dates in `time_zone` and fixed amounts in `currency`.
    pub fn new(time_zone: TimeZone, currency: &'a Currency) -> Self {
        Self {
            time_zone,
            currency,
        }
    }

    /// Create an author that reads draft dates as UTC.
    pub fn utc(currency: &'a Currency) -> Self {
        Self::new(TimeZone::UTC, currency)
    }

    /// Time zone used to combine draft dates and times.
    pub fn time_zone(&self) -> &TimeZone {
        &self.time_zone
    }

    /// Currency of fixed amount discounts.
    pub fn currency(&self) -> &'a Currency {
        self.currency
    }

    /// Validate and normalize either draft shape.
    ///
    /// # Errors
    ///
    /// Returns every field error found in the draft.
    pub fn normalize(
        &self,
        draft: &PromotionDraft,
    ) -> Result<PromotionDefinition<'a>, ValidationErrors> {
        match draft {
            PromotionDraft::Combo(combo) => self.validate_combo(combo),
            PromotionDraft::NxM(nxm) => self.validate_nxm(nxm),
        }
    }

    /// Validate a combo draft.
    ///
    /// # Errors
    ///
    /// Returns every field error found in the draft.
    pub fn validate_combo(
        &self,
        draft: &ComboDraft,
    ) -> Result<PromotionDefinition<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let denomination = check_denomination(&draft.denomination, &mut errors);
        let discount = self.check_discount(draft.discount_type, draft.discount_value, &mut errors);
        let window = self.check_window(&draft.valid_from, &draft.valid_until, &mut errors);
        let lines = check_combo_lines(&draft.lines, &mut errors);

        let minimum_quantity = u32::try_from(draft.minimum_quantity()).ok();

        if lines.is_some() && minimum_quantity.is_none() {
            errors.push(PromotionField::Lines, FieldErrorKind::TooLarge);
        }

        let (Some(denomination), Some(discount), Some(window), Some(lines), Some(minimum_quantity)) =
            (denomination, discount, window, lines, minimum_quantity)
        else {
            return Err(errors);
        };

        errors.into_result(PromotionDefinition::new(
            denomination,
            non_blank(draft.description.as_deref()),
            PromotionKind::Combo,
            discount,
            minimum_quantity,
            window,
            draft.enabled,
            lines,
            draft.images.clone(),
        ))
    }

    /// Validate an N×M draft and convert it to its percentage equivalent.
    ///
    /// # Errors
    ///
    /// Returns every field error found in the draft.
    pub fn validate_nxm(
        &self,
        draft: &NxMDraft,
    ) -> Result<PromotionDefinition<'a>, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let denomination = match non_blank(draft.denomination.as_deref()) {
            Some(denomination) => check_denomination(&denomination, &mut errors),
            None => Some(format!("Promotion {}x{}", draft.buy, draft.pay)),
        };

        let description = non_blank(draft.description.as_deref())
            .unwrap_or_else(|| format!("Buy {}, pay {}", draft.buy, draft.pay));

        let counts = check_buy_pay(draft.buy, draft.pay, &mut errors);
        let eligible = check_eligible_items(&draft.eligible_items, &mut errors);
        let window = self.check_window(&draft.valid_from, &draft.valid_until, &mut errors);

        let (Some(denomination), Some((buy, pay)), Some(eligible), Some(window)) =
            (denomination, counts, eligible, window)
        else {
            return Err(errors);
        };

        let lines = eligible
            .into_iter()
            .map(|item| DetailLine::new(item, 1))
            .collect();

        errors.into_result(PromotionDefinition::new(
            denomination,
            Some(description),
            PromotionKind::NxM,
            PromotionDiscount::Percentage(nxm_discount_points(buy, pay)),
            buy,
            window,
            draft.enabled,
            lines,
            draft.images.clone(),
        ))
    }

    fn check_discount(
        &self,
        discount_type: DiscountType,
        value: Decimal,
        errors: &mut ValidationErrors,
    ) -> Option<PromotionDiscount<'a>> {
        if value < Decimal::ZERO {
            errors.push(PromotionField::DiscountValue, FieldErrorKind::Negative);

            return None;
        }

        match discount_type {
            DiscountType::Percentage if value > Decimal::ONE_HUNDRED => {
                errors.push(
                    PromotionField::DiscountValue,
                    FieldErrorKind::PercentageOutOfRange,
                );

                None
            }
            DiscountType::Percentage => Some(PromotionDiscount::Percentage(value)),
            DiscountType::FixedAmount => {
                let Some(minor) = major_to_minor(value, self.currency) else {
                    errors.push(PromotionField::DiscountValue, FieldErrorKind::TooLarge);

                    return None;
                };

                Some(PromotionDiscount::FixedAmount(Money::from_minor(
                    minor,
                    self.currency,
                )))
            }
        }
    }

    fn check_window(
        &self,
        from: &DraftInstant,
        until: &DraftInstant,
        errors: &mut ValidationErrors,
    ) -> Option<ValidityWindow> {
        let from = self
            .parse_instant(from, Time::midnight())
            .map_err(|kind| errors.push(PromotionField::ValidFrom, kind))
            .ok();

        let until = self
            .parse_instant(until, civil::time(23, 59, 0, 0))
            .map_err(|kind| errors.push(PromotionField::ValidUntil, kind))
            .ok();

        let (from, until) = (from?, until?);

        let window = ValidityWindow::new(from, until);

        if window.is_none() {
            errors.push(PromotionField::ValidUntil, FieldErrorKind::NotAfterStart);
        }

        window
    }

    fn parse_instant(
        &self,
        instant: &DraftInstant,
        default_time: Time,
    ) -> Result<Timestamp, FieldErrorKind> {
        let date: Date = instant
            .date
            .trim()
            .parse()
            .map_err(|err: jiff::Error| FieldErrorKind::Unparseable(err.to_string()))?;

        let time = match non_blank(instant.time.as_deref()) {
            Some(time) => time
                .parse()
                .map_err(|err: jiff::Error| FieldErrorKind::Unparseable(err.to_string()))?,
            None => default_time,
        };

        date.to_datetime(time)
            .to_zoned(self.time_zone.clone())
            .map(|zoned| zoned.timestamp())
            .map_err(|err| FieldErrorKind::Unparseable(err.to_string()))
    }
}

/// Percentage points equivalent to "buy `buy`, pay `pay`", rounded to a whole point.
pub fn nxm_discount_points(buy: u32, pay: u32) -> Decimal {
    let free = Decimal::from(buy.saturating_sub(pay));

    free.checked_div(Decimal::from(buy))
        .and_then(|fraction| fraction.checked_mul(Decimal::ONE_HUNDRED))
        .map_or(Decimal::ZERO, |points| {
            points.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn check_denomination(denomination: &str, errors: &mut ValidationErrors) -> Option<String> {
    let denomination = denomination.trim();

    if denomination.chars().count() < MIN_DENOMINATION_CHARS {
        errors.push(
            PromotionField::Denomination,
            FieldErrorKind::TooShort {
                min: MIN_DENOMINATION_CHARS,
            },
        );

        return None;
    }

    Some(denomination.to_string())
}

fn check_combo_lines(
    lines: &[DraftLine],
    errors: &mut ValidationErrors,
) -> Option<SmallVec<[DetailLine; 4]>> {
    if lines.is_empty() {
        errors.push(PromotionField::Lines, FieldErrorKind::Empty);

        return None;
    }

    let mut valid = SmallVec::with_capacity(lines.len());
    let mut all_valid = true;

    for (index, line) in lines.iter().enumerate() {
        if line.quantity < 1 {
            errors.push(
                PromotionField::LineQuantity(index),
                FieldErrorKind::BelowMinimum { min: 1 },
            );

            all_valid = false;

            continue;
        }

        let Ok(quantity) = u32::try_from(line.quantity) else {
            errors.push(PromotionField::LineQuantity(index), FieldErrorKind::TooLarge);

            all_valid = false;

            continue;
        };

        valid.push(DetailLine::new(line.item, quantity));
    }

    all_valid.then_some(valid)
}

fn check_buy_pay(buy: i64, pay: i64, errors: &mut ValidationErrors) -> Option<(u32, u32)> {
    let before = errors.len();

    if buy < MIN_NXM_BUY {
        errors.push(
            PromotionField::Buy,
            FieldErrorKind::BelowMinimum { min: MIN_NXM_BUY },
        );
    } else if u32::try_from(buy).is_err() {
        errors.push(PromotionField::Buy, FieldErrorKind::TooLarge);
    }

    if pay < MIN_NXM_PAY {
        errors.push(
            PromotionField::Pay,
            FieldErrorKind::BelowMinimum { min: MIN_NXM_PAY },
        );
    }

    if pay >= buy {
        errors.push(PromotionField::Pay, FieldErrorKind::NotLessThanBuy);
    }

    if errors.len() > before {
        return None;
    }

    Some((u32::try_from(buy).ok()?, u32::try_from(pay).ok()?))
}

fn check_eligible_items(items: &[ItemId], errors: &mut ValidationErrors) -> Option<Vec<ItemId>> {
    if items.is_empty() {
        errors.push(PromotionField::EligibleItems, FieldErrorKind::Empty);

        return None;
    }

    let mut seen = FxHashSet::default();

    Some(
        items
            .iter()
            .copied()
            .filter(|item| seen.insert(*item))
            .collect(),
    )
}
