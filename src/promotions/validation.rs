//! Promotion Validation Errors

use std::{error::Error, fmt};

use smallvec::SmallVec;
use thiserror::Error;

/// A draft field an error can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromotionField {
    /// Promotion name.
    Denomination,

    /// Discount value.
    DiscountValue,

    /// Start of validity.
    ValidFrom,

    /// End of validity.
    ValidUntil,

    /// Combo line list as a whole.
    Lines,

    /// Quantity of the combo line at this index.
    LineQuantity(usize),

    /// N×M "buy" count.
    Buy,

    /// N×M "pay" count.
    Pay,

    /// N×M eligible item set.
    EligibleItems,
}

impl fmt::Display for PromotionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denomination => f.write_str("denomination"),
            Self::DiscountValue => f.write_str("discount_value"),
            Self::ValidFrom => f.write_str("valid_from"),
            Self::ValidUntil => f.write_str("valid_until"),
            Self::Lines => f.write_str("lines"),
            Self::LineQuantity(index) => write!(f, "lines[{index}].quantity"),
            Self::Buy => f.write_str("buy"),
            Self::Pay => f.write_str("pay"),
            Self::EligibleItems => f.write_str("eligible_items"),
        }
    }
}

/// What is wrong with a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
    /// Text shorter than required.
    #[error("must be at least {min} characters")]
    TooShort {
        /// Minimum number of characters.
        min: usize,
    },

    /// Date or time could not be parsed.
    #[error("could not be parsed: {0}")]
    Unparseable(String),

    /// End of validity is not after its start.
    #[error("must be after the start of validity")]
    NotAfterStart,

    /// Value is negative.
    #[error("must not be negative")]
    Negative,

    /// Percentage outside `0..=100`.
    #[error("percentage must be between 0 and 100")]
    PercentageOutOfRange,

    /// Value is too large to be represented.
    #[error("is too large")]
    TooLarge,

    /// Collection is empty.
    #[error("must not be empty")]
    Empty,

    /// Integer below its minimum.
    #[error("must be at least {min}")]
    BelowMinimum {
        /// Smallest accepted value.
        min: i64,
    },

    /// N×M "pay" is not strictly less than "buy".
    #[error("must be less than the buy quantity")]
    NotLessThanBuy,
}

/// An error attached to a single field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {kind}")]
pub struct FieldError {
    /// Offending field.
    pub field: PromotionField,

    /// Problem with the field.
    pub kind: FieldErrorKind,
}

/// Every field error found in a draft.
///
/// Validation never stops at the first problem, so one submission reports them all.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: SmallVec<[FieldError; 4]>,
}

impl ValidationErrors {
    /// Create an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field.
    pub fn push(&mut self, field: PromotionField, kind: FieldErrorKind) {
        self.errors.push(FieldError { field, kind });
    }

    /// Whether no errors were recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of recorded errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterate over all errors, in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// Errors recorded against one field.
    pub fn for_field(&self, field: PromotionField) -> impl Iterator<Item = &FieldErrorKind> {
        self.errors
            .iter()
            .filter(move |error| error.field == field)
            .map(|error| &error.kind)
    }

    /// Whether any error was recorded against the field.
    pub fn contains(&self, field: PromotionField) -> bool {
        self.for_field(field).next().is_some()
    }

    /// Return `value` if no errors were recorded, otherwise the errors.
    ///
    /// # Errors
    ///
    /// Returns `self` when it is not empty.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "promotion draft is invalid")?;

        for (idx, error) in self.errors.iter().enumerate() {
            let separator = if idx == 0 { ": " } else { "; " };

            write!(f, "{separator}{error}")?;
        }

        Ok(())
    }
}

impl Error for ValidationErrors {}

impl<'e> IntoIterator for &'e ValidationErrors {
    type Item = &'e FieldError;
    type IntoIter = std::slice::Iter<'e, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}
