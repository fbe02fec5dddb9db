//! Cart line quantity.

use core::fmt;
use core::num::IntErrorKind;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// Nothing was entered.
    #[error("quantity is required")]
    Empty,
    /// The input is not a whole number.
    #[error("quantity must be a whole number")]
    NotANumber,
    /// Zero or negative.
    #[error("quantity must be at least 1")]
    NotPositive,
    /// Larger than a single line may hold.
    #[error("quantity must be at most {max}")]
    TooLarge {
        /// Maximum allowed quantity.
        max: i32,
    },
}

/// A positive number of copies of one book.
///
/// Quantities come from a free-text form field. Parsing here is what keeps
/// malformed or non-positive values from ever reaching the cart procedures.
///
/// ```
/// use bookstore_core::Quantity;
///
/// assert_eq!(Quantity::parse(" 3 ").unwrap().get(), 3);
/// assert!(Quantity::parse("0").is_err());
/// assert!(Quantity::parse("two").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    /// Largest quantity accepted for a single add.
    pub const MAX: i32 = 999;

    /// Parse a quantity from raw form text.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input is empty, is not an integer, is
    /// zero or negative, or exceeds [`Quantity::MAX`].
    pub fn parse(input: &str) -> Result<Self, QuantityError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuantityError::Empty);
        }

        let value = trimmed.parse::<i32>().map_err(|e| match e.kind() {
            IntErrorKind::PosOverflow => QuantityError::TooLarge { max: Self::MAX },
            IntErrorKind::NegOverflow => QuantityError::NotPositive,
            _ => QuantityError::NotANumber,
        })?;

        Self::try_from(value)
    }

    /// The number of copies.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if value <= 0 {
            return Err(QuantityError::NotPositive);
        }
        if value > Self::MAX {
            return Err(QuantityError::TooLarge { max: Self::MAX });
        }
        Ok(Self(value))
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        quantity.0
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
