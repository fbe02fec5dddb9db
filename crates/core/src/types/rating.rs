//! Review rating.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`Rating`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RatingError {
    /// The input is not a whole number.
    #[error("rating must be a whole number")]
    NotANumber,
    /// Outside the 1-5 star range.
    #[error("rating must be between {min} and {max}")]
    OutOfRange {
        /// Lowest allowed rating.
        min: i16,
        /// Highest allowed rating.
        max: i16,
    },
}

/// A one to five star book rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub struct Rating(i16);

impl Rating {
    /// Lowest rating.
    pub const MIN: i16 = 1;
    /// Highest rating.
    pub const MAX: i16 = 5;

    /// Parse a rating from raw form text.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not an integer in `1..=5`.
    pub fn parse(input: &str) -> Result<Self, RatingError> {
        let value = input
            .trim()
            .parse::<i16>()
            .map_err(|_| RatingError::NotANumber)?;
        Self::try_from(value)
    }

    /// The number of stars.
    #[must_use]
    pub const fn get(self) -> i16 {
        self.0
    }
}

impl TryFrom<i16> for Rating {
    type Error = RatingError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(RatingError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            })
        }
    }
}

impl From<Rating> for i16 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounds() {
        assert_eq!(Rating::parse("1").unwrap().get(), 1);
        assert_eq!(Rating::parse(" 5 ").unwrap().get(), 5);
        assert!(matches!(
            Rating::parse("0"),
            Err(RatingError::OutOfRange { .. })
        ));
        assert!(matches!(
            Rating::parse("6"),
            Err(RatingError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Rating::parse("great"), Err(RatingError::NotANumber));
        assert_eq!(Rating::parse(""), Err(RatingError::NotANumber));
    }
}
