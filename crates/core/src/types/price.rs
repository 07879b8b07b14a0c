//! Coffee price in Hong Kong dollars, using decimal arithmetic.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CoffeePrice`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The input is not a number.
    #[error("price must be a number")]
    NotANumber,
    /// The number is outside the accepted range.
    #[error("price must be between {min} and {max}")]
    OutOfRange {
        /// Lowest accepted price.
        min: Decimal,
        /// Highest accepted price.
        max: Decimal,
    },
}

/// Approximate price of a coffee, in HKD.
///
/// ## Constraints
///
/// - Inclusive range 0-500
/// - At most two decimal places are kept (rounded half-even)
///
/// ```
/// use cafe_and_wifi_core::CoffeePrice;
///
/// assert!(CoffeePrice::parse("38.5").is_ok());
/// assert!(CoffeePrice::parse("-1").is_err());
/// assert!(CoffeePrice::parse("501").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoffeePrice(Decimal);

impl CoffeePrice {
    /// Lowest accepted price.
    pub const MIN: Decimal = Decimal::ZERO;
    /// Highest accepted price.
    pub const MAX: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

    /// Parse a price from user input.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not a decimal number or falls outside 0-500.
    pub fn parse(s: &str) -> Result<Self, PriceError> {
        let amount = Decimal::from_str(s.trim()).map_err(|_| PriceError::NotANumber)?;
        Self::new(amount)
    }

    /// Wrap an amount after checking the range.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::OutOfRange` if the amount falls outside 0-500.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount < Self::MIN || amount > Self::MAX {
            return Err(PriceError::OutOfRange {
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(amount.round_dp(2).normalize()))
    }

    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for CoffeePrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CoffeePrice {
    type Err = PriceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
