//! Quantities

use std::{fmt, num::NonZeroU32};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when building a [`Quantity`] from raw input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// The value was zero or negative.
    #[error("quantity must be at least 1, got {0}")]
    NotPositive(i64),

    /// The value does not fit in a line quantity.
    #[error("quantity {0} is too large")]
    TooLarge(i64),
}

/// A cart line quantity. Always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Validate a raw quantity.
    ///
    /// # Errors
    ///
    /// - [`QuantityError::NotPositive`]: `value` is below 1.
    /// - [`QuantityError::TooLarge`]: `value` exceeds `u32::MAX`.
    pub fn new(value: i64) -> Result<Self, QuantityError> {
        if value < 1 {
            return Err(QuantityError::NotPositive(value));
        }

        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(QuantityError::TooLarge(value))
    }

    /// The quantity as a plain integer.
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Add two quantities, returning `None` on overflow.
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.get()).map(Self)
    }
}

impl TryFrom<i64> for Quantity {
    type Error = QuantityError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl From<Quantity> for i64 {
    fn from(quantity: Quantity) -> Self {
        i64::from(quantity.get())
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
