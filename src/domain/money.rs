use crate::error::CoursePayError;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const MINOR_PER_MAJOR: Decimal = dec!(100);

/// A monetary value in minor currency units (e.g. paise, cents).
///
/// Prices and order amounts are always carried in minor units so that the
/// amount handed to the payment gateway is an exact integer. Conversion from
/// and to major units goes through `rust_decimal::Decimal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(u64);

impl Money {
    pub const ZERO: Self = Self(0);

    pub fn from_minor(units: u64) -> Self {
        Self(units)
    }

    /// Converts a major-unit amount (e.g. `499.50`) into minor units.
    ///
    /// Negative amounts and amounts with more precision than one minor unit
    /// are rejected.
    pub fn from_major(amount: Decimal) -> Result<Self, CoursePayError> {
        if amount.is_sign_negative() {
            return Err(CoursePayError::validation("Price must not be negative"));
        }

        let minor = amount * MINOR_PER_MAJOR;
        if minor.fract() != Decimal::ZERO {
            return Err(CoursePayError::validation(format!(
                "Price {amount} has more than two decimal places"
            )));
        }

        minor
            .to_u64()
            .map(Self)
            .ok_or_else(|| CoursePayError::validation(format!("Price {amount} is out of range")))
    }

    pub fn minor_units(&self) -> u64 {
        self.0
    }

    pub fn to_major(&self) -> Decimal {
        Decimal::from(self.0) / MINOR_PER_MAJOR
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_mul(self, factor: u64) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.to_major())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_conversion() {
        assert_eq!(Money::from_major(dec!(499.5)).unwrap(), Money::from_minor(49950));
        assert_eq!(Money::from_major(dec!(0)).unwrap(), Money::ZERO);
        assert!(matches!(
            Money::from_major(dec!(1.005)),
            Err(CoursePayError::ValidationError(_))
        ));
        assert!(matches!(
            Money::from_major(dec!(-1)),
            Err(CoursePayError::ValidationError(_))
        ));
    }

    #[test]
    fn test_display_in_major_units() {
        assert_eq!(Money::from_minor(200000).to_string(), "2000.00");
        assert_eq!(Money::from_minor(5).to_major(), dec!(0.05));
    }

    #[test]
    fn test_checked_operations() {
        assert_eq!(
            Money::from_minor(500).checked_add(Money::from_minor(1500)),
            Some(Money::from_minor(2000))
        );
        assert_eq!(Money::from_minor(u64::MAX).checked_add(Money::from_minor(1)), None);
        assert_eq!(Money::from_minor(300).checked_mul(3), Some(Money::from_minor(900)));
    }
}
