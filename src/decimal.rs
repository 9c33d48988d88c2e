use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// money type with 8 decimal places precision
///
/// all arithmetic on settlement paths goes through the checked methods;
/// there are no operator impls, so an overflow or a negative result is
/// always surfaced to the caller instead of wrapping or panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(8))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(8)))
    }

    /// create from integer amount (dollars, euros, etc)
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor amount (cents, satoshis, etc)
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        let d = Decimal::from(amount) / Decimal::from(10_u64.pow(scale));
        Money(d.round_dp(8))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// check if zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// check if strictly positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// minimum of two values
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// maximum of two values
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// add, `None` on numeric overflow
    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(|d| Money(d.round_dp(8)))
    }

    /// subtract, `None` when the result would be negative
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        let d = self.0.checked_sub(other.0)?;
        if d.is_sign_negative() {
            None
        } else {
            Some(Money(d.round_dp(8)))
        }
    }

    /// whole-number percentage of this amount (e.g. 20 -> one fifth)
    pub fn checked_percent(self, percent: u32) -> Option<Money> {
        let scaled = self.0.checked_mul(Decimal::from(percent))?;
        scaled
            .checked_div(Decimal::from(100))
            .map(|d| Money(d.round_dp(8)))
    }

    /// per-mille fraction of this amount (e.g. 25 -> 2.5%)
    pub fn checked_per_mille(self, per_mille: u32) -> Option<Money> {
        let scaled = self.0.checked_mul(Decimal::from(per_mille))?;
        scaled
            .checked_div(Decimal::from(1000))
            .map(|d| Money(d.round_dp(8)))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

/// rate type for interest rates and fee fractions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 5 for 5%)
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::from(p) / Decimal::from(100))
    }

    /// create from per-mille (e.g., 25 for 2.5%)
    pub fn from_per_mille(pm: u32) -> Self {
        Rate(Decimal::from(pm) / Decimal::from(1000))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    /// get as per-mille
    pub fn as_per_mille(&self) -> Decimal {
        self.0 * Decimal::from(1000)
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_precision() {
        let m = Money::from_str_exact("100.123456789").unwrap();
        assert_eq!(m.to_string(), "100.12345679"); // rounded to 8 places
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_major(800);
        let b = Money::from_str_exact("20.5").unwrap();
        assert_eq!(a.checked_add(b).unwrap(), Money::from_str_exact("820.5").unwrap());

        let max = Money::from_decimal(Decimal::MAX);
        assert!(max.checked_add(Money::ONE).is_none());
    }

    #[test]
    fn test_checked_sub_refuses_negative() {
        let a = Money::from_major(10);
        let b = Money::from_major(25);

        assert_eq!(b.checked_sub(a).unwrap(), Money::from_major(15));
        assert!(a.checked_sub(b).is_none());
        assert_eq!(a.checked_sub(a).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_checked_percent() {
        let principal = Money::from_major(1_000);
        assert_eq!(principal.checked_percent(20).unwrap(), Money::from_major(200));
        assert_eq!(principal.checked_percent(3).unwrap(), Money::from_major(30));
        assert_eq!(principal.checked_percent(0).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_checked_per_mille() {
        let down_payment = Money::from_major(200);
        assert_eq!(down_payment.checked_per_mille(25).unwrap(), Money::from_major(5));

        let odd = Money::from_major(333);
        assert_eq!(
            odd.checked_per_mille(25).unwrap(),
            Money::from_str_exact("8.325").unwrap()
        );
    }

    #[test]
    fn test_positivity() {
        assert!(Money::from_major(1).is_positive());
        assert!(!Money::ZERO.is_positive());
        assert!(!Money::from_major(-1).is_positive());
    }

    #[test]
    fn test_rate_conversions() {
        let rate = Rate::from_per_mille(45);
        assert_eq!(rate.as_decimal(), Decimal::new(45, 3));
        assert_eq!(rate.as_percentage(), Decimal::new(45, 1));
        assert_eq!(rate.as_per_mille(), Decimal::from(45));

        assert_eq!(Rate::from_percentage(5), Rate::from_per_mille(50));
    }
}
