use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// breakdown of the amount owed on a loan
#[derive(Debug, Clone, PartialEq)]
pub struct DueCalculation {
    pub loan_amount: Money,
    pub interest: Money,
    pub total_due: Money,
    pub rate: Rate,
    pub effective_days: u32,
}

/// amount owed over the contracted term
///
/// simple non-compounding interest on a 365-day year basis, computed from
/// the contracted duration rather than elapsed wall-clock time. paying
/// early or late never changes the figure; extending the term does.
pub fn due_calculation(
    loan_amount: Money,
    rate: Rate,
    effective_days: u32,
) -> Result<DueCalculation> {
    let interest = loan_amount
        .as_decimal()
        .checked_mul(rate.as_decimal())
        .and_then(|d| d.checked_mul(Decimal::from(effective_days)))
        .and_then(|d| d.checked_div(Decimal::from(365)))
        .ok_or_else(|| LoanError::ArithmeticOverflow {
            context: "interest calculation".to_string(),
        })?;
    let interest = Money::from_decimal(interest);

    let total_due = loan_amount
        .checked_add(interest)
        .ok_or_else(|| LoanError::ArithmeticOverflow {
            context: "total due calculation".to_string(),
        })?;

    Ok(DueCalculation {
        loan_amount,
        interest,
        total_due,
        rate,
        effective_days,
    })
}

/// total amount owed, without the breakdown
pub fn total_due(loan_amount: Money, rate: Rate, effective_days: u32) -> Result<Money> {
    due_calculation(loan_amount, rate, effective_days).map(|calc| calc.total_due)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_year_at_25_per_mille() {
        let calc = due_calculation(Money::from_major(800), Rate::from_per_mille(25), 365).unwrap();

        assert_eq!(calc.interest, Money::from_major(20));
        assert_eq!(calc.total_due, Money::from_major(820));
    }

    #[test]
    fn test_extended_term_accrues_added_days() {
        let base = total_due(Money::from_major(800), Rate::from_per_mille(25), 365).unwrap();
        let extended = total_due(Money::from_major(800), Rate::from_per_mille(25), 395).unwrap();

        assert!(extended > base);
        // 800 * 0.025 * 395 / 365
        assert_eq!(extended, Money::from_str_exact("821.64383562").unwrap());
    }

    #[test]
    fn test_due_grows_with_rate_and_days() {
        let amount = Money::from_major(10_000);

        let low = total_due(amount, Rate::from_per_mille(25), 365).unwrap();
        let high = total_due(amount, Rate::from_per_mille(45), 365).unwrap();
        assert!(high > low);

        let short = total_due(amount, Rate::from_per_mille(45), 730).unwrap();
        let long = total_due(amount, Rate::from_per_mille(45), 1825).unwrap();
        assert!(long > short);
    }

    #[test]
    fn test_zero_rate_owes_exactly_the_loan_amount() {
        let amount = Money::from_major(500);
        assert_eq!(total_due(amount, Rate::ZERO, 5475).unwrap(), amount);
    }

    #[test]
    fn test_due_exceeds_loan_amount_under_positive_rate() {
        let amount = Money::from_major(1);
        let due = total_due(amount, Rate::from_per_mille(25), 365).unwrap();
        assert!(due > amount);
    }
}
