use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LoanError, Result};

/// smallest accepted down payment, percent of principal
pub const MIN_DOWN_PAYMENT_PERCENT: u32 = 3;
/// largest accepted down payment, percent of principal
pub const MAX_DOWN_PAYMENT_PERCENT: u32 = 85;
/// shortest accepted term
pub const MIN_DURATION_DAYS: u32 = 365;
/// longest accepted term (15 years)
pub const MAX_DURATION_DAYS: u32 = 5475;
/// default fee retained from the down payment, per mille
pub const DEFAULT_FEE_PER_MILLE: u32 = 25;
/// term added by one extension
pub const EXTENSION_INCREMENT_DAYS: u32 = 30;
/// extensions allowed over a loan's lifetime
pub const MAX_EXTENSIONS: u32 = 3;

/// one band of the duration-tiered interest schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTier {
    /// tier applies to durations up to and including this many days
    pub max_duration_days: u32,
    /// annual interest, per mille
    pub rate_per_mille: u32,
}

/// duration-tiered annual interest schedule
///
/// the rate is fixed at creation from the original duration and never
/// re-priced, so the lookup depends on duration alone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateSchedule {
    tiers: Vec<RateTier>,
    above_per_mille: u32,
}

impl RateSchedule {
    pub fn new(tiers: Vec<RateTier>, above_per_mille: u32) -> Self {
        Self {
            tiers,
            above_per_mille,
        }
    }

    /// standard schedule: 2.5%/yr up to one year, 4.5%/yr up to five
    /// years, 7.0%/yr beyond
    pub fn standard() -> Self {
        Self::new(
            vec![
                RateTier {
                    max_duration_days: 365,
                    rate_per_mille: 25,
                },
                RateTier {
                    max_duration_days: 1825,
                    rate_per_mille: 45,
                },
            ],
            70,
        )
    }

    /// annual rate in per mille for the given term
    pub fn rate_per_mille_for(&self, duration_days: u32) -> u32 {
        for tier in &self.tiers {
            if duration_days <= tier.max_duration_days {
                return tier.rate_per_mille;
            }
        }
        self.above_per_mille
    }

    /// annual rate for the given term
    pub fn rate_for(&self, duration_days: u32) -> Rate {
        Rate::from_per_mille(self.rate_per_mille_for(duration_days))
    }

    fn is_sorted(&self) -> bool {
        self.tiers
            .windows(2)
            .all(|w| w[0].max_duration_days < w[1].max_duration_days)
    }
}

/// lending policy injected into the engine at construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendingPolicy {
    pub min_down_payment_percent: u32,
    pub max_down_payment_percent: u32,
    pub min_duration_days: u32,
    pub max_duration_days: u32,
    pub default_fee_per_mille: u32,
    pub extension_increment_days: u32,
    pub max_extensions: u32,
    pub rate_schedule: RateSchedule,
}

impl LendingPolicy {
    /// standard marketplace policy
    pub fn standard() -> Self {
        Self {
            min_down_payment_percent: MIN_DOWN_PAYMENT_PERCENT,
            max_down_payment_percent: MAX_DOWN_PAYMENT_PERCENT,
            min_duration_days: MIN_DURATION_DAYS,
            max_duration_days: MAX_DURATION_DAYS,
            default_fee_per_mille: DEFAULT_FEE_PER_MILLE,
            extension_increment_days: EXTENSION_INCREMENT_DAYS,
            max_extensions: MAX_EXTENSIONS,
            rate_schedule: RateSchedule::standard(),
        }
    }

    /// check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.min_down_payment_percent == 0 || self.max_down_payment_percent >= 100 {
            return Err(LoanError::InvalidConfiguration {
                message: "down payment percent bounds must stay within (0, 100)".to_string(),
            });
        }
        if self.min_down_payment_percent > self.max_down_payment_percent {
            return Err(LoanError::InvalidConfiguration {
                message: "minimum down payment percent exceeds maximum".to_string(),
            });
        }
        if self.min_duration_days == 0 || self.min_duration_days > self.max_duration_days {
            return Err(LoanError::InvalidConfiguration {
                message: "invalid duration bounds".to_string(),
            });
        }
        if self.extension_increment_days == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "extension increment must be at least one day".to_string(),
            });
        }
        if !self.rate_schedule.is_sorted() {
            return Err(LoanError::InvalidConfiguration {
                message: "rate schedule tiers must be sorted by duration".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self::standard()
    }
}
