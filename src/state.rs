use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{AssetDescriptor, LoanId, LoanStatus, PartyId};

/// terms fixed when a loan is created, immutable afterwards
///
/// the interest rate is selected once from the schedule against the
/// original duration; later extensions never re-price it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub loan_id: LoanId,
    pub seller: PartyId,
    pub asset: AssetDescriptor,
    pub principal: Money,
    pub down_payment: Money,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub created_at: DateTime<Utc>,
}

/// one loan: fixed terms plus the mutable lifecycle fields
///
/// records in a terminal status are frozen and retained as the audit
/// trail; nothing deletes them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub terms: LoanTerms,
    pub buyer: Option<PartyId>,
    /// contracted term; grows by the extension increment, never shrinks
    pub duration_days: u32,
    pub extensions_used: u32,
    pub started_at: Option<DateTime<Utc>>,
    pub total_repaid: Money,
    pub payment_count: u32,
    pub last_payment_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub closed_at: Option<DateTime<Utc>>,
}

impl LoanRecord {
    /// create a new inactive record
    pub fn new(terms: LoanTerms, duration_days: u32) -> Self {
        Self {
            terms,
            buyer: None,
            duration_days,
            extensions_used: 0,
            started_at: None,
            total_repaid: Money::ZERO,
            payment_count: 0,
            last_payment_at: None,
            status: LoanStatus::Inactive,
            closed_at: None,
        }
    }

    pub fn loan_id(&self) -> LoanId {
        self.terms.loan_id
    }

    /// repayment deadline; `None` until the loan starts
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|started| started + Duration::days(self.duration_days as i64))
    }

    /// record the buyer and activation time
    pub fn activate(&mut self, buyer: PartyId, timestamp: DateTime<Utc>) {
        self.buyer = Some(buyer);
        self.started_at = Some(timestamp);
        self.status = LoanStatus::Active;
    }

    /// record one repayment instalment with the already-summed total
    pub fn record_payment(&mut self, new_total: Money, timestamp: DateTime<Utc>) {
        self.total_repaid = new_total;
        self.payment_count += 1;
        self.last_payment_at = Some(timestamp);
    }

    /// record one granted extension
    pub fn apply_extension(&mut self, new_duration_days: u32) {
        self.duration_days = new_duration_days;
        self.extensions_used += 1;
        self.status = LoanStatus::Extended;
    }

    /// move to a terminal status
    pub fn close(&mut self, status: LoanStatus, timestamp: DateTime<Utc>) {
        self.status = status;
        self.closed_at = Some(timestamp);
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}
