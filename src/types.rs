use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan, assigned sequentially by the engine
pub type LoanId = u64;

/// identity of a seller, buyer, originator, or administrator
pub type PartyId = Uuid;

/// asset sold on credit
///
/// opaque to the engine; only custody adapters interpret the contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetDescriptor {
    /// fungible token balance
    Fungible { token: Uuid, amount: Decimal },
    /// unique token from a collection
    Unique { collection: Uuid, item: u64 },
}

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// created by the seller, waiting for a buyer
    Inactive,
    /// buyer paid the down payment, repayment in progress
    Active,
    /// repayment in progress under an extended term
    Extended,
    /// fully repaid, asset released to the buyer
    Completed,
    /// deadline missed, asset returned to the seller
    Defaulted,
}

impl LoanStatus {
    /// check if this is a final status
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Completed | LoanStatus::Defaulted)
    }

    /// check if repayments are accepted in this status
    pub fn accepts_payments(&self) -> bool {
        matches!(self, LoanStatus::Active | LoanStatus::Extended)
    }

    /// check if a buyer has activated the loan
    pub fn is_started(&self) -> bool {
        !matches!(self, LoanStatus::Inactive)
    }
}

/// outcome of a repayment instalment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub loan_id: LoanId,
    pub amount: Money,
    pub total_repaid: Money,
    pub total_due: Money,
    pub completed: bool,
    pub timestamp: DateTime<Utc>,
}

/// outcome of a term extension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtensionReceipt {
    pub loan_id: LoanId,
    pub new_duration_days: u32,
    pub extensions_used: u32,
    pub total_due: Money,
    pub timestamp: DateTime<Utc>,
}

/// split of custodied value when a loan defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultSettlement {
    pub loan_id: LoanId,
    pub fee_to_seller: Money,
    pub refund_to_buyer: Money,
    pub timestamp: DateTime<Utc>,
}
