use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, PartyId};

#[derive(Error, Debug)]
pub enum LoanError {
    #[error("unauthorized: party {party} may not {action}")]
    Unauthorized {
        party: PartyId,
        action: String,
    },

    #[error("{parameter} out of range: {value} not within [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: String,
        value: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid {what} amount: {amount}")]
    InvalidAmount {
        what: String,
        amount: Money,
    },

    #[error("loan not found: {loan_id}")]
    LoanNotFound {
        loan_id: LoanId,
    },

    #[error("loan {loan_id} cannot {operation}: status is {status:?}")]
    InvalidState {
        loan_id: LoanId,
        operation: String,
        status: LoanStatus,
    },

    #[error("insufficient down payment for loan {loan_id}: required {required}, supplied {supplied}")]
    InsufficientDownPayment {
        loan_id: LoanId,
        required: Money,
        supplied: Money,
    },

    #[error("insufficient repayment to extend loan {loan_id}: required {required}, repaid {repaid}")]
    InsufficientRepaymentForExtension {
        loan_id: LoanId,
        required: Money,
        repaid: Money,
    },

    #[error("extension limit exceeded for loan {loan_id}: maximum {max_extensions}")]
    ExtensionLimitExceeded {
        loan_id: LoanId,
        max_extensions: u32,
    },

    #[error("deadline not reached for loan {loan_id}: deadline {deadline}, current time {now}")]
    DeadlineNotReached {
        loan_id: LoanId,
        deadline: DateTime<Utc>,
        now: DateTime<Utc>,
    },

    #[error("arithmetic overflow during {context}")]
    ArithmeticOverflow {
        context: String,
    },

    #[error("arithmetic underflow during {context}: {minuend} - {subtrahend}")]
    ArithmeticUnderflow {
        context: String,
        minuend: Money,
        subtrahend: Money,
    },

    #[error("custody transfer failed: {reason}")]
    CustodyTransferFailed {
        reason: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LoanError>;
