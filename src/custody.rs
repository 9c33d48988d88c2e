use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decimal::Money;
use crate::types::{AssetDescriptor, LoanId, PartyId};

/// escrow slot holding a loan's asset while repayment is in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscrowAccount(pub LoanId);

/// failure reported by a custody adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct CustodyError {
    pub reason: String,
}

impl CustodyError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// executes asset and value movement on the engine's instruction
///
/// each call is all-or-nothing: a returned error must mean nothing moved,
/// since the engine rolls the loan record back on failure. adapters must
/// not call back into the engine for the same loan while a call is in
/// flight, as the engine holds that loan's lock across the call.
pub trait CustodyAdapter: Send + Sync {
    /// move the asset from the seller into escrow at activation
    fn pull_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: PartyId,
        into: EscrowAccount,
    ) -> Result<(), CustodyError>;

    /// hand the escrowed asset to its final owner
    fn release_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: EscrowAccount,
        to: PartyId,
    ) -> Result<(), CustodyError>;

    /// collect repayment value from a party into the engine float
    fn accept_value(&self, from: PartyId, amount: Money) -> Result<(), CustodyError>;

    /// pay value out of the engine float
    fn pay_out(&self, to: PartyId, amount: Money) -> Result<(), CustodyError>;
}

/// a shared adapter is an adapter
impl<C: CustodyAdapter + ?Sized> CustodyAdapter for Arc<C> {
    fn pull_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: PartyId,
        into: EscrowAccount,
    ) -> Result<(), CustodyError> {
        (**self).pull_asset(descriptor, from, into)
    }

    fn release_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: EscrowAccount,
        to: PartyId,
    ) -> Result<(), CustodyError> {
        (**self).release_asset(descriptor, from, to)
    }

    fn accept_value(&self, from: PartyId, amount: Money) -> Result<(), CustodyError> {
        (**self).accept_value(from, amount)
    }

    fn pay_out(&self, to: PartyId, amount: Money) -> Result<(), CustodyError> {
        (**self).pay_out(to, amount)
    }
}
