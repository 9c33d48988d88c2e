use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{AssetDescriptor, LoanId, PartyId};

/// all events emitted by the loan engine
///
/// each lifecycle transition emits its event exactly once, after the
/// transition and any custody movement have both succeeded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    LoanCreated {
        loan_id: LoanId,
        seller: PartyId,
        asset: AssetDescriptor,
        principal: Money,
        down_payment: Money,
        loan_amount: Money,
        interest_rate: Rate,
        duration_days: u32,
        timestamp: DateTime<Utc>,
    },
    LoanStarted {
        loan_id: LoanId,
        buyer: PartyId,
        down_payment: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentMade {
        loan_id: LoanId,
        payer: PartyId,
        amount: Money,
        total_repaid: Money,
        timestamp: DateTime<Utc>,
    },
    LoanExtended {
        loan_id: LoanId,
        new_duration_days: u32,
        extensions_used: u32,
        timestamp: DateTime<Utc>,
    },
    LoanCompleted {
        loan_id: LoanId,
        buyer: PartyId,
        seller: PartyId,
        total_repaid: Money,
        timestamp: DateTime<Utc>,
    },
    LoanDefaulted {
        loan_id: LoanId,
        seller: PartyId,
        buyer: PartyId,
        fee_to_seller: Money,
        refund_to_buyer: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
