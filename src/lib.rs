pub mod authorization;
pub mod config;
pub mod custody;
pub mod decimal;
pub mod engine;
pub mod errors;
pub mod events;
pub mod interest;
pub mod ledger;
pub mod state;
pub mod types;

// re-export key types
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use authorization::{AuthorizationAdapter, OriginatorRegistry};
pub use config::{LendingPolicy, RateSchedule, RateTier};
pub use custody::{CustodyAdapter, CustodyError, EscrowAccount};
pub use engine::LoanEngine;
pub use interest::{due_calculation, total_due, DueCalculation};
pub use ledger::{Holder, InMemoryLedger};
pub use state::{LoanRecord, LoanTerms};
pub use types::{
    AssetDescriptor, DefaultSettlement, ExtensionReceipt, LoanId, LoanStatus, PartyId,
    PaymentReceipt,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
