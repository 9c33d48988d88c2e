/// quick start - minimal example to get started
use chrono::{TimeZone, Utc};
use credit_sale_rs::{
    AssetDescriptor, InMemoryLedger, LendingPolicy, LoanEngine, Money, OriginatorRegistry,
    SafeTimeProvider, TimeSource, Uuid,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    // parties
    let admin = Uuid::new_v4();
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    // a ledger holding the seller's asset and the buyer's cash
    let ledger = Arc::new(InMemoryLedger::new());
    let collection = Uuid::new_v4();
    ledger.grant_unique(seller, collection, 1);
    ledger.fund(buyer, Money::from_major(2_000));

    let registry = OriginatorRegistry::new(admin);
    registry.set_authorized_originator(admin, seller, true)?;

    let engine = LoanEngine::new(LendingPolicy::standard(), Arc::clone(&ledger), registry)?;

    // sell a $1,000 asset on credit: 20% down, one year to repay
    let asset = AssetDescriptor::Unique { collection, item: 1 };
    let loan_id = engine.create_loan(seller, asset, Money::from_major(1_000), 20, 365, &time)?;

    // the buyer pays the down payment, then repays the rest
    engine.start_loan(loan_id, buyer, Money::from_major(200), &time)?;
    engine.make_payment(loan_id, buyer, Money::from_major(820), &time)?;

    // print current state
    println!("{}", engine.loan(loan_id)?.json());

    Ok(())
}
