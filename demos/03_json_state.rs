/// json state - serialization for debugging and monitoring
use chrono::{TimeZone, Utc};
use credit_sale_rs::{
    AssetDescriptor, InMemoryLedger, LendingPolicy, LoanEngine, Money, OriginatorRegistry,
    SafeTimeProvider, TimeSource, Uuid,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json state serialization ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let admin = Uuid::new_v4();
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    let ledger = Arc::new(InMemoryLedger::new());
    let collection = Uuid::new_v4();
    ledger.grant_unique(seller, collection, 1);
    ledger.fund(buyer, Money::from_major(2_000));

    let registry = OriginatorRegistry::new(admin);
    registry.set_authorized_originator(admin, seller, true)?;
    let engine = LoanEngine::new(LendingPolicy::standard(), Arc::clone(&ledger), registry)?;

    let asset = AssetDescriptor::Unique { collection, item: 1 };
    let loan_id = engine.create_loan(seller, asset, Money::from_major(1_000), 20, 365, &time)?;

    // stage 1: the open offer
    println!("stage 1: offer created");
    println!("----------------------");
    println!("{}\n", engine.loan(loan_id)?.json());

    // stage 2: activated
    engine.start_loan(loan_id, buyer, Money::from_major(200), &time)?;
    println!("stage 2: started");
    println!("----------------");
    println!("{}\n", engine.loan(loan_id)?.json());

    // stage 3: mid repayment
    engine.make_payment(loan_id, buyer, Money::from_major(400), &time)?;
    println!("stage 3: after a $400 payment");
    println!("-----------------------------");
    println!("{}\n", engine.loan(loan_id)?.json());

    // stage 4: completed
    engine.make_payment(loan_id, buyer, Money::from_major(420), &time)?;
    println!("stage 4: completed");
    println!("------------------");
    println!("{}\n", engine.loan(loan_id)?.json());

    // events serialize the same way
    println!("emitted events:");
    println!("---------------");
    println!("{}", serde_json::to_string_pretty(&engine.take_events())?);

    Ok(())
}
