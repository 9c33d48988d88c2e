/// lifecycle - a credit sale from offer to completion
use chrono::{TimeZone, Utc};
use credit_sale_rs::{
    AssetDescriptor, InMemoryLedger, LendingPolicy, LoanEngine, LoanStatus, Money,
    OriginatorRegistry, SafeTimeProvider, TimeSource, Uuid,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== credit sale lifecycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let admin = Uuid::new_v4();
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    let ledger = Arc::new(InMemoryLedger::new());
    let collection = Uuid::new_v4();
    ledger.grant_unique(seller, collection, 7);
    ledger.fund(buyer, Money::from_major(5_000));

    let registry = OriginatorRegistry::new(admin);
    registry.set_authorized_originator(admin, seller, true)?;
    let engine = LoanEngine::new(LendingPolicy::standard(), Arc::clone(&ledger), registry)?;

    // 1. offer
    println!("1. offer phase");
    println!("--------------");
    let asset = AssetDescriptor::Unique { collection, item: 7 };
    let loan_id = engine.create_loan(seller, asset, Money::from_major(1_000), 20, 365, &time)?;
    let record = engine.loan(loan_id)?;
    println!("  date: {}", time.now().format("%Y-%m-%d"));
    println!("  status: {:?}", record.status);
    println!("  principal: ${}", record.terms.principal.as_decimal());
    println!("  down payment: ${}", record.terms.down_payment.as_decimal());
    println!("  loan amount: ${}", record.terms.loan_amount.as_decimal());
    println!("  rate: {} per year", record.terms.interest_rate);
    println!("  total due: ${}", engine.total_due(loan_id)?.as_decimal());

    // 2. activation
    println!("\n2. activation phase");
    println!("-------------------");
    engine.start_loan(loan_id, buyer, Money::from_major(200), &time)?;
    println!("  ✓ down payment accepted, asset escrowed");
    println!("  status: {:?}", engine.loan(loan_id)?.status);
    println!("  asset holder: {:?}", ledger.holder_of_unique(collection, 7));

    // 3. repayment
    println!("\n3. repayment phase");
    println!("------------------");
    for amount in [300, 300] {
        let receipt = engine.make_payment(loan_id, buyer, Money::from_major(amount), &time)?;
        println!(
            "  ✓ paid ${}: total repaid ${} of ${}",
            receipt.amount.as_decimal(),
            receipt.total_repaid.as_decimal(),
            receipt.total_due.as_decimal()
        );
    }

    // 4. completion
    println!("\n4. completion phase");
    println!("-------------------");
    let receipt = engine.make_payment(loan_id, buyer, Money::from_major(220), &time)?;
    println!("  ✓ final payment of ${}", receipt.amount.as_decimal());
    let record = engine.loan(loan_id)?;
    println!("  status: {:?}", record.status);
    assert_eq!(record.status, LoanStatus::Completed);
    println!("  asset holder: {:?}", ledger.holder_of_unique(collection, 7));
    println!(
        "  seller received: ${}",
        ledger.cash_balance(seller).as_decimal()
    );

    // 5. audit trail
    println!("\n5. audit trail");
    println!("--------------");
    for event in engine.take_events() {
        println!("  {:?}", event);
    }

    Ok(())
}
