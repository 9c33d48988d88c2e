/// extension and default - the other paths out of an active loan
use chrono::{Duration, TimeZone, Utc};
use credit_sale_rs::{
    AssetDescriptor, InMemoryLedger, LendingPolicy, LoanEngine, LoanError, Money,
    OriginatorRegistry, SafeTimeProvider, TimeSource, Uuid,
};
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== extension and default ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let admin = Uuid::new_v4();
    let seller = Uuid::new_v4();
    let buyer = Uuid::new_v4();

    let ledger = Arc::new(InMemoryLedger::new());
    let collection = Uuid::new_v4();
    ledger.grant_unique(seller, collection, 1);
    ledger.fund(buyer, Money::from_major(5_000));

    let registry = OriginatorRegistry::new(admin);
    registry.set_authorized_originator(admin, seller, true)?;
    let engine = LoanEngine::new(LendingPolicy::standard(), Arc::clone(&ledger), registry)?;

    let asset = AssetDescriptor::Unique { collection, item: 1 };
    let loan_id = engine.create_loan(seller, asset, Money::from_major(1_000), 20, 365, &time)?;
    engine.start_loan(loan_id, buyer, Money::from_major(200), &time)?;

    // 1. extension gate
    println!("1. extension gate");
    println!("-----------------");
    match engine.extend_loan(loan_id, &time) {
        Err(LoanError::InsufficientRepaymentForExtension {
            required, repaid, ..
        }) => {
            println!(
                "  ✗ too early: ${} repaid of ${} required",
                repaid.as_decimal(),
                required.as_decimal()
            );
        }
        other => println!("  unexpected: {:?}", other),
    }

    engine.make_payment(loan_id, buyer, Money::from_major(400), &time)?;
    println!("  ✓ repaid $400, half the loan amount");

    // 2. extend up to the limit
    println!("\n2. extensions");
    println!("-------------");
    for _ in 0..3 {
        let receipt = engine.extend_loan(loan_id, &time)?;
        println!(
            "  ✓ extension {}: {} days, total due ${}",
            receipt.extensions_used,
            receipt.new_duration_days,
            receipt.total_due.as_decimal()
        );
    }
    match engine.extend_loan(loan_id, &time) {
        Err(LoanError::ExtensionLimitExceeded { max_extensions, .. }) => {
            println!("  ✗ limit reached after {} extensions", max_extensions);
        }
        other => println!("  unexpected: {:?}", other),
    }

    // 3. the deadline passes
    println!("\n3. default");
    println!("----------");
    let deadline = engine.loan(loan_id)?.deadline().unwrap();
    println!("  deadline: {}", deadline.format("%Y-%m-%d"));
    controller.advance(Duration::days(456));
    println!("  date: {}", time.now().format("%Y-%m-%d"));

    let settlement = engine.default_loan(loan_id, &time)?;
    println!("  ✓ loan defaulted");
    println!("  fee to seller: ${}", settlement.fee_to_seller.as_decimal());
    println!(
        "  refund to buyer: ${}",
        settlement.refund_to_buyer.as_decimal()
    );
    println!("  asset holder: {:?}", ledger.holder_of_unique(collection, 1));
    println!("  final status: {:?}", engine.loan(loan_id)?.status);

    Ok(())
}
