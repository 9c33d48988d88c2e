use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use hourglass_rs::SafeTimeProvider;

use crate::authorization::AuthorizationAdapter;
use crate::config::LendingPolicy;
use crate::custody::{CustodyAdapter, CustodyError, EscrowAccount};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{self, DueCalculation};
use crate::state::{LoanRecord, LoanTerms};
use crate::types::{
    AssetDescriptor, DefaultSettlement, ExtensionReceipt, LoanId, LoanStatus, PartyId,
    PaymentReceipt,
};

/// loan lifecycle engine
///
/// generic over the custody and authorization adapters. all operations
/// take `&self`, so one engine is shared across threads; each operation
/// holds its target loan's lock for the whole call, making validation,
/// state mutation, custody movement, and event emission atomic per loan
/// while distinct loans proceed in parallel.
pub struct LoanEngine<C, A> {
    policy: LendingPolicy,
    custody: C,
    authorizer: A,
    loans: RwLock<HashMap<LoanId, Arc<Mutex<LoanRecord>>>>,
    next_id: AtomicU64,
    events: Mutex<EventStore>,
}

/// one custody instruction inside a settlement
#[derive(Debug, Clone)]
enum CustodyStep {
    PullAsset {
        descriptor: AssetDescriptor,
        from: PartyId,
        into: EscrowAccount,
    },
    ReleaseAsset {
        descriptor: AssetDescriptor,
        from: EscrowAccount,
        to: PartyId,
    },
    AcceptValue {
        from: PartyId,
        amount: Money,
    },
    PayOut {
        to: PartyId,
        amount: Money,
    },
}

impl CustodyStep {
    /// the step that reverses this one
    fn inverse(&self) -> CustodyStep {
        match self {
            CustodyStep::PullAsset {
                descriptor,
                from,
                into,
            } => CustodyStep::ReleaseAsset {
                descriptor: descriptor.clone(),
                from: *into,
                to: *from,
            },
            CustodyStep::ReleaseAsset {
                descriptor,
                from,
                to,
            } => CustodyStep::PullAsset {
                descriptor: descriptor.clone(),
                from: *to,
                into: *from,
            },
            CustodyStep::AcceptValue { from, amount } => CustodyStep::PayOut {
                to: *from,
                amount: *amount,
            },
            CustodyStep::PayOut { to, amount } => CustodyStep::AcceptValue {
                from: *to,
                amount: *amount,
            },
        }
    }
}

fn lock_record(slot: &Arc<Mutex<LoanRecord>>) -> MutexGuard<'_, LoanRecord> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<C, A> LoanEngine<C, A>
where
    C: CustodyAdapter,
    A: AuthorizationAdapter,
{
    /// create an engine; the policy is validated up front
    pub fn new(policy: LendingPolicy, custody: C, authorizer: A) -> Result<Self> {
        policy.validate()?;
        Ok(Self {
            policy,
            custody,
            authorizer,
            loans: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            events: Mutex::new(EventStore::new()),
        })
    }

    pub fn policy(&self) -> &LendingPolicy {
        &self.policy
    }

    /// create a loan offer for an asset
    ///
    /// the originator must be approved by the authorization adapter and
    /// becomes the seller of record. no value moves; the offer waits in
    /// `Inactive` until a buyer starts it.
    pub fn create_loan(
        &self,
        originator: PartyId,
        asset: AssetDescriptor,
        principal: Money,
        down_payment_percent: u32,
        duration_days: u32,
        time: &SafeTimeProvider,
    ) -> Result<LoanId> {
        if !self.authorizer.is_authorized_originator(originator) {
            return Err(LoanError::Unauthorized {
                party: originator,
                action: "create loans".to_string(),
            });
        }
        if down_payment_percent < self.policy.min_down_payment_percent
            || down_payment_percent > self.policy.max_down_payment_percent
        {
            return Err(LoanError::ParameterOutOfRange {
                parameter: "down payment percent".to_string(),
                value: down_payment_percent,
                min: self.policy.min_down_payment_percent,
                max: self.policy.max_down_payment_percent,
            });
        }
        if duration_days < self.policy.min_duration_days
            || duration_days > self.policy.max_duration_days
        {
            return Err(LoanError::ParameterOutOfRange {
                parameter: "duration days".to_string(),
                value: duration_days,
                min: self.policy.min_duration_days,
                max: self.policy.max_duration_days,
            });
        }
        if !principal.is_positive() {
            return Err(LoanError::InvalidAmount {
                what: "principal".to_string(),
                amount: principal,
            });
        }

        let down_payment = principal
            .checked_percent(down_payment_percent)
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: "down payment calculation".to_string(),
            })?;
        let loan_amount =
            principal
                .checked_sub(down_payment)
                .ok_or_else(|| LoanError::ArithmeticUnderflow {
                    context: "loan amount calculation".to_string(),
                    minuend: principal,
                    subtrahend: down_payment,
                })?;
        // dust principals can round either leg down to zero
        if !down_payment.is_positive() || !loan_amount.is_positive() {
            return Err(LoanError::InvalidAmount {
                what: "principal".to_string(),
                amount: principal,
            });
        }

        let interest_rate = self.policy.rate_schedule.rate_for(duration_days);
        let now = time.now();
        let loan_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let terms = LoanTerms {
            loan_id,
            seller: originator,
            asset: asset.clone(),
            principal,
            down_payment,
            loan_amount,
            interest_rate,
            created_at: now,
        };
        let record = LoanRecord::new(terms, duration_days);

        // emitted before the slot is visible to other operations, so the
        // creation event always precedes the loan's lifecycle events
        let mut loans = self
            .loans
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.emit(Event::LoanCreated {
            loan_id,
            seller: originator,
            asset,
            principal,
            down_payment,
            loan_amount,
            interest_rate,
            duration_days,
            timestamp: now,
        });
        loans.insert(loan_id, Arc::new(Mutex::new(record)));

        Ok(loan_id)
    }

    /// activate a loan
    ///
    /// the buyer supplies at least the required down payment; the asset
    /// moves from the seller into escrow and the value is collected. on a
    /// custody failure the loan stays `Inactive` and can be started again.
    pub fn start_loan(
        &self,
        loan_id: LoanId,
        buyer: PartyId,
        down_payment: Money,
        time: &SafeTimeProvider,
    ) -> Result<()> {
        let slot = self.slot(loan_id)?;
        let mut record = lock_record(&slot);

        if record.status != LoanStatus::Inactive {
            return Err(LoanError::InvalidState {
                loan_id,
                operation: "start".to_string(),
                status: record.status,
            });
        }
        if !down_payment.is_positive() {
            return Err(LoanError::InvalidAmount {
                what: "down payment".to_string(),
                amount: down_payment,
            });
        }
        if down_payment < record.terms.down_payment {
            return Err(LoanError::InsufficientDownPayment {
                loan_id,
                required: record.terms.down_payment,
                supplied: down_payment,
            });
        }

        let now = time.now();
        let seller = record.terms.seller;
        let asset = record.terms.asset.clone();
        let snapshot: LoanRecord = record.clone();

        record.activate(buyer, now);

        let steps = [
            CustodyStep::PullAsset {
                descriptor: asset,
                from: seller,
                into: EscrowAccount(loan_id),
            },
            CustodyStep::AcceptValue {
                from: buyer,
                amount: down_payment,
            },
        ];
        if let Err(err) = self.run_custody(&steps) {
            *record = snapshot;
            return Err(LoanError::CustodyTransferFailed {
                reason: err.to_string(),
            });
        }

        self.emit(Event::LoanStarted {
            loan_id,
            buyer,
            down_payment,
            timestamp: now,
        });
        Ok(())
    }

    /// repay part of the loan
    ///
    /// only the buyer may pay. when the accumulated total meets the amount
    /// owed, completion settles within the same call: the asset is released
    /// to the buyer and the full repayment total is paid to the seller. a
    /// custody failure rolls the whole payment back.
    pub fn make_payment(
        &self,
        loan_id: LoanId,
        payer: PartyId,
        amount: Money,
        time: &SafeTimeProvider,
    ) -> Result<PaymentReceipt> {
        let slot = self.slot(loan_id)?;
        let mut record = lock_record(&slot);

        if !record.status.accepts_payments() {
            return Err(LoanError::InvalidState {
                loan_id,
                operation: "accept a payment".to_string(),
                status: record.status,
            });
        }
        let buyer = match record.buyer {
            Some(buyer) => buyer,
            None => {
                return Err(LoanError::InvalidState {
                    loan_id,
                    operation: "accept a payment".to_string(),
                    status: record.status,
                })
            }
        };
        if payer != buyer {
            return Err(LoanError::Unauthorized {
                party: payer,
                action: format!("repay loan {loan_id}"),
            });
        }
        if !amount.is_positive() {
            return Err(LoanError::InvalidAmount {
                what: "payment".to_string(),
                amount,
            });
        }

        let new_total =
            record
                .total_repaid
                .checked_add(amount)
                .ok_or_else(|| LoanError::ArithmeticOverflow {
                    context: "repayment accumulation".to_string(),
                })?;
        let total_due = interest::total_due(
            record.terms.loan_amount,
            record.terms.interest_rate,
            record.duration_days,
        )?;
        let completing = new_total >= total_due;

        let now = time.now();
        let seller = record.terms.seller;
        let asset = record.terms.asset.clone();
        let snapshot: LoanRecord = record.clone();

        record.record_payment(new_total, now);
        if completing {
            record.close(LoanStatus::Completed, now);
        }

        let mut steps = vec![CustodyStep::AcceptValue {
            from: payer,
            amount,
        }];
        if completing {
            steps.push(CustodyStep::ReleaseAsset {
                descriptor: asset,
                from: EscrowAccount(loan_id),
                to: buyer,
            });
            steps.push(CustodyStep::PayOut {
                to: seller,
                amount: new_total,
            });
        }
        if let Err(err) = self.run_custody(&steps) {
            *record = snapshot;
            return Err(LoanError::CustodyTransferFailed {
                reason: err.to_string(),
            });
        }

        self.emit(Event::PaymentMade {
            loan_id,
            payer,
            amount,
            total_repaid: new_total,
            timestamp: now,
        });
        if completing {
            self.emit(Event::LoanCompleted {
                loan_id,
                buyer,
                seller,
                total_repaid: new_total,
                timestamp: now,
            });
        }

        Ok(PaymentReceipt {
            loan_id,
            amount,
            total_repaid: new_total,
            total_due,
            completed: completing,
            timestamp: now,
        })
    }

    /// lengthen the term by one increment
    ///
    /// available while repayment is in progress, at most `max_extensions`
    /// times, once at least half the loan amount has been repaid. the
    /// added days accrue interest at the unchanged original rate.
    pub fn extend_loan(&self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<ExtensionReceipt> {
        let slot = self.slot(loan_id)?;
        let mut record = lock_record(&slot);

        if !record.status.accepts_payments() {
            return Err(LoanError::InvalidState {
                loan_id,
                operation: "be extended".to_string(),
                status: record.status,
            });
        }
        if record.extensions_used >= self.policy.max_extensions {
            return Err(LoanError::ExtensionLimitExceeded {
                loan_id,
                max_extensions: self.policy.max_extensions,
            });
        }
        let required =
            record
                .terms
                .loan_amount
                .checked_percent(50)
                .ok_or_else(|| LoanError::ArithmeticOverflow {
                    context: "extension threshold calculation".to_string(),
                })?;
        if record.total_repaid < required {
            return Err(LoanError::InsufficientRepaymentForExtension {
                loan_id,
                required,
                repaid: record.total_repaid,
            });
        }
        let new_duration = record
            .duration_days
            .checked_add(self.policy.extension_increment_days)
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: "duration extension".to_string(),
            })?;
        let total_due = interest::total_due(
            record.terms.loan_amount,
            record.terms.interest_rate,
            new_duration,
        )?;

        let now = time.now();
        record.apply_extension(new_duration);

        self.emit(Event::LoanExtended {
            loan_id,
            new_duration_days: new_duration,
            extensions_used: record.extensions_used,
            timestamp: now,
        });

        Ok(ExtensionReceipt {
            loan_id,
            new_duration_days: new_duration,
            extensions_used: record.extensions_used,
            total_due,
            timestamp: now,
        })
    }

    /// settle a loan whose deadline has passed
    ///
    /// strictly after the deadline only. the asset returns to the seller,
    /// who also receives the default fee out of the buyer's repayments;
    /// the remainder is refunded to the buyer. when the repayments do not
    /// cover the fee the operation fails closed and the loan stays open.
    pub fn default_loan(
        &self,
        loan_id: LoanId,
        time: &SafeTimeProvider,
    ) -> Result<DefaultSettlement> {
        let slot = self.slot(loan_id)?;
        let mut record = lock_record(&slot);

        if !record.status.accepts_payments() {
            return Err(LoanError::InvalidState {
                loan_id,
                operation: "be defaulted".to_string(),
                status: record.status,
            });
        }
        let (buyer, deadline) = match (record.buyer, record.deadline()) {
            (Some(buyer), Some(deadline)) => (buyer, deadline),
            _ => {
                return Err(LoanError::InvalidState {
                    loan_id,
                    operation: "be defaulted".to_string(),
                    status: record.status,
                })
            }
        };
        let now = time.now();
        if now <= deadline {
            return Err(LoanError::DeadlineNotReached {
                loan_id,
                deadline,
                now,
            });
        }

        let fee = record
            .terms
            .down_payment
            .checked_per_mille(self.policy.default_fee_per_mille)
            .ok_or_else(|| LoanError::ArithmeticOverflow {
                context: "default fee calculation".to_string(),
            })?;
        let refund =
            record
                .total_repaid
                .checked_sub(fee)
                .ok_or_else(|| LoanError::ArithmeticUnderflow {
                    context: "default refund calculation".to_string(),
                    minuend: record.total_repaid,
                    subtrahend: fee,
                })?;

        let seller = record.terms.seller;
        let asset = record.terms.asset.clone();
        let snapshot: LoanRecord = record.clone();

        record.close(LoanStatus::Defaulted, now);

        let steps = [
            CustodyStep::ReleaseAsset {
                descriptor: asset,
                from: EscrowAccount(loan_id),
                to: seller,
            },
            CustodyStep::PayOut {
                to: seller,
                amount: fee,
            },
            CustodyStep::PayOut {
                to: buyer,
                amount: refund,
            },
        ];
        if let Err(err) = self.run_custody(&steps) {
            *record = snapshot;
            return Err(LoanError::CustodyTransferFailed {
                reason: err.to_string(),
            });
        }

        self.emit(Event::LoanDefaulted {
            loan_id,
            seller,
            buyer,
            fee_to_seller: fee,
            refund_to_buyer: refund,
            timestamp: now,
        });

        Ok(DefaultSettlement {
            loan_id,
            fee_to_seller: fee,
            refund_to_buyer: refund,
            timestamp: now,
        })
    }

    /// amount owed over the current contracted term
    pub fn total_due(&self, loan_id: LoanId) -> Result<Money> {
        self.due_calculation(loan_id).map(|calc| calc.total_due)
    }

    /// breakdown of the amount owed over the current contracted term
    pub fn due_calculation(&self, loan_id: LoanId) -> Result<DueCalculation> {
        let slot = self.slot(loan_id)?;
        let record = lock_record(&slot);
        interest::due_calculation(
            record.terms.loan_amount,
            record.terms.interest_rate,
            record.duration_days,
        )
    }

    /// snapshot of one loan record
    pub fn loan(&self, loan_id: LoanId) -> Result<LoanRecord> {
        let slot = self.slot(loan_id)?;
        let record = lock_record(&slot);
        Ok(record.clone())
    }

    /// snapshots of every loan where the party is seller or buyer
    pub fn loans_for(&self, party: PartyId) -> Vec<LoanRecord> {
        let slots: Vec<Arc<Mutex<LoanRecord>>> = {
            let loans = self
                .loans
                .read()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            loans.values().cloned().collect()
        };

        let mut records: Vec<LoanRecord> = slots
            .iter()
            .map(|slot| lock_record(slot).clone())
            .filter(|record| record.terms.seller == party || record.buyer == Some(party))
            .collect();
        records.sort_by_key(|record| record.loan_id());
        records
    }

    /// number of loans ever created, terminal records included
    pub fn loan_count(&self) -> usize {
        self.loans
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// drain events emitted since the last call
    pub fn take_events(&self) -> Vec<Event> {
        self.event_store().take_events()
    }

    fn slot(&self, loan_id: LoanId) -> Result<Arc<Mutex<LoanRecord>>> {
        self.loans
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&loan_id)
            .cloned()
            .ok_or(LoanError::LoanNotFound { loan_id })
    }

    fn event_store(&self) -> MutexGuard<'_, EventStore> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, event: Event) {
        self.event_store().emit(event);
    }

    fn apply_custody_step(&self, step: &CustodyStep) -> std::result::Result<(), CustodyError> {
        match step {
            CustodyStep::PullAsset {
                descriptor,
                from,
                into,
            } => self.custody.pull_asset(descriptor, *from, *into),
            CustodyStep::ReleaseAsset {
                descriptor,
                from,
                to,
            } => self.custody.release_asset(descriptor, *from, *to),
            CustodyStep::AcceptValue { from, amount } => {
                self.custody.accept_value(*from, *amount)
            }
            CustodyStep::PayOut { to, amount } => self.custody.pay_out(*to, *amount),
        }
    }

    /// run a settlement's custody steps in order; when one fails, unwind
    /// the steps already executed in reverse order. the unwind is
    /// best-effort: a step whose inverse also fails is left to the
    /// adapter's own reconciliation.
    fn run_custody(&self, steps: &[CustodyStep]) -> std::result::Result<(), CustodyError> {
        for (index, step) in steps.iter().enumerate() {
            if let Err(err) = self.apply_custody_step(step) {
                for done in steps[..index].iter().rev() {
                    let _ = self.apply_custody_step(&done.inverse());
                }
                return Err(err);
            }
        }
        Ok(())
    }
}
