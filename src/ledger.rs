use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::custody::{CustodyAdapter, CustodyError, EscrowAccount};
use crate::decimal::Money;
use crate::types::{AssetDescriptor, PartyId};

/// who currently holds an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Holder {
    Party(PartyId),
    Escrow(EscrowAccount),
}

#[derive(Debug, Default)]
struct LedgerBook {
    cash: HashMap<PartyId, Money>,
    float: Money,
    fungible: HashMap<(Holder, Uuid), Decimal>,
    unique: HashMap<(Uuid, u64), Holder>,
}

/// in-memory custody adapter for demos and tests
///
/// tracks cash balances, fungible and unique holdings, and the float fed
/// by accepted repayments. every call checks cover before writing either
/// side, so a refused movement leaves the books untouched.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    book: Mutex<LedgerBook>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LedgerBook> {
        self.book
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// credit spendable cash to a party
    pub fn fund(&self, party: PartyId, amount: Money) {
        let mut book = self.lock();
        let balance = book.cash.get(&party).copied().unwrap_or(Money::ZERO);
        book.cash
            .insert(party, balance.checked_add(amount).unwrap_or(balance));
    }

    /// hand a fungible balance to a party
    pub fn grant_fungible(&self, party: PartyId, token: Uuid, amount: Decimal) {
        let mut book = self.lock();
        let key = (Holder::Party(party), token);
        let balance = book.fungible.get(&key).copied().unwrap_or(Decimal::ZERO);
        book.fungible
            .insert(key, balance.checked_add(amount).unwrap_or(balance));
    }

    /// hand a unique item to a party
    pub fn grant_unique(&self, party: PartyId, collection: Uuid, item: u64) {
        self.lock()
            .unique
            .insert((collection, item), Holder::Party(party));
    }

    /// hand a party whatever the descriptor describes
    pub fn grant_asset(&self, party: PartyId, asset: &AssetDescriptor) {
        match asset {
            AssetDescriptor::Fungible { token, amount } => {
                self.grant_fungible(party, *token, *amount)
            }
            AssetDescriptor::Unique { collection, item } => {
                self.grant_unique(party, *collection, *item)
            }
        }
    }

    pub fn cash_balance(&self, party: PartyId) -> Money {
        self.lock().cash.get(&party).copied().unwrap_or(Money::ZERO)
    }

    /// repayment value held by the engine, not yet paid out
    pub fn float(&self) -> Money {
        self.lock().float
    }

    pub fn fungible_balance(&self, holder: Holder, token: Uuid) -> Decimal {
        self.lock()
            .fungible
            .get(&(holder, token))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    pub fn holder_of_unique(&self, collection: Uuid, item: u64) -> Option<Holder> {
        self.lock().unique.get(&(collection, item)).copied()
    }
}

fn move_fungible(
    book: &mut LedgerBook,
    from: Holder,
    to: Holder,
    token: Uuid,
    amount: Decimal,
) -> Result<(), CustodyError> {
    if amount.is_sign_negative() {
        return Err(CustodyError::new("negative fungible amount"));
    }
    let held = book
        .fungible
        .get(&(from, token))
        .copied()
        .unwrap_or(Decimal::ZERO);
    if held < amount {
        return Err(CustodyError::new(format!(
            "insufficient balance of token {token}: {held} held, {amount} required"
        )));
    }
    let credited = book
        .fungible
        .get(&(to, token))
        .copied()
        .unwrap_or(Decimal::ZERO)
        .checked_add(amount)
        .ok_or_else(|| CustodyError::new("fungible balance overflow"))?;

    book.fungible.insert((from, token), held - amount);
    book.fungible.insert((to, token), credited);
    Ok(())
}

fn move_unique(
    book: &mut LedgerBook,
    from: Holder,
    to: Holder,
    collection: Uuid,
    item: u64,
) -> Result<(), CustodyError> {
    match book.unique.get(&(collection, item)) {
        Some(holder) if *holder == from => {
            book.unique.insert((collection, item), to);
            Ok(())
        }
        _ => Err(CustodyError::new(format!(
            "item {item} of collection {collection} is not held by the sender"
        ))),
    }
}

impl CustodyAdapter for InMemoryLedger {
    fn pull_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: PartyId,
        into: EscrowAccount,
    ) -> Result<(), CustodyError> {
        let mut book = self.lock();
        match descriptor {
            AssetDescriptor::Fungible { token, amount } => move_fungible(
                &mut book,
                Holder::Party(from),
                Holder::Escrow(into),
                *token,
                *amount,
            ),
            AssetDescriptor::Unique { collection, item } => move_unique(
                &mut book,
                Holder::Party(from),
                Holder::Escrow(into),
                *collection,
                *item,
            ),
        }
    }

    fn release_asset(
        &self,
        descriptor: &AssetDescriptor,
        from: EscrowAccount,
        to: PartyId,
    ) -> Result<(), CustodyError> {
        let mut book = self.lock();
        match descriptor {
            AssetDescriptor::Fungible { token, amount } => move_fungible(
                &mut book,
                Holder::Escrow(from),
                Holder::Party(to),
                *token,
                *amount,
            ),
            AssetDescriptor::Unique { collection, item } => move_unique(
                &mut book,
                Holder::Escrow(from),
                Holder::Party(to),
                *collection,
                *item,
            ),
        }
    }

    fn accept_value(&self, from: PartyId, amount: Money) -> Result<(), CustodyError> {
        let mut book = self.lock();
        let balance = book.cash.get(&from).copied().unwrap_or(Money::ZERO);
        let remaining = balance.checked_sub(amount).ok_or_else(|| {
            CustodyError::new(format!(
                "insufficient cash for {from}: {balance} held, {amount} required"
            ))
        })?;
        let float = book
            .float
            .checked_add(amount)
            .ok_or_else(|| CustodyError::new("float overflow"))?;

        book.cash.insert(from, remaining);
        book.float = float;
        Ok(())
    }

    fn pay_out(&self, to: PartyId, amount: Money) -> Result<(), CustodyError> {
        let mut book = self.lock();
        let float = book.float.checked_sub(amount).ok_or_else(|| {
            CustodyError::new(format!(
                "float short: {} held, {amount} requested",
                book.float
            ))
        })?;
        let credited = book
            .cash
            .get(&to)
            .copied()
            .unwrap_or(Money::ZERO)
            .checked_add(amount)
            .ok_or_else(|| CustodyError::new("cash balance overflow"))?;

        book.float = float;
        book.cash.insert(to, credited);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_pull_requires_ownership() {
        let ledger = InMemoryLedger::new();
        let stranger = Uuid::new_v4();
        let collection = Uuid::new_v4();
        let asset = AssetDescriptor::Unique {
            collection,
            item: 1,
        };
        ledger.grant_unique(Uuid::new_v4(), collection, 1);

        let result = ledger.pull_asset(&asset, stranger, EscrowAccount(1));
        assert!(result.is_err());
        assert!(matches!(
            ledger.holder_of_unique(collection, 1),
            Some(Holder::Party(_))
        ));
    }

    #[test]
    fn test_unique_round_trip_through_escrow() {
        let ledger = InMemoryLedger::new();
        let seller = Uuid::new_v4();
        let buyer = Uuid::new_v4();
        let collection = Uuid::new_v4();
        let asset = AssetDescriptor::Unique {
            collection,
            item: 42,
        };
        ledger.grant_unique(seller, collection, 42);

        ledger.pull_asset(&asset, seller, EscrowAccount(7)).unwrap();
        assert_eq!(
            ledger.holder_of_unique(collection, 42),
            Some(Holder::Escrow(EscrowAccount(7)))
        );

        ledger.release_asset(&asset, EscrowAccount(7), buyer).unwrap();
        assert_eq!(
            ledger.holder_of_unique(collection, 42),
            Some(Holder::Party(buyer))
        );
    }

    #[test]
    fn test_fungible_moves_partial_balance() {
        let ledger = InMemoryLedger::new();
        let seller = Uuid::new_v4();
        let token = Uuid::new_v4();
        ledger.grant_fungible(seller, token, dec!(100));

        let asset = AssetDescriptor::Fungible {
            token,
            amount: dec!(60),
        };
        ledger.pull_asset(&asset, seller, EscrowAccount(3)).unwrap();

        assert_eq!(
            ledger.fungible_balance(Holder::Party(seller), token),
            dec!(40)
        );
        assert_eq!(
            ledger.fungible_balance(Holder::Escrow(EscrowAccount(3)), token),
            dec!(60)
        );
    }

    #[test]
    fn test_accept_value_requires_cash() {
        let ledger = InMemoryLedger::new();
        let buyer = Uuid::new_v4();
        ledger.fund(buyer, Money::from_major(50));

        assert!(ledger.accept_value(buyer, Money::from_major(80)).is_err());
        assert_eq!(ledger.cash_balance(buyer), Money::from_major(50));

        ledger.accept_value(buyer, Money::from_major(30)).unwrap();
        assert_eq!(ledger.cash_balance(buyer), Money::from_major(20));
        assert_eq!(ledger.float(), Money::from_major(30));
    }

    #[test]
    fn test_pay_out_limited_to_float() {
        let ledger = InMemoryLedger::new();
        let buyer = Uuid::new_v4();
        let seller = Uuid::new_v4();
        ledger.fund(buyer, Money::from_major(100));
        ledger.accept_value(buyer, Money::from_major(100)).unwrap();

        assert!(ledger.pay_out(seller, Money::from_major(150)).is_err());
        assert_eq!(ledger.float(), Money::from_major(100));

        ledger.pay_out(seller, Money::from_major(100)).unwrap();
        assert_eq!(ledger.cash_balance(seller), Money::from_major(100));
        assert_eq!(ledger.float(), Money::ZERO);
    }
}
