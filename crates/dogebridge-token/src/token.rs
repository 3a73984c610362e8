use crate::Error;
use dogebridge_primitives::{AccountId, Amount};
use std::collections::BTreeMap;

/// Fungible balances of the pegged token.
///
/// Tokens only enter circulation through [`TokenLedger::mint`] for proven locks and only
/// leave it through [`TokenLedger::burn`] for unlocks, so the supply always equals the
/// locked value minus the burned value.
#[derive(Debug, Default, Clone)]
pub struct TokenLedger {
    balances: BTreeMap<AccountId, Amount>,
    total_supply: Amount,
    total_locked: Amount,
    total_burned: Amount,
}

impl TokenLedger {
    /// Token balance of `account`.
    pub fn balance_of(&self, account: &AccountId) -> Amount {
        self.balances.get(account).copied().unwrap_or_default()
    }

    /// Tokens in circulation.
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Value ever minted for proven locks.
    pub fn total_locked(&self) -> Amount {
        self.total_locked
    }

    /// Value ever burned for unlocks.
    pub fn total_burned(&self) -> Amount {
        self.total_burned
    }

    /// Mints `amount` tokens to `to` for a proven lock.
    pub fn mint(&mut self, to: AccountId, amount: Amount) -> Result<(), Error> {
        let total_locked = self
            .total_locked
            .checked_add(amount)
            .ok_or(Error::AmountOverflow)?;
        // Every balance is bounded by the supply, which is bounded by the locked value.
        self.total_locked = total_locked;
        self.total_supply += amount;
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    /// Burns `amount` tokens held by `from`.
    pub fn burn(&mut self, from: AccountId, amount: Amount) -> Result<(), Error> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        self.total_supply -= amount;
        self.total_burned += amount;
        Ok(())
    }

    /// Moves `amount` tokens from `from` to `to`.
    pub fn transfer(&mut self, from: AccountId, to: AccountId, amount: Amount) -> Result<(), Error> {
        self.ensure_balance(from, amount)?;
        self.debit(from, amount);
        *self.balances.entry(to).or_default() += amount;
        Ok(())
    }

    pub(crate) fn ensure_balance(&self, account: AccountId, required: Amount) -> Result<(), Error> {
        let balance = self.balance_of(&account);
        if balance < required {
            return Err(Error::InsufficientTokenBalance {
                account,
                balance,
                required,
            });
        }
        Ok(())
    }

    fn debit(&mut self, account: AccountId, amount: Amount) {
        let balance = self
            .balances
            .get_mut(&account)
            .expect("Balance checked by the caller; qed");
        *balance -= amount;
        if *balance == 0 {
            self.balances.remove(&account);
        }
    }
}
