//! Operator UTXO ledger, unlock engine and pegged token of the Dogecoin bridge.
//!
//! [`DogeBridge`] is the store every public operation goes through. Locks proven through
//! the header relay mint tokens and hand the locked outputs to the operator. Unlocks burn
//! tokens, reserve operator UTXOs in sequence and are completed once the redemption
//! transaction is proven in turn.

mod bridge;
mod error;
mod lock;
mod operator;
mod token;
mod unlock;

pub use self::bridge::{DogeBridge, ProofStatus};
pub use self::error::Error;
pub use self::lock::{Deposit, LockedOutput, parse_deposit};
pub use self::operator::{Operator, Utxo, UtxoStatus};
pub use self::token::TokenLedger;
pub use self::unlock::{UnlockRequest, UnlockStatus, UtxoSelection, operator_fee, select_utxos};
