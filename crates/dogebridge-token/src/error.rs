use bitcoin::{OutPoint, PubkeyHash, Txid};
use dogebridge_primitives::{AccountId, Amount, ConfigError, ErrorKind};

/// Bridge ledger error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Header relay or inclusion proof failure.
    #[error(transparent)]
    Relay(#[from] dogebridge_relay::Error),

    /// Transaction bytes could not be decoded.
    #[error(transparent)]
    Codec(#[from] dogebridge_codec::Error),

    /// Bridge configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Operator is registered already.
    #[error("Operator {0} already exists")]
    DuplicateOperator(PubkeyHash),

    /// Operator is not registered.
    #[error("Unknown operator {0}")]
    UnknownOperator(PubkeyHash),

    /// Amount of zero where a positive amount is required.
    #[error("Amount must be positive")]
    ZeroAmount,

    /// Amount arithmetic left the representable range.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Operator does not hold enough unreserved DOGE for the unlock.
    #[error("Insufficient available balance: {{ requested: {requested}, available: {available} }}")]
    InsufficientAvailableBalance { requested: Amount, available: Amount },

    /// Account does not hold enough tokens.
    #[error("Insufficient token balance of {account}: {{ balance: {balance}, required: {required} }}")]
    InsufficientTokenBalance {
        account: AccountId,
        balance: Amount,
        required: Amount,
    },

    /// Caller lacks the role the operation requires.
    #[error("{0} is not allowed to perform this operation")]
    Unauthorized(AccountId),

    /// Transaction was already consumed by a lock or an unlock completion.
    #[error("Transaction {0} already processed")]
    TransactionAlreadyProcessed(Txid),

    /// Lock transaction pays nothing to the operator.
    #[error("Transaction {txid} pays nothing to operator {operator}")]
    NoOperatorOutput { txid: Txid, operator: PubkeyHash },

    /// Transaction offered as a lock spends an operator UTXO, as redemptions do.
    #[error("Transaction {txid} spends operator UTXO {outpoint} and is not a lock")]
    SpendsOperatorUtxo { txid: Txid, outpoint: OutPoint },

    /// No unlock request at this index.
    #[error("Unknown unlock request #{0}")]
    UnknownUnlock(u64),

    /// Unlock request was completed before.
    #[error("Unlock request #{0} is already completed")]
    AlreadyCompleted(u64),

    /// Redemption transaction leaves a reserved outpoint unspent.
    #[error("Redemption of unlock #{unlock_idx} does not spend {outpoint}")]
    MissingUnlockInput { unlock_idx: u64, outpoint: OutPoint },

    /// Redemption transaction underpays the destination.
    #[error("Redemption of unlock #{unlock_idx} pays {paid} to the destination, {required} required")]
    InsufficientRedemption {
        unlock_idx: u64,
        paid: Amount,
        required: Amount,
    },

    /// Operator collateral would drop below its requirement.
    #[error("Insufficient collateral: {{ remaining: {remaining}, required: {required} }}")]
    InsufficientCollateral { remaining: u128, required: u128 },

    /// Collateral requirement is unknown until the oracle publishes a price.
    #[error("DOGE/ETH price has not been published")]
    MissingPrice,
}

impl Error {
    /// Returns the coarse category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Relay(err) => err.kind(),
            Self::Codec(_) | Self::Config(_) | Self::ZeroAmount | Self::AmountOverflow => {
                ErrorKind::MalformedInput
            }
            Self::InsufficientAvailableBalance { .. }
            | Self::InsufficientTokenBalance { .. }
            | Self::InsufficientCollateral { .. } => ErrorKind::InsufficientFunds,
            Self::UnknownOperator(_) | Self::UnknownUnlock(_) => ErrorKind::UnknownEntity,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::DuplicateOperator(_)
            | Self::TransactionAlreadyProcessed(_)
            | Self::NoOperatorOutput { .. }
            | Self::SpendsOperatorUtxo { .. }
            | Self::AlreadyCompleted(_)
            | Self::MissingUnlockInput { .. }
            | Self::InsufficientRedemption { .. }
            | Self::MissingPrice => ErrorKind::InvalidState,
        }
    }
}
