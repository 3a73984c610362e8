//! Dogecoin header relay and SPV store.
//!
//! The relay ingests serialized Dogecoin headers, checks their linkage, difficulty, time
//! and merged-mining rules, and defers the expensive scrypt check to an external
//! [`ScryptVerifier`] whose verdicts arrive later through [`HeaderRelay::resolve_pow`].
//! Accepted headers accumulate chain work and the heaviest branch is the best chain.
//! Headers buried under enough confirmations on the best chain become final and serve
//! transaction inclusion proofs ([`SpvProof`]).

mod chain;
pub mod difficulty;
mod error;
mod proof;
mod relay;
mod scrypt_checker;

pub use self::chain::{ChainEntry, HeaderStatus};
pub use self::error::Error;
pub use self::proof::SpvProof;
pub use self::relay::HeaderRelay;
pub use self::scrypt_checker::{
    AcceptAllChecker, LocalScryptChecker, PowVerdict, ScryptRequest, ScryptVerifier,
};
