//! Dogecoin bridge command line.
//!
//! Offline tools for headers, targets, Merkle proofs and unlock planning, plus a driver
//! replaying a file of headers through the header relay.

mod cli;
mod commands;

pub use self::cli::run;
