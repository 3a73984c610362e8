//! Interface to the scrypt verification delegate.
//!
//! The relay does not hash headers with scrypt on submission. It queues a
//! [`ScryptRequest`] per header and waits for the delegate to report a [`PowVerdict`]
//! through [`crate::HeaderRelay::resolve_pow`].

use bitcoin::BlockHash;
use dogebridge_codec::{HEADER_LEN, PowHash, scrypt_hash};

/// Request to verify the claimed proof-of-work hash of a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScryptRequest {
    /// Header the verdict applies to.
    pub block_hash: BlockHash,
    /// Serialized header whose scrypt hash carries the work (the parent header for AuxPoW).
    pub pow_header: [u8; HEADER_LEN],
    /// Hash claimed by the submitter.
    pub claimed_hash: PowHash,
}

/// Outcome of a scrypt verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowVerdict {
    /// The claimed hash is the scrypt hash of the header.
    Verified,
    /// The claimed hash is wrong.
    Invalid,
}

/// Something able to settle scrypt requests.
pub trait ScryptVerifier {
    /// Returns the verdict for `request`.
    fn verify(&self, request: &ScryptRequest) -> PowVerdict;
}

/// Computes scrypt locally and compares it with the claimed hash.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScryptChecker;

impl ScryptVerifier for LocalScryptChecker {
    fn verify(&self, request: &ScryptRequest) -> PowVerdict {
        let pow_hash = scrypt_hash(&request.pow_header);
        if pow_hash == request.claimed_hash {
            PowVerdict::Verified
        } else {
            tracing::debug!(
                block_hash = ?request.block_hash,
                claimed = ?request.claimed_hash,
                actual = ?pow_hash,
                "Scrypt hash mismatch"
            );
            PowVerdict::Invalid
        }
    }
}

/// Verifies every request, for development networks.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllChecker;

impl ScryptVerifier for AcceptAllChecker {
    fn verify(&self, _request: &ScryptRequest) -> PowVerdict {
        PowVerdict::Verified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::hashes::Hash;
    use hex_literal::hex;

    fn genesis_request(claimed_hash: PowHash) -> ScryptRequest {
        ScryptRequest {
            block_hash: BlockHash::all_zeros(),
            pow_header: hex!(
                "01000000000000000000000000000000000000000000000000000000000000000000000069\
                6ad20e2dd4365c7459b4a4a5af743d5e92c6da3229e6532cd605f6533f2a5b24a6a152f0ff0f1e67860100"
            ),
            claimed_hash,
        }
    }

    #[test]
    fn local_checker_compares_hashes() {
        let correct = PowHash::from_display_hex(
            "0000026f3f7874ca0c251314eaed2d2fcf83d7da3acfaacf59417d485310b448",
        )
        .unwrap();
        assert_eq!(
            LocalScryptChecker.verify(&genesis_request(correct)),
            PowVerdict::Verified
        );
        assert_eq!(
            LocalScryptChecker.verify(&genesis_request(PowHash::default())),
            PowVerdict::Invalid
        );
        assert_eq!(
            AcceptAllChecker.verify(&genesis_request(PowHash::default())),
            PowVerdict::Verified
        );
    }
}
