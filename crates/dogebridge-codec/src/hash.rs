use crate::Hash256;
use sha2::{Digest, Sha256};
use std::fmt;

/// Double SHA-256, the block and transaction identity hash.
pub fn double_sha256(data: &[u8]) -> Hash256 {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Hashes two display-order hashes the way Merkle tree nodes are combined.
///
/// Both inputs and the result are in display (big-endian) order.
pub fn concat_hash(left: &Hash256, right: &Hash256) -> Hash256 {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[..32].reverse();
    data[32..].copy_from_slice(right);
    data[32..].reverse();
    let mut out = double_sha256(&data);
    out.reverse();
    out
}

/// Scrypt proof-of-work hash, stored in internal byte order.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PowHash(pub Hash256);

impl PowHash {
    /// Builds a hash from its display-order hex representation.
    pub fn from_display_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)?;
        bytes.reverse();
        Ok(Self(bytes))
    }

    /// Returns the hash bytes in internal order.
    pub fn to_byte_array(self) -> Hash256 {
        self.0
    }
}

impl fmt::Display for PowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut display = self.0;
        display.reverse();
        write!(f, "{}", hex::encode(display))
    }
}

impl fmt::Debug for PowHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Computes the Dogecoin proof-of-work hash: scrypt(N=1024, r=1, p=1) keyed and salted
/// with the serialized 80-byte header.
pub fn scrypt_hash(header: &[u8]) -> PowHash {
    let params = scrypt::Params::new(10, 1, 1, 32).expect("Scrypt parameters are valid; qed");
    let mut out = [0u8; 32];
    scrypt::scrypt(header, header, &params, &mut out)
        .expect("Output length matches the configured length; qed");
    PowHash(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    const DOGE_MAINNET_GENESIS: [u8; 80] = hex!(
        "01000000000000000000000000000000000000000000000000000000000000000000000069\
        6ad20e2dd4365c7459b4a4a5af743d5e92c6da3229e6532cd605f6533f2a5b24a6a152f0ff0f1e67860100"
    );

    #[test]
    fn concat_hash_matches_merkle_pair() {
        let left = hex!("8c14f0db3df150123e6f3dbbf30f8b955a8249b62ac1d1ff16284aefa3d06d87");
        let right = hex!("fff2525b8931402dd09222c50775608f75787bd2b87e56995a7bdd30f79702c4");
        assert_eq!(
            concat_hash(&left, &right),
            hex!("ccdafb73d8dcd0173d5d5c3c9a0770d0b3953db889dab99ef05b1907518cb815")
        );
    }

    #[test]
    fn genesis_block_hash() {
        let mut hash = double_sha256(&DOGE_MAINNET_GENESIS);
        hash.reverse();
        assert_eq!(
            hash,
            hex!("1a91e3dace36e2be3bf030a65679fe821aa1d6ef92e7c9902eb318182c355691")
        );
    }

    #[test]
    fn genesis_scrypt_hash() {
        let pow_hash = scrypt_hash(&DOGE_MAINNET_GENESIS);
        assert_eq!(
            pow_hash.0,
            hex!("48b41053487d4159cfaacf3adad783cf2f2dedea1413250cca74783f6f020000")
        );
        assert_eq!(
            pow_hash.to_string(),
            "0000026f3f7874ca0c251314eaed2d2fcf83d7da3acfaacf59417d485310b448"
        );
        assert_eq!(
            PowHash::from_display_hex(&pow_hash.to_string()).unwrap(),
            pow_hash
        );
    }
}
