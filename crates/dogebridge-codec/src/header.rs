use crate::{AuxPow, Error};
use bitcoin::BlockHash;
use bitcoin::block::Header;
use bitcoin::consensus::encode::Error as EncodeError;
use bitcoin::consensus::{Decodable, Encodable, deserialize, serialize};
use bitcoin::io::{Read, Write};

/// Length of a serialized block header without AuxPoW payload.
pub const HEADER_LEN: usize = 80;

/// Version bit announcing an AuxPoW payload after the header.
pub const AUXPOW_VERSION_FLAG: i32 = 0x100;

/// Returns whether the version announces an AuxPoW payload.
///
/// The flag is bit 0 of the second little-endian byte of the version.
pub fn is_auxpow_version(version: i32) -> bool {
    version & AUXPOW_VERSION_FLAG != 0
}

/// Dogecoin block header with its optional merged-mining payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DogeHeader {
    /// The 80-byte header.
    pub header: Header,
    /// Merged-mining payload, present iff the version carries [`AUXPOW_VERSION_FLAG`].
    pub auxpow: Option<AuxPow>,
}

impl DogeHeader {
    /// Block identity hash, the double SHA-256 of the 80-byte header.
    pub fn block_hash(&self) -> BlockHash {
        self.header.block_hash()
    }

    /// Full version field.
    pub fn version(&self) -> i32 {
        self.header.version.to_consensus()
    }

    /// Returns whether the version announces an AuxPoW payload.
    pub fn is_auxpow(&self) -> bool {
        is_auxpow_version(self.version())
    }

    /// Chain id from the upper 16 bits of the version.
    pub fn chain_id(&self) -> u32 {
        (self.version() as u32) >> 16
    }

    /// Legacy headers predate chain ids and may not carry the network's id.
    pub fn is_legacy(&self) -> bool {
        let version = self.version();
        version == 1 || (version == 2 && self.chain_id() == 0)
    }

    /// Compact difficulty bits.
    pub fn bits(&self) -> u32 {
        self.header.bits.to_consensus()
    }

    /// Header timestamp.
    pub fn time(&self) -> u32 {
        self.header.time
    }

    /// Parent block hash.
    pub fn prev_blockhash(&self) -> BlockHash {
        self.header.prev_blockhash
    }

    /// Header whose scrypt hash must meet the target: the parent header for AuxPoW blocks,
    /// the block's own header otherwise.
    pub fn pow_header(&self) -> &Header {
        self.auxpow
            .as_ref()
            .map_or(&self.header, |auxpow| &auxpow.parent_header)
    }

    /// Serialized bytes of [`Self::pow_header`], the input of the scrypt hash.
    pub fn pow_header_bytes(&self) -> [u8; HEADER_LEN] {
        serialize(self.pow_header())
            .try_into()
            .expect("Serialized header is 80 bytes; qed")
    }

    /// Consensus serialization, including the AuxPoW payload if any.
    pub fn serialize(&self) -> Vec<u8> {
        serialize(self)
    }
}

impl Decodable for DogeHeader {
    fn consensus_decode_from_finite_reader<R: Read + ?Sized>(reader: &mut R) -> Result<Self, EncodeError> {
        let header = Header::consensus_decode_from_finite_reader(reader)?;

        let auxpow = if is_auxpow_version(header.version.to_consensus()) {
            Some(AuxPow::consensus_decode_from_finite_reader(reader)?)
        } else {
            None
        };

        Ok(Self { header, auxpow })
    }
}

impl Encodable for DogeHeader {
    fn consensus_encode<W: Write + ?Sized>(&self, writer: &mut W) -> Result<usize, bitcoin::io::Error> {
        let mut len = self.header.consensus_encode(writer)?;
        if let Some(auxpow) = &self.auxpow {
            len += auxpow.consensus_encode(writer)?;
        }
        Ok(len)
    }
}

/// Parses a serialized header.
///
/// Fails with [`Error::MalformedHeader`] when fewer than 80 bytes are given, when the
/// AuxPoW payload announced by the version is truncated, or when bytes are left over.
pub fn parse_header(bytes: &[u8]) -> Result<DogeHeader, Error> {
    if bytes.len() < HEADER_LEN {
        return Err(Error::MalformedHeader(format!(
            "expected at least {HEADER_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    deserialize(bytes).map_err(|err| Error::MalformedHeader(err.to_string()))
}
