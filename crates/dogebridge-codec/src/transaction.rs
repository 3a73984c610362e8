use crate::Error;
use bitcoin::consensus::deserialize_partial;
use bitcoin::hashes::Hash;
use bitcoin::script::Instruction;
use bitcoin::{PubkeyHash, Script, Transaction};

/// Parses a serialized transaction, rejecting trailing bytes.
pub fn parse_transaction(bytes: &[u8]) -> Result<Transaction, Error> {
    let (tx, consumed) = deserialize_partial::<Transaction>(bytes)
        .map_err(|err| Error::MalformedTransaction(err.to_string()))?;
    if consumed != bytes.len() {
        return Err(Error::MalformedTransaction(format!(
            "{} trailing bytes",
            bytes.len() - consumed
        )));
    }
    Ok(tx)
}

/// Public key hash paid by a P2PKH output script.
pub fn p2pkh_hash(script: &Script) -> Option<PubkeyHash> {
    if !script.is_p2pkh() {
        return None;
    }
    let hash: [u8; 20] = script.as_bytes()[3..23].try_into().ok()?;
    Some(PubkeyHash::from_byte_array(hash))
}

/// Data pushed right after `OP_RETURN`, if the script is a null-data output.
pub fn op_return_payload(script: &Script) -> Option<&[u8]> {
    if !script.is_op_return() {
        return None;
    }
    match script.instructions().nth(1)? {
        Ok(Instruction::PushBytes(bytes)) => Some(bytes.as_bytes()),
        _ => None,
    }
}
