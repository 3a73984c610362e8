/// Coarse classification of bridge errors.
///
/// Every failing operation leaves the state it was applied to untouched, the kind only
/// tells the caller what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bytes of the wrong length or encoding.
    MalformedInput,
    /// Header breaks a consensus rule (work, linkage, difficulty, time, merged mining).
    ConsensusViolation,
    /// Balance too small for the requested operation.
    InsufficientFunds,
    /// Operator, header or unlock request not found.
    UnknownEntity,
    /// Caller is not allowed to perform the operation.
    Unauthorized,
    /// Operation does not apply to the current state of its target.
    InvalidState,
}
