/// Reverses the byte order of `bytes`.
pub fn flip_bytes(bytes: &[u8]) -> Vec<u8> {
    bytes.iter().rev().copied().collect()
}

/// Left-pads `bytes` to 32 bytes and reverses them.
///
/// Inputs longer than 32 bytes keep only their last 32 bytes, mirroring how a shorter
/// big-endian number is widened to a 32-byte word before its byte order is swapped.
pub fn flip32(bytes: &[u8]) -> [u8; 32] {
    let mut out = bytes_to_bytes32(bytes);
    out.reverse();
    out
}

/// Converts up to 32 big-endian bytes into a 32-byte word, left-padding with zeros.
pub fn bytes_to_bytes32(bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let bytes = &bytes[bytes.len().saturating_sub(32)..];
    out[32 - bytes.len()..].copy_from_slice(bytes);
    out
}

/// Reads the first 4 bytes of `bytes` as a big-endian `u32`, zero-filling missing bytes.
pub fn bytes_to_u32(bytes: &[u8]) -> u32 {
    let mut word = [0u8; 4];
    let len = bytes.len().min(4);
    word[..len].copy_from_slice(&bytes[..len]);
    u32::from_be_bytes(word)
}
