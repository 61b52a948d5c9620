use solana_sdk::pubkey::Pubkey;

/// Offset-based readers for fixed-layout account buffers
///
/// Callers must check the buffer against the full layout size before
/// reading; these slice without further bounds handling.

/// Read a little-endian u64 at `offset`
pub fn read_u64_le(data: &[u8], offset: usize) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&data[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

/// Read a 32-byte public key at `offset`
pub fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(buf)
}
