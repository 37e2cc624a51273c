//! Hash helpers.

/// First eight bytes of the BLAKE3 digest of `data`, little-endian.
///
/// Seeds the deterministic stub vectors. Caches key on the normalized text
/// itself, never on this hash.
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    let digest = blake3::hash(data);
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest.as_bytes()[..8]);
    u64::from_le_bytes(head)
}
