use std::hash::Hasher;
use twox_hash::XxHash32;

/// Table index width. 4096 slots keeps all three tables within a 48KiB
/// per-call footprint.
pub(crate) const HASH_BITS: u32 = 12;

/// The hash is purely encoder-internal state: the decoder never recomputes
/// it, so the only requirements are stability within one encode and decent
/// distribution over short keys.
const SEED: u32 = 1;

/// Hash a match key (8, 12 or 16 bytes) down to a 12-bit table index,
/// taking the high bits of an xxhash32 digest.
pub(crate) fn pattern_hash(key: &[u8]) -> usize {
    let mut hasher = XxHash32::with_seed(SEED);
    hasher.write(key);
    (hasher.finish() as u32 >> (32 - HASH_BITS)) as usize
}
