//! Blake2b-256 hashing.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    blake2b_256_multi(&[data])
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(blake2b_256(b"bela"), blake2b_256(b"bela"));
    }

    #[test]
    fn multi_equals_concatenation() {
        let joined = blake2b_256(b"attest:0x01");
        let parts = blake2b_256_multi(&[b"attest:", b"0x01"]);
        assert_eq!(joined, parts);
    }

    #[test]
    fn different_inputs_differ() {
        assert_ne!(blake2b_256(b"a"), blake2b_256(b"b"));
    }
}
