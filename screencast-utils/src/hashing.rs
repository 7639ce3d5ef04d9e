use sha2::{Digest, Sha512};

/// Size of a SHA-512 digest in bytes
pub const SHA512_HASH_SIZE: usize = 64;

/// Computes the SHA-512 hash of the concatenation of `parts`
///
/// # Arguments
/// * `parts` - Byte slices hashed in order, as if they were one contiguous buffer
/// # Returns
/// The 64-byte SHA-512 digest
#[must_use]
pub fn sha512_hash(parts: &[&[u8]]) -> [u8; SHA512_HASH_SIZE] {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part);
    }
    let mut digest = [0u8; SHA512_HASH_SIZE];
    digest.copy_from_slice(hasher.finalize().as_slice());
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_input_matches_contiguous_input() {
        let contiguous = sha512_hash(&[b"AirPlayStreamKey42".as_slice()]);
        let split = sha512_hash(&[b"AirPlay".as_slice(), b"StreamKey", b"42"]);
        assert_eq!(contiguous, split);
    }

    #[test]
    fn test_empty_input() {
        let digest = sha512_hash(&[]);
        assert_eq!(
            hex::encode(&digest[..8]),
            "cf83e1357eefb8bd",
            "SHA-512 of the empty string is well known"
        );
    }
}
