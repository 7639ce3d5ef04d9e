use screencast_utils::constants::{ENCRYPTED_KEY_SIZE, KEY_MESSAGE_SIZE, RECOVERED_KEY_SIZE};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The peer-issued key message from the FairPlay key exchange
///
/// Holds exactly the bytes the key recovery primitive reads. Longer envelopes are
/// truncated when the message is built from a slice.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMessage([u8; KEY_MESSAGE_SIZE]);

impl KeyMessage {
    /// Copies the first 164 bytes of `bytes`, or returns `None` if there are fewer
    #[must_use]
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        copy_prefix(bytes).map(Self)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; KEY_MESSAGE_SIZE] {
        &self.0
    }
}

impl From<[u8; KEY_MESSAGE_SIZE]> for KeyMessage {
    fn from(bytes: [u8; KEY_MESSAGE_SIZE]) -> Self {
        Self(bytes)
    }
}

/// The wrapped symmetric key sent alongside the key message
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct EncryptedKey([u8; ENCRYPTED_KEY_SIZE]);

impl EncryptedKey {
    /// Copies the first 72 bytes of `bytes`, or returns `None` if there are fewer
    #[must_use]
    pub fn from_prefix(bytes: &[u8]) -> Option<Self> {
        copy_prefix(bytes).map(Self)
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; ENCRYPTED_KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; ENCRYPTED_KEY_SIZE]> for EncryptedKey {
    fn from(bytes: [u8; ENCRYPTED_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

/// The unwrapped 16-byte AES key, used downstream to decrypt the mirror stream
///
/// Zeroed on drop. `Debug` never prints the key bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveredKey([u8; RECOVERED_KEY_SIZE]);

impl RecoveredKey {
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; RECOVERED_KEY_SIZE] {
        &self.0
    }
}

impl From<[u8; RECOVERED_KEY_SIZE]> for RecoveredKey {
    fn from(bytes: [u8; RECOVERED_KEY_SIZE]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for RecoveredKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for RecoveredKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("RecoveredKey(..)")
    }
}

fn copy_prefix<const N: usize>(bytes: &[u8]) -> Option<[u8; N]> {
    let mut buffer = [0u8; N];
    buffer.copy_from_slice(bytes.get(..N)?);
    Some(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_message_from_prefix() {
        let bytes: Vec<u8> = (0..200u8).collect();
        let message = KeyMessage::from_prefix(&bytes).unwrap();
        assert_eq!(message.as_bytes()[..], bytes[..KEY_MESSAGE_SIZE]);

        assert!(KeyMessage::from_prefix(&bytes[..KEY_MESSAGE_SIZE - 1]).is_none());
        assert!(KeyMessage::from_prefix(&[]).is_none());
    }

    #[test]
    fn test_encrypted_key_from_prefix() {
        let exact = [7u8; ENCRYPTED_KEY_SIZE];
        assert_eq!(
            EncryptedKey::from_prefix(&exact).unwrap().as_bytes(),
            &exact
        );
        assert!(EncryptedKey::from_prefix(&exact[..ENCRYPTED_KEY_SIZE - 1]).is_none());
    }

    #[test]
    fn test_recovered_key_debug_hides_bytes() {
        let key = RecoveredKey::from([0xab; RECOVERED_KEY_SIZE]);
        let rendered = format!("{key:?}");
        assert!(!rendered.contains("ab"));
        assert!(!rendered.contains("171"));
    }
}
