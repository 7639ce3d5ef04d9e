use screencast_utils::constants::{ENCRYPTED_KEY_SIZE, KEY_MESSAGE_SIZE, RECOVERED_KEY_SIZE};
use thiserror::Error;
use tracing::instrument;
use zeroize::Zeroize;

use crate::{
    config::KeyUnwrapConfig,
    types::{EncryptedKey, KeyMessage, RecoveredKey},
};

type Result<T> = std::result::Result<T, KeyUnwrapError>;

/// The external "recover symmetric key" routine of the FairPlay key exchange.
///
/// Implementations receive correctly sized inputs and an output buffer that is
/// zeroed on entry. The primitive has no failure path: if it cannot recover a key
/// it leaves the output untouched, and the caller sees an all-zero key.
///
/// Any `Fn(&[u8; 164], &[u8; 72], &mut [u8; 16]) + Send + Sync` is a primitive.
pub trait KeyUnwrapPrimitive: Send + Sync {
    /// Unwraps `encrypted_key` using `key_message`, writing the 16-byte key to `out`
    fn decrypt(
        &self,
        key_message: &[u8; KEY_MESSAGE_SIZE],
        encrypted_key: &[u8; ENCRYPTED_KEY_SIZE],
        out: &mut [u8; RECOVERED_KEY_SIZE],
    );
}

impl<F> KeyUnwrapPrimitive for F
where
    F: Fn(&[u8; KEY_MESSAGE_SIZE], &[u8; ENCRYPTED_KEY_SIZE], &mut [u8; RECOVERED_KEY_SIZE])
        + Send
        + Sync,
{
    fn decrypt(
        &self,
        key_message: &[u8; KEY_MESSAGE_SIZE],
        encrypted_key: &[u8; ENCRYPTED_KEY_SIZE],
        out: &mut [u8; RECOVERED_KEY_SIZE],
    ) {
        self(key_message, encrypted_key, out);
    }
}

/// Validates FairPlay key exchange buffers and hands them to a [`KeyUnwrapPrimitive`].
///
/// The bridge holds no per-call state: every call copies its inputs into stack
/// buffers, so a single bridge can be shared between threads.
pub struct KeyUnwrapBridge<P> {
    /// The opaque key recovery routine
    primitive: P,
    /// Input validation settings
    config: KeyUnwrapConfig,
}

impl<P: KeyUnwrapPrimitive> KeyUnwrapBridge<P> {
    /// Constructor
    pub const fn new(primitive: P) -> Self {
        Self::with_config(primitive, KeyUnwrapConfig::new(false))
    }

    /// Creates a bridge with explicit validation settings
    pub const fn with_config(primitive: P, config: KeyUnwrapConfig) -> Self {
        Self { primitive, config }
    }

    #[must_use]
    pub const fn config(&self) -> &KeyUnwrapConfig {
        &self.config
    }

    /// Recovers the 16-byte AES key wrapped in `encrypted_key`.
    ///
    /// Returns `None` when either buffer is absent, when `key_message` holds fewer
    /// than 164 bytes, or when `encrypted_key` holds fewer than 72 bytes. Bytes past
    /// those offsets are ignored unless [`KeyUnwrapConfig::strict_lengths`] is set.
    ///
    /// # Arguments
    /// * `key_message` - The key message sent by the peer during the key exchange
    /// * `encrypted_key` - The wrapped AES key
    ///
    /// # Returns
    /// * `Some(RecoveredKey)` - Whatever the primitive wrote into the zeroed output
    /// * `None` - If the inputs were rejected
    pub fn recover_key(
        &self,
        key_message: Option<&[u8]>,
        encrypted_key: Option<&[u8]>,
    ) -> Option<RecoveredKey> {
        match self.try_recover_key(key_message, encrypted_key) {
            Ok(key) => Some(key),
            Err(e) => {
                tracing::debug!(
                    target = "screencast-crypto",
                    event = "key_unwrap_rejected",
                    "Rejected key unwrap request: {e}"
                );
                None
            }
        }
    }

    /// Same as [`Self::recover_key`], but reports why the inputs were rejected.
    ///
    /// # Errors
    /// * `KeyUnwrapError::MissingKeyMessage` / `MissingEncryptedKey` - If an input is absent
    /// * `KeyUnwrapError::KeyMessageTooShort` / `EncryptedKeyTooShort` - If an input is under length
    /// * `KeyUnwrapError::KeyMessageTooLong` / `EncryptedKeyTooLong` - If strict lengths are
    ///   configured and an input carries trailing bytes
    #[instrument(level = "trace", skip_all)]
    pub fn try_recover_key(
        &self,
        key_message: Option<&[u8]>,
        encrypted_key: Option<&[u8]>,
    ) -> Result<RecoveredKey> {
        let key_message = key_message.ok_or(KeyUnwrapError::MissingKeyMessage)?;
        let encrypted_key = encrypted_key.ok_or(KeyUnwrapError::MissingEncryptedKey)?;

        let key_message_len = key_message.len();
        let encrypted_key_len = encrypted_key.len();
        let key_message = KeyMessage::from_prefix(key_message)
            .ok_or(KeyUnwrapError::KeyMessageTooShort(key_message_len))?;
        let encrypted_key = EncryptedKey::from_prefix(encrypted_key)
            .ok_or(KeyUnwrapError::EncryptedKeyTooShort(encrypted_key_len))?;

        if self.config.strict_lengths {
            if key_message_len > KEY_MESSAGE_SIZE {
                return Err(KeyUnwrapError::KeyMessageTooLong(key_message_len));
            }
            if encrypted_key_len > ENCRYPTED_KEY_SIZE {
                return Err(KeyUnwrapError::EncryptedKeyTooLong(encrypted_key_len));
            }
        }

        let key = self.unwrap_key(&key_message, &encrypted_key);
        tracing::trace!(
            target = "screencast-crypto",
            event = "key_unwrap_recovered",
            key_message_len,
            encrypted_key_len,
            "Recovered FairPlay AES key"
        );
        Ok(key)
    }

    /// Runs the primitive on already sized inputs
    pub fn unwrap_key(&self, key_message: &KeyMessage, encrypted_key: &EncryptedKey) -> RecoveredKey {
        let mut out = [0u8; RECOVERED_KEY_SIZE];
        self.primitive
            .decrypt(key_message.as_bytes(), encrypted_key.as_bytes(), &mut out);
        let key = RecoveredKey::from(out);
        out.zeroize();
        key
    }
}

/// Reasons a key unwrap request is rejected.
///
/// Callers of [`KeyUnwrapBridge::recover_key`] and the C ABI only ever observe these
/// as an absent result.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum KeyUnwrapError {
    #[error("Key message is absent")]
    MissingKeyMessage,
    #[error("Encrypted key is absent")]
    MissingEncryptedKey,
    #[error("Key message holds `{0}` bytes, expected at least 164")]
    KeyMessageTooShort(usize),
    #[error("Encrypted key holds `{0}` bytes, expected at least 72")]
    EncryptedKeyTooShort(usize),
    #[error("Key message holds `{0}` bytes, expected exactly 164")]
    KeyMessageTooLong(usize),
    #[error("Encrypted key holds `{0}` bytes, expected exactly 72")]
    EncryptedKeyTooLong(usize),
}
