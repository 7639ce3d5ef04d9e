//! Mirror stream decryption
//!
//! Screen mirroring video payloads are encrypted with AES-128-CTR. The keystream is
//! continuous for the lifetime of a stream connection: the counter is never reset
//! between packets, so payloads must be decrypted in the order they were received.

use std::sync::{Mutex, PoisonError};

use screencast_utils::encryption::{
    derive_mirror_key_material, new_stream_cipher, Aes128Ctr, EncryptionError, StreamCipher,
};
use thiserror::Error;

use crate::types::RecoveredKey;

type Result<T> = std::result::Result<T, MirrorDecryptorError>;

/// Decrypts the payloads of one mirrored video stream.
pub struct MirrorStreamDecryptor {
    /// Keystream state, shared by every call to [`Self::decrypt`]
    cipher: Mutex<Aes128Ctr>,
    /// Stream connection ID the keys were derived for
    stream_connection_id: u64,
}

impl MirrorStreamDecryptor {
    /// Derives the stream cipher from the recovered FairPlay key and the pairing secret.
    ///
    /// # Arguments
    /// * `raw_aes_key` - Key recovered by [`crate::KeyUnwrapBridge::recover_key`]
    /// * `ecdh_secret` - Shared secret from pair-verify; only the first 32 bytes are used
    /// * `stream_connection_id` - The `streamConnectionID` announced by the sender
    ///
    /// # Errors
    /// * `MirrorDecryptorError::EncryptionError` - If `ecdh_secret` holds fewer than 32 bytes
    pub fn new(
        raw_aes_key: &RecoveredKey,
        ecdh_secret: &[u8],
        stream_connection_id: u64,
    ) -> Result<Self> {
        let material =
            derive_mirror_key_material(raw_aes_key.as_bytes(), ecdh_secret, stream_connection_id)?;
        tracing::debug!(
            target = "screencast-crypto",
            event = "mirror_decryptor_created",
            stream_connection_id,
            "Derived mirror stream keys"
        );
        Ok(Self {
            cipher: Mutex::new(new_stream_cipher(&material)),
            stream_connection_id,
        })
    }

    #[must_use]
    pub const fn stream_connection_id(&self) -> u64 {
        self.stream_connection_id
    }

    /// Decrypts `payload`, advancing the keystream by `payload.len()` bytes
    #[must_use]
    pub fn decrypt(&self, payload: &[u8]) -> Vec<u8> {
        let mut plaintext = payload.to_vec();
        self.decrypt_in_place(&mut plaintext);
        plaintext
    }

    /// Decrypts `payload` in place, advancing the keystream by `payload.len()` bytes
    pub fn decrypt_in_place(&self, payload: &mut [u8]) {
        let mut cipher = self.cipher.lock().unwrap_or_else(PoisonError::into_inner);
        cipher.apply_keystream(payload);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MirrorDecryptorError {
    #[error("Key derivation error: `{0}`")]
    EncryptionError(#[from] EncryptionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAINTEXT: &[u8; 32] = b"mirror frame payload 0123456789!";
    const CIPHERTEXT_HEX: &str = "8c8892fa67630aa987e4647efbc43ed44f474707e6e42f6a9184e3aa8fe3b04d";
    const STREAM_CONNECTION_ID: u64 = 1_234_567_890_123;

    fn decryptor() -> MirrorStreamDecryptor {
        let raw_key = RecoveredKey::from(std::array::from_fn::<u8, 16, _>(|i| i as u8));
        let ecdh_secret: Vec<u8> = (0x20..0x40).collect();
        MirrorStreamDecryptor::new(&raw_key, &ecdh_secret, STREAM_CONNECTION_ID).unwrap()
    }

    #[test]
    fn test_decrypt_golden_value() {
        let ciphertext = hex::decode(CIPHERTEXT_HEX).unwrap();
        assert_eq!(decryptor().decrypt(&ciphertext), PLAINTEXT);
    }

    #[test]
    fn test_keystream_is_continuous_across_packets() {
        let ciphertext = hex::decode(CIPHERTEXT_HEX).unwrap();
        let decryptor = decryptor();

        // Packet boundaries that do not line up with AES blocks
        let mut plaintext = decryptor.decrypt(&ciphertext[..5]);
        plaintext.extend(decryptor.decrypt(&ciphertext[5..21]));
        let mut tail = ciphertext[21..].to_vec();
        decryptor.decrypt_in_place(&mut tail);
        plaintext.extend(tail);

        assert_eq!(plaintext, PLAINTEXT);
    }

    #[test]
    fn test_empty_payload_does_not_advance() {
        let ciphertext = hex::decode(CIPHERTEXT_HEX).unwrap();
        let decryptor = decryptor();
        assert!(decryptor.decrypt(&[]).is_empty());
        assert_eq!(decryptor.decrypt(&ciphertext), PLAINTEXT);
    }

    #[test]
    fn test_short_ecdh_secret() {
        let raw_key = RecoveredKey::from([0u8; 16]);
        let result = MirrorStreamDecryptor::new(&raw_key, &[0u8; 16], STREAM_CONNECTION_ID);
        assert_eq!(
            result.err(),
            Some(MirrorDecryptorError::EncryptionError(
                EncryptionError::EcdhSecretTooShort(16)
            ))
        );
    }

    #[test]
    fn test_stream_connection_id() {
        assert_eq!(decryptor().stream_connection_id(), STREAM_CONNECTION_ID);
    }
}
