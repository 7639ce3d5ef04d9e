use aes::Aes128;
use ctr::cipher::KeyIvInit;
pub use ctr::cipher::StreamCipher;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{
    constants::{ECDH_SECRET_SIZE, RECOVERED_KEY_SIZE, STREAM_KEY_SIZE},
    hashing::sha512_hash,
};

/// AES-128 in CTR mode with a full 128-bit big-endian counter
pub type Aes128Ctr = ctr::Ctr128BE<Aes128>;

const STREAM_KEY_LABEL: &[u8] = b"AirPlayStreamKey";
const STREAM_IV_LABEL: &[u8] = b"AirPlayStreamIV";

type Result<T> = std::result::Result<T, EncryptionError>;

/// Key and initial counter block for a single mirrored video stream
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MirrorKeyMaterial {
    /// AES-128 key for the stream cipher
    pub stream_key: [u8; STREAM_KEY_SIZE],
    /// Initial CTR counter block
    pub stream_iv: [u8; STREAM_KEY_SIZE],
}

/// Mixes the recovered FairPlay key with the pairing ECDH secret.
///
/// The result is the first 16 bytes of `SHA-512(raw_aes_key || ecdh_secret[..32])`.
/// Bytes of `ecdh_secret` past the first 32 are ignored.
///
/// # Errors
/// * `EncryptionError::EcdhSecretTooShort` - If `ecdh_secret` holds fewer than 32 bytes
pub fn derive_session_key(
    raw_aes_key: &[u8; RECOVERED_KEY_SIZE],
    ecdh_secret: &[u8],
) -> Result<[u8; STREAM_KEY_SIZE]> {
    let ecdh_secret = ecdh_secret
        .get(..ECDH_SECRET_SIZE)
        .ok_or(EncryptionError::EcdhSecretTooShort(ecdh_secret.len()))?;
    Ok(truncate(&sha512_hash(&[&raw_aes_key[..], ecdh_secret])))
}

/// Derives the stream key and IV for the mirror connection identified by `stream_connection_id`.
///
/// # Arguments
/// * `raw_aes_key` - The 16-byte key recovered from the FairPlay key exchange
/// * `ecdh_secret` - The shared secret from pair-verify, at least 32 bytes
/// * `stream_connection_id` - The sender's stream connection ID, hashed as an unsigned decimal string
///
/// # Errors
/// * `EncryptionError::EcdhSecretTooShort` - If `ecdh_secret` holds fewer than 32 bytes
pub fn derive_mirror_key_material(
    raw_aes_key: &[u8; RECOVERED_KEY_SIZE],
    ecdh_secret: &[u8],
    stream_connection_id: u64,
) -> Result<MirrorKeyMaterial> {
    let mut session_key = derive_session_key(raw_aes_key, ecdh_secret)?;
    let stream_id = stream_connection_id.to_string();

    let material = MirrorKeyMaterial {
        stream_key: truncate(&sha512_hash(&[
            STREAM_KEY_LABEL,
            stream_id.as_bytes(),
            &session_key[..],
        ])),
        stream_iv: truncate(&sha512_hash(&[
            STREAM_IV_LABEL,
            stream_id.as_bytes(),
            &session_key[..],
        ])),
    };
    session_key.zeroize();
    Ok(material)
}

/// Builds a fresh AES-128-CTR keystream positioned at the start of the stream.
#[must_use]
pub fn new_stream_cipher(material: &MirrorKeyMaterial) -> Aes128Ctr {
    Aes128Ctr::new(&material.stream_key.into(), &material.stream_iv.into())
}

fn truncate(digest: &[u8]) -> [u8; STREAM_KEY_SIZE] {
    let mut out = [0u8; STREAM_KEY_SIZE];
    out.copy_from_slice(&digest[..STREAM_KEY_SIZE]);
    out
}

/// Errors that can occur while deriving mirror stream keys
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncryptionError {
    #[error("ECDH secret must hold at least 32 bytes, got `{0}`")]
    EcdhSecretTooShort(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_key() -> [u8; 16] {
        std::array::from_fn(|i| i as u8)
    }

    fn ecdh_secret() -> Vec<u8> {
        (0x20..0x40).collect()
    }

    #[test]
    fn test_session_key_golden_value() {
        let session_key = derive_session_key(&raw_key(), &ecdh_secret()).unwrap();
        assert_eq!(hex::encode(session_key), "845e82df15aa7c75fa1964c1557f80a8");
    }

    #[test]
    fn test_mirror_key_material_golden_value() {
        let material = derive_mirror_key_material(&raw_key(), &ecdh_secret(), 1_234_567_890_123)
            .unwrap();
        assert_eq!(
            hex::encode(material.stream_key),
            "043808327c26657b9cb2b65deba2ec9e"
        );
        assert_eq!(
            hex::encode(material.stream_iv),
            "f78adf47e79f4976b7785769d6e5cc2e"
        );
    }

    #[test]
    fn test_stream_id_is_formatted_unsigned() {
        let material = derive_mirror_key_material(&raw_key(), &ecdh_secret(), u64::MAX).unwrap();
        assert_eq!(
            hex::encode(material.stream_key),
            "c52546974775b42231d068d0cc5fce2c"
        );
        assert_eq!(
            hex::encode(material.stream_iv),
            "ae0a6c4dcf008efcda7d864a40ceb100"
        );
    }

    #[test]
    fn test_ecdh_secret_excess_is_ignored() {
        let mut long_secret = ecdh_secret();
        long_secret.extend_from_slice(&[0xff; 16]);
        assert_eq!(
            derive_session_key(&raw_key(), &long_secret).unwrap(),
            derive_session_key(&raw_key(), &ecdh_secret()).unwrap()
        );
    }

    #[test]
    fn test_short_ecdh_secret_is_rejected() {
        let result = derive_session_key(&raw_key(), &[0u8; 31]);
        assert_eq!(result, Err(EncryptionError::EcdhSecretTooShort(31)));
    }

    #[test]
    fn test_stream_cipher_golden_value() {
        let material = derive_mirror_key_material(&raw_key(), &ecdh_secret(), 1_234_567_890_123)
            .unwrap();
        let mut buffer = *b"mirror frame payload 0123456789!";
        new_stream_cipher(&material).apply_keystream(&mut buffer);
        assert_eq!(
            hex::encode(buffer),
            "8c8892fa67630aa987e4647efbc43ed44f474707e6e42f6a9184e3aa8fe3b04d"
        );
    }
}
