/// Size of the peer-issued key message consumed by the key recovery primitive
pub const KEY_MESSAGE_SIZE: usize = 164;

/// Size of the wrapped (encrypted) symmetric key
pub const ENCRYPTED_KEY_SIZE: usize = 72;

/// Size of the recovered AES-128 key
pub const RECOVERED_KEY_SIZE: usize = 16;

/// Number of bytes of the ECDH shared secret mixed into the mirror session key
pub const ECDH_SECRET_SIZE: usize = 32;

/// AES-128 key and CTR initial counter block size
pub const STREAM_KEY_SIZE: usize = 16;
