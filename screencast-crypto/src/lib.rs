#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod ffi;
pub mod key_unwrap;
pub mod mirror;
#[cfg(feature = "playfair")]
pub mod playfair;
pub mod types;

pub use config::KeyUnwrapConfig;
pub use key_unwrap::{KeyUnwrapBridge, KeyUnwrapError, KeyUnwrapPrimitive};
pub use mirror::MirrorStreamDecryptor;
#[cfg(feature = "playfair")]
pub use playfair::Playfair;
pub use types::{EncryptedKey, KeyMessage, RecoveredKey};
