pub mod constants;
pub mod encryption;
pub mod hashing;
