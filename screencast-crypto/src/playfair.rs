//! Link to the external `libplayfair` FairPlay key recovery routine

use std::os::raw::c_uchar;

use screencast_utils::constants::{ENCRYPTED_KEY_SIZE, KEY_MESSAGE_SIZE, RECOVERED_KEY_SIZE};

use crate::key_unwrap::KeyUnwrapPrimitive;

#[link(name = "playfair")]
extern "C" {
    fn playfair_decrypt(
        message3: *mut c_uchar,
        cipher_text: *mut c_uchar,
        key_out: *mut c_uchar,
    );
}

/// The native `playfair_decrypt` primitive
#[derive(Debug, Clone, Copy, Default)]
pub struct Playfair;

impl KeyUnwrapPrimitive for Playfair {
    fn decrypt(
        &self,
        key_message: &[u8; KEY_MESSAGE_SIZE],
        encrypted_key: &[u8; ENCRYPTED_KEY_SIZE],
        out: &mut [u8; RECOVERED_KEY_SIZE],
    ) {
        // The C signature takes mutable pointers; hand it copies so the caller's buffers stay untouched
        let mut key_message = *key_message;
        let mut encrypted_key = *encrypted_key;
        // SAFETY: all three buffers are live, exclusively borrowed and sized as the routine expects
        unsafe {
            playfair_decrypt(
                key_message.as_mut_ptr(),
                encrypted_key.as_mut_ptr(),
                out.as_mut_ptr(),
            );
        }
    }
}
