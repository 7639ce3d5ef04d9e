//! C ABI for calling the key unwrap bridge from a managed runtime.
//!
//! The runtime passes its byte arrays as pointer/length pairs and receives either a
//! freshly allocated 16-byte buffer or null. Buffers returned here must be released
//! with `screencast_free_key`.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    ptr, slice,
};

use screencast_utils::constants::RECOVERED_KEY_SIZE;
use zeroize::Zeroize;

#[cfg(feature = "playfair")]
use crate::playfair::Playfair;
use crate::{
    key_unwrap::{KeyUnwrapBridge, KeyUnwrapPrimitive},
    types::RecoveredKey,
};

/// Recovers the FairPlay AES key with the native `playfair_decrypt` routine.
///
/// @param[in] key_message Pointer to the peer's key message
/// @param[in] key_message_len Length of the key message, at least 164
/// @param[in] encrypted_key Pointer to the wrapped AES key
/// @param[in] encrypted_key_len Length of the wrapped key, at least 72
///
/// @return A new 16-byte buffer owned by the caller, or null if an input is null,
/// too short, or the buffer could not be allocated.
///
/// # Safety
/// Each non-null pointer must be valid for reads of its paired length for the
/// duration of the call.
#[cfg(feature = "playfair")]
#[no_mangle]
pub unsafe extern "C" fn screencast_recover_key(
    key_message: *const u8,
    key_message_len: usize,
    encrypted_key: *const u8,
    encrypted_key_len: usize,
) -> *mut u8 {
    recover_key_raw(
        &KeyUnwrapBridge::new(Playfair),
        key_message,
        key_message_len,
        encrypted_key,
        encrypted_key_len,
    )
}

/// Zeroes and releases a buffer returned by `screencast_recover_key`.
///
/// @param[in] key Buffer to release; null is ignored
///
/// # Safety
/// `key` must be null or a pointer returned by `screencast_recover_key` that has
/// not been freed yet.
#[cfg(feature = "playfair")]
#[no_mangle]
pub unsafe extern "C" fn screencast_free_key(key: *mut u8) {
    free_raw_key(key);
}

/// Marshals raw runtime buffers through `bridge`.
///
/// Null pointers are treated as absent inputs. A panic inside the primitive is
/// caught here and reported as null instead of unwinding into the caller.
///
/// # Safety
/// Each non-null pointer must be valid for reads of its paired length for the
/// duration of the call.
pub unsafe fn recover_key_raw<P: KeyUnwrapPrimitive>(
    bridge: &KeyUnwrapBridge<P>,
    key_message: *const u8,
    key_message_len: usize,
    encrypted_key: *const u8,
    encrypted_key_len: usize,
) -> *mut u8 {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let key_message = slice_from_raw(key_message, key_message_len);
        let encrypted_key = slice_from_raw(encrypted_key, encrypted_key_len);
        let key = bridge.recover_key(key_message, encrypted_key)?;
        into_raw_key(&key)
    }));

    match result {
        Ok(Some(key)) => key,
        Ok(None) => ptr::null_mut(),
        Err(_) => {
            tracing::error!(
                target = "screencast-crypto",
                event = "abi_boundary_panic",
                "Key recovery panicked at the C ABI boundary"
            );
            ptr::null_mut()
        }
    }
}

/// Zeroes and releases a buffer produced by [`recover_key_raw`].
///
/// # Safety
/// `key` must be null or a pointer returned by [`recover_key_raw`] that has not
/// been freed yet.
pub unsafe fn free_raw_key(key: *mut u8) {
    if key.is_null() {
        return;
    }
    let mut buffer = Box::from_raw(ptr::slice_from_raw_parts_mut(key, RECOVERED_KEY_SIZE));
    buffer.zeroize();
}

unsafe fn slice_from_raw<'a>(data: *const u8, len: usize) -> Option<&'a [u8]> {
    if data.is_null() {
        None
    } else {
        Some(slice::from_raw_parts(data, len))
    }
}

fn into_raw_key(key: &RecoveredKey) -> Option<*mut u8> {
    let mut buffer: Vec<u8> = Vec::new();
    if let Err(e) = buffer.try_reserve_exact(RECOVERED_KEY_SIZE) {
        tracing::error!(
            target = "screencast-crypto",
            event = "recovered_key_allocation_failed",
            "Failed to allocate recovered key buffer: {e}"
        );
        return None;
    }
    buffer.extend_from_slice(key.as_bytes());
    Some(Box::into_raw(buffer.into_boxed_slice()).cast::<u8>())
}
