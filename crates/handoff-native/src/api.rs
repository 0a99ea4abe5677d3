//! Scalar and owned-text entry points
//!
//! These exercise the simplest shapes: a primitive in and out, and a
//! single owned string released with `handoff_string_free`.

use std::os::raw::{c_char, c_int};

use crate::ffi_boundary;
use crate::memory::{allocate_string, copy_c_str};

const GREETING_PREFIX: &[u8] = b"Hello ";
const GREETING_SUFFIX: &[u8] = b"\nHow's your day?\n";

/// Get the library version
///
/// Returns static text that must not be freed.
#[no_mangle]
pub extern "C" fn handoff_version() -> *const c_char {
    concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Compute `n!`
///
/// Returns 0 for negative input or when the result overflows 32 bits.
#[no_mangle]
pub extern "C" fn handoff_factorial(n: c_int) -> c_int {
    if n < 0 {
        return 0;
    }

    (1..=n).try_fold(1 as c_int, |acc, k| acc.checked_mul(k)).unwrap_or(0)
}

/// Build a greeting for `name`
///
/// The name bytes are copied verbatim. Returns null if `name` is null.
///
/// # Safety
/// `name` must be null or a valid null-terminated string. A non-null result
/// must be freed with `handoff_string_free`.
#[no_mangle]
pub unsafe extern "C" fn handoff_greet(name: *const c_char) -> *mut c_char {
    ffi_boundary!("handoff_greet", {
        let name = copy_c_str(name, "name")?;

        let mut greeting =
            Vec::with_capacity(GREETING_PREFIX.len() + name.as_bytes().len() + GREETING_SUFFIX.len());
        greeting.extend_from_slice(GREETING_PREFIX);
        greeting.extend_from_slice(name.as_bytes());
        greeting.extend_from_slice(GREETING_SUFFIX);

        allocate_string(greeting)
    })
}
