//! Primitive array entry points

use std::os::raw::{c_char, c_int};

use crate::error::validate_count;
use crate::ffi_boundary;
use crate::memory::{allocate_array, allocate_string, copy_c_str, release_array, release_string};

/// First `n` terms of the sequence 1, 1, 2, 3, 5, ...
///
/// Terms past the 32-bit range wrap.
fn fibonacci(n: usize) -> Vec<c_int> {
    let mut terms = Vec::with_capacity(n);
    let (mut a, mut b): (c_int, c_int) = (1, 1);
    for _ in 0..n {
        terms.push(a);
        (a, b) = (b, a.wrapping_add(b));
    }
    terms
}

/// Produce the first `n` Fibonacci numbers
///
/// Returns null if `n` is negative. `n == 0` yields a zero-length block
/// that must still be released.
///
/// # Safety
/// A non-null result must be freed with `handoff_free_int_array(ptr, n)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_fib_sequence(n: c_int) -> *mut c_int {
    ffi_boundary!("handoff_fib_sequence", {
        let len = validate_count(n, "n")?;
        Ok(allocate_array(fibonacci(len)))
    })
}

/// Free an array returned by `handoff_fib_sequence`
///
/// # Safety
/// `ptr` must be null or come from `handoff_fib_sequence(count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_int_array(ptr: *mut c_int, count: c_int) {
    release_array(ptr, count);
}

/// Produce `count` copies of `text`
///
/// Returns null if `text` is null or `count` is negative.
///
/// # Safety
/// `text` must be null or a valid null-terminated string. A non-null result
/// must be freed with `handoff_free_string_array(ptr, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_multiply_string(text: *const c_char, count: c_int) -> *mut *mut c_char {
    ffi_boundary!("handoff_multiply_string", {
        let text = copy_c_str(text, "text")?;
        let len = validate_count(count, "count")?;

        let mut copies = Vec::with_capacity(len);
        for _ in 0..len {
            match allocate_string(text.as_bytes()) {
                Ok(copy) => copies.push(copy),
                Err(err) => {
                    for copy in copies {
                        release_string(copy);
                    }
                    return Err(err);
                }
            }
        }

        Ok(allocate_array(copies))
    })
}

/// Free an array returned by `handoff_multiply_string`
///
/// Every string is freed before the block holding them.
///
/// # Safety
/// `ptr` must be null or come from `handoff_multiply_string(_, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_string_array(ptr: *mut *mut c_char, count: c_int) {
    if ptr.is_null() {
        return;
    }
    if let Ok(len) = validate_count(count, "count") {
        for &text in std::slice::from_raw_parts(ptr, len) {
            release_string(text);
        }
    }
    release_array(ptr, count);
}
