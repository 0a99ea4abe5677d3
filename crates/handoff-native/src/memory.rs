//! Memory management utilities for the boundary
//!
//! Allocation helpers produce the raw shapes handed to callers, and the
//! matching `free_*` helpers take them back. Owned text is always a
//! `CString` leaked with `into_raw`; arrays are always a boxed slice
//! leaked with `Box::into_raw`, so the count is needed to reclaim them.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;

use crate::error::{validate_count, NativeError, Result};

// Thread-local storage for last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Set the last error message for the current thread
pub fn set_last_error<S: Into<String>>(err: S) {
    let mut bytes = err.into().into_bytes();
    bytes.retain(|b| *b != 0);
    let error_string = CString::new(bytes).unwrap_or_default();

    LAST_ERROR.with(|e| {
        *e.borrow_mut() = Some(error_string);
    });
}

/// Clear the last error message
pub fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Allocate owned text for return across the boundary
///
/// The caller must free this text using `handoff_string_free`, or through
/// the release function of the record that holds it.
pub fn allocate_string(s: impl Into<Vec<u8>>) -> Result<*mut c_char> {
    CString::new(s)
        .map(CString::into_raw)
        .map_err(|_| NativeError::InteriorNul)
}

/// Allocate owned text, dropping any NUL bytes instead of failing
pub fn allocate_lossy(s: impl Into<Vec<u8>>) -> *mut c_char {
    let mut bytes = s.into();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).map_or(ptr::null_mut(), CString::into_raw)
}

/// Release owned text produced by `allocate_string`; null is a no-op
///
/// # Safety
/// The pointer must be null or have come from this crate's allocators,
/// and must not be used afterwards.
pub unsafe fn release_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }

    // Reconstruct the CString and let it drop
    drop(CString::from_raw(s));
}

/// Free text returned by a handoff entry point
///
/// # Safety
/// The pointer must have been returned by a handoff entry point as owned
/// text, and must not be freed twice. Null is a no-op.
#[no_mangle]
pub unsafe extern "C" fn handoff_string_free(s: *mut c_char) {
    release_string(s);
}

/// Leak a vector as a contiguous block whose length the caller tracks
///
/// An empty vector still yields a non-null, zero-length block.
pub fn allocate_array<T>(items: Vec<T>) -> *mut T {
    Box::into_raw(items.into_boxed_slice()) as *mut T
}

/// Reclaim a block produced by `allocate_array`, dropping every element
/// before the block itself
///
/// # Safety
/// `ptr` must be null or come from `allocate_array::<T>` with exactly
/// `count` elements, and must not be used afterwards.
pub unsafe fn release_array<T>(ptr: *mut T, count: c_int) {
    if ptr.is_null() {
        return;
    }

    let len = match validate_count(count, "count") {
        Ok(len) => len,
        Err(err) => {
            // Leaking beats reconstructing a slice of the wrong length
            tracing::error!(error = %err, "refusing to release array");
            return;
        }
    };

    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

/// Copy a caller's null-terminated text byte for byte
///
/// # Safety
/// The pointer must be null or point to a valid null-terminated string.
pub unsafe fn copy_c_str(s: *const c_char, name: &'static str) -> Result<CString> {
    if s.is_null() {
        return Err(NativeError::NullPointer(name));
    }

    Ok(CStr::from_ptr(s).to_owned())
}

/// Borrow a caller's array of text pointers
///
/// A zero count accepts a null array. Individual null entries are kept as
/// `None` so that each slot still maps to its input index.
///
/// # Safety
/// When `count > 0`, `items` must point to `count` readable pointers, each
/// null or pointing to a valid null-terminated string.
pub unsafe fn borrow_text_array<'a>(
    items: *const *const c_char,
    count: c_int,
    name: &'static str,
) -> Result<Vec<Option<&'a CStr>>> {
    let len = validate_count(count, "count")?;
    if len == 0 {
        return Ok(Vec::new());
    }
    if items.is_null() {
        return Err(NativeError::NullPointer(name));
    }

    Ok(std::slice::from_raw_parts(items, len)
        .iter()
        .map(|&item| (!item.is_null()).then(|| CStr::from_ptr(item)))
        .collect())
}

/// Get the last error message recorded on this thread
///
/// Returns null when the last call succeeded.
///
/// # Safety
/// Returns a borrowed pointer that should NOT be freed by the caller. It
/// stays valid until the next entry point call on the same thread.
#[no_mangle]
pub unsafe extern "C" fn handoff_last_error() -> *const c_char {
    LAST_ERROR.with(|e| match &*e.borrow() {
        Some(err) => err.as_ptr(),
        None => ptr::null(),
    })
}

/// Clear the last error message
#[no_mangle]
pub extern "C" fn handoff_clear_error() {
    clear_last_error();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_handling() {
        set_last_error("Test error");
        unsafe {
            let error = handoff_last_error();
            assert!(!error.is_null());
            let error_str = CStr::from_ptr(error).to_str().unwrap();
            assert_eq!(error_str, "Test error");
        }

        clear_last_error();
        unsafe {
            let error = handoff_last_error();
            assert!(error.is_null());
        }
    }

    #[test]
    fn test_error_with_nul_is_kept() {
        set_last_error("bad\0input");
        unsafe {
            let error = CStr::from_ptr(handoff_last_error());
            assert_eq!(error.to_str().unwrap(), "badinput");
        }
        clear_last_error();
    }

    #[test]
    fn test_string_allocation() {
        let ptr = allocate_string("Hello, World!").unwrap();
        assert!(!ptr.is_null());

        unsafe {
            assert_eq!(CStr::from_ptr(ptr).to_str().unwrap(), "Hello, World!");
            handoff_string_free(ptr);
        }

        assert_eq!(allocate_string("a\0b"), Err(NativeError::InteriorNul));
    }

    #[test]
    fn test_lossy_allocation_drops_nul() {
        let ptr = allocate_lossy("a\0b");
        unsafe {
            assert_eq!(CStr::from_ptr(ptr).to_bytes(), b"ab");
            release_string(ptr);
        }
    }

    #[test]
    fn test_null_string_free() {
        unsafe {
            handoff_string_free(ptr::null_mut());
        }
    }

    #[test]
    fn test_empty_array_is_not_null() {
        let ptr = allocate_array(Vec::<c_int>::new());
        assert!(!ptr.is_null());
        unsafe {
            release_array(ptr, 0);
            release_array(ptr::null_mut::<c_int>(), 3);
        }
    }

    #[test]
    fn test_text_array_borrowing() {
        let a = CString::new("a").unwrap();
        let items = [a.as_ptr(), ptr::null()];

        unsafe {
            let borrowed = borrow_text_array(items.as_ptr(), 2, "items").unwrap();
            assert_eq!(borrowed.len(), 2);
            assert_eq!(borrowed[0].unwrap().to_bytes(), b"a");
            assert!(borrowed[1].is_none());

            assert!(borrow_text_array(ptr::null(), 0, "items").unwrap().is_empty());
            assert_eq!(
                borrow_text_array(ptr::null(), 1, "items"),
                Err(NativeError::NullPointer("items"))
            );
            assert!(borrow_text_array(items.as_ptr(), -1, "items").is_err());
        }
    }
}
