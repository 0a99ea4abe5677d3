//! Boundary tests
//!
//! These tests drive the exported entry points the way a foreign caller
//! would: raw pointers in, raw pointers out, and one release per
//! allocation.

use handoff_native::*;
use serial_test::serial;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

/// Helper to convert Rust string to C string
fn to_c_string(s: &str) -> CString {
    CString::new(s).unwrap()
}

/// Helper to convert C string pointer to Rust string
unsafe fn from_c_string(s: *const c_char) -> String {
    if s.is_null() {
        String::new()
    } else {
        CStr::from_ptr(s).to_string_lossy().into_owned()
    }
}

#[test]
#[serial]
fn test_null_pointer_handling() {
    unsafe {
        assert!(handoff_greet(ptr::null()).is_null());

        // Error message should be set
        let error = handoff_last_error();
        assert!(!error.is_null());
        assert_eq!(from_c_string(error), "name is null");

        // Clear error
        handoff_clear_error();
        assert!(handoff_last_error().is_null());
    }
}

#[test]
#[serial]
fn test_success_clears_previous_error() {
    let name = to_c_string("Grace");
    unsafe {
        assert!(handoff_spellcheck(ptr::null()).is_null());
        assert!(!handoff_last_error().is_null());

        let greeting = handoff_greet(name.as_ptr());
        assert!(!greeting.is_null());
        assert!(handoff_last_error().is_null());
        handoff_string_free(greeting);
    }
}

#[test]
fn test_invalid_utf8_is_copied_verbatim() {
    let invalid = [b'N', 0xFF, 0xFE, 0x00];
    let email = to_c_string("n@example.com");
    unsafe {
        let user = handoff_create_user(invalid.as_ptr() as *const c_char, 20, email.as_ptr());
        assert!(!user.is_null());
        assert_eq!(CStr::from_ptr((*user).name).to_bytes(), &invalid[..3]);
        assert_eq!(from_c_string((*user).name), "N\u{FFFD}\u{FFFD}");
        handoff_free_user(user);
    }
}

#[test]
fn test_release_functions_accept_null() {
    unsafe {
        handoff_string_free(ptr::null_mut());
        handoff_free_int_array(ptr::null_mut(), 4);
        handoff_free_string_array(ptr::null_mut(), 4);
        handoff_free_user(ptr::null_mut());
        handoff_free_users(ptr::null_mut(), 4);
        handoff_free_suggestion(ptr::null_mut());
        handoff_free_suggestions(ptr::null_mut(), 4);
        handoff_free_site(ptr::null_mut());
        handoff_free_sites(ptr::null_mut(), 4);
    }
}

#[test]
fn test_zero_length_arrays_are_released() {
    unsafe {
        let ints = handoff_fib_sequence(0);
        assert!(!ints.is_null());
        handoff_free_int_array(ints, 0);

        let text = to_c_string("x");
        let strings = handoff_multiply_string(text.as_ptr(), 0);
        assert!(!strings.is_null());
        handoff_free_string_array(strings, 0);

        let users = handoff_create_random_users(0);
        assert!(!users.is_null());
        handoff_free_users(users, 0);

        let suggestions = handoff_spellcheck_words(ptr::null(), 0);
        assert!(!suggestions.is_null());
        handoff_free_suggestions(suggestions, 0);
    }
}

#[test]
fn test_negative_counts_are_sentinels() {
    let text = to_c_string("x");
    unsafe {
        assert!(handoff_fib_sequence(-1).is_null());
        assert!(handoff_multiply_string(text.as_ptr(), -1).is_null());
        assert!(handoff_create_random_users(-1).is_null());
        assert!(handoff_spellcheck_words(ptr::null(), -1).is_null());
        assert!(handoff_scrape_sites(ptr::null(), -1).is_null());
    }
}

#[test]
fn test_batch_preserves_input_order() {
    let inputs = ["housr", "", "watr", "gren"];
    let owned: Vec<CString> = inputs.iter().map(|w| to_c_string(w)).collect();
    let ptrs: Vec<*const c_char> = owned.iter().map(|w| w.as_ptr()).collect();

    unsafe {
        let batch = handoff_spellcheck_words(ptrs.as_ptr(), ptrs.len() as i32);
        assert!(!batch.is_null());
        let slots = std::slice::from_raw_parts(batch, ptrs.len());

        let words: Vec<String> = slots.iter().map(|s| from_c_string(s.word)).collect();
        assert_eq!(words, vec!["hour", "", "water", "green"]);

        handoff_free_suggestions(batch, ptrs.len() as i32);
    }
}

#[test]
fn test_concurrent_calls() {
    use std::thread;

    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || unsafe {
                let name = to_c_string(&format!("worker-{}", i));
                let greeting = handoff_greet(name.as_ptr());
                assert!(!greeting.is_null());
                let text = from_c_string(greeting);
                handoff_string_free(greeting);

                let users = handoff_create_random_users(16);
                assert!(!users.is_null());
                handoff_free_users(users, 16);

                text
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        let text = handle.join().unwrap();
        assert!(text.contains(&format!("worker-{}", i)));
    }
}

#[test]
fn test_large_input() {
    let large = "a".repeat(1_000_000);
    let name = to_c_string(&large);
    unsafe {
        let greeting = handoff_greet(name.as_ptr());
        assert!(!greeting.is_null());
        assert_eq!(CStr::from_ptr(greeting).to_bytes().len(), large.len() + 23);
        handoff_string_free(greeting);
    }
}

#[test]
fn test_version_is_static() {
    let version = unsafe { from_c_string(handoff_version()) };
    assert!(version.starts_with("handoff-native "));
}
