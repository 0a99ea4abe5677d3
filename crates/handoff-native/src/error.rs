//! Error handling for the native boundary
//!
//! Nothing in here ever crosses the boundary as a value. A failed entry
//! point records its reason with `set_last_error` and hands back the null
//! sentinel instead.

use std::any::Any;
use std::os::raw::c_int;
use std::panic;

use thiserror::Error;

/// Reasons an entry point can fall back to the null sentinel
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NativeError {
    /// A required pointer argument was null
    #[error("{0} is null")]
    NullPointer(&'static str),

    /// A count argument was negative
    #[error("{name} must not be negative (got {value})")]
    NegativeCount {
        /// Argument name
        name: &'static str,
        /// Value received
        value: c_int,
    },

    /// Produced text contained an interior NUL byte
    #[error("text contains an interior NUL byte")]
    InteriorNul,

    /// The dictionary had nothing to offer for the word
    #[error("no suggestion for {word:?}")]
    NoSuggestion {
        /// Normalized word that missed
        word: String,
    },

    /// The URL could not be parsed into a scrape target
    #[error("invalid url {url:?}: {reason}")]
    InvalidUrl {
        /// URL as received
        url: String,
        /// Parser complaint
        reason: String,
    },

    /// The HTTP request failed or timed out
    #[error("request to {url} failed: {reason}")]
    Request {
        /// Target URL
        url: String,
        /// Client complaint
        reason: String,
    },

    /// The async runtime could not be started
    #[error("runtime error: {0}")]
    Runtime(String),

    /// A panic was caught at the boundary
    #[error("panic occurred: {0}")]
    Panic(String),
}

/// Result alias for native internals
pub type Result<T> = std::result::Result<T, NativeError>;

/// Safely execute a closure that might panic
///
/// Panics are turned into [`NativeError::Panic`] so they never unwind
/// into foreign frames.
pub fn catch_panic<F, R>(f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + panic::UnwindSafe,
{
    match panic::catch_unwind(f) {
        Ok(result) => result,
        Err(panic_info) => Err(NativeError::Panic(get_panic_message(&panic_info))),
    }
}

/// Extract a message from panic info
fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run an allocating entry point body, converting any failure into the
/// null sentinel and recording the reason for `handoff_last_error`.
#[macro_export]
macro_rules! ffi_boundary {
    ($entry:literal, $body:expr) => {{
        $crate::memory::clear_last_error();
        match $crate::error::catch_panic(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(ptr) => ptr,
            Err(err) => {
                tracing::warn!(entry_point = $entry, error = %err, "returning null sentinel");
                $crate::memory::set_last_error(err.to_string());
                std::ptr::null_mut()
            }
        }
    }};
}

/// Validate that a pointer is not null
pub fn validate_ptr<T>(ptr: *const T, name: &'static str) -> Result<()> {
    if ptr.is_null() {
        Err(NativeError::NullPointer(name))
    } else {
        Ok(())
    }
}

/// Validate a caller-supplied element count
pub fn validate_count(value: c_int, name: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| NativeError::NegativeCount { name, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_catching() {
        let result = catch_panic(|| {
            panic!("Test panic");
            #[allow(unreachable_code)]
            Ok(42)
        });

        assert_eq!(result, Err(NativeError::Panic("Test panic".to_string())));
    }

    #[test]
    fn test_ptr_validation() {
        let value = 42;
        let ptr = &value as *const i32;

        assert!(validate_ptr(ptr, "test_ptr").is_ok());
        assert_eq!(
            validate_ptr(std::ptr::null::<i32>(), "null_ptr"),
            Err(NativeError::NullPointer("null_ptr"))
        );
    }

    #[test]
    fn test_count_validation() {
        assert_eq!(validate_count(0, "count"), Ok(0));
        assert_eq!(validate_count(7, "count"), Ok(7));
        assert!(matches!(
            validate_count(-1, "count"),
            Err(NativeError::NegativeCount { value: -1, .. })
        ));
    }

    #[test]
    fn test_boundary_macro_returns_sentinel() {
        fn failing() -> *mut u8 {
            ffi_boundary!("failing", Err(NativeError::NullPointer("input")))
        }
        fn panicking() -> *mut u8 {
            ffi_boundary!("panicking", {
                panic!("boom");
                #[allow(unreachable_code)]
                Ok(std::ptr::null_mut())
            })
        }

        assert!(failing().is_null());
        assert!(panicking().is_null());
    }
}
