//! Copying native memory into owned Rust values
//!
//! Decoding only ever reads. Text is repaired with U+FFFD rather than
//! rejected, so the only way a record fails to decode is a missing field.

use std::ffi::CStr;
use std::fmt;
use std::os::raw::{c_char, c_int};

/// A record whose required field held the null sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Degenerate {
    /// First field found missing
    pub field: &'static str,
}

impl fmt::Display for Degenerate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field {} is null", self.field)
    }
}

/// Copy null-terminated text, replacing invalid UTF-8
///
/// Returns `None` for the null sentinel.
///
/// # Safety
/// `ptr` must be null or point to a valid null-terminated string.
pub unsafe fn decode_text(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }

    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

/// Copy a text field that must be present
///
/// # Safety
/// Same contract as [`decode_text`].
pub unsafe fn required_text(ptr: *const c_char, field: &'static str) -> Result<String, Degenerate> {
    decode_text(ptr).ok_or(Degenerate { field })
}

/// A caller-side value copied out of a native layout
pub trait ForeignRecord: Sized {
    /// The `#[repr(C)]` layout as the native side lays it out
    type Raw;

    /// Copy every field out of `raw`
    ///
    /// # Safety
    /// Every non-null pointer inside `raw` must be valid for reads.
    unsafe fn decode(raw: &Self::Raw) -> Result<Self, Degenerate>;
}

impl ForeignRecord for i32 {
    type Raw = c_int;

    unsafe fn decode(raw: &c_int) -> Result<Self, Degenerate> {
        Ok(*raw)
    }
}

impl ForeignRecord for String {
    type Raw = *mut c_char;

    unsafe fn decode(raw: &*mut c_char) -> Result<Self, Degenerate> {
        required_text(*raw, "text")
    }
}
