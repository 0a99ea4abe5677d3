//! Encoding caller inputs into the agreed binary form

use std::ffi::CString;
use std::os::raw::{c_char, c_int};

use crate::error::{MarshalError, Result};

/// Encode text as UTF-8 plus a null terminator
pub fn encode_text(entry_point: &'static str, text: &str) -> Result<CString> {
    CString::new(text).map_err(|e| MarshalError::InvalidInput {
        entry_point,
        reason: format!("interior NUL byte at position {}", e.nul_position()),
    })
}

/// Encode a count as the native 32-bit integer
pub fn encode_count(entry_point: &'static str, count: usize) -> Result<c_int> {
    c_int::try_from(count).map_err(|_| MarshalError::InvalidInput {
        entry_point,
        reason: format!("count {} does not fit in a 32-bit integer", count),
    })
}

/// A contiguous array of text pointers plus the strings backing them
///
/// The pointers are valid for as long as this value lives.
pub struct TextArray {
    owned: Vec<CString>,
    pointers: Vec<*const c_char>,
    count: c_int,
}

impl TextArray {
    /// Encode every item, failing on the first one that cannot be encoded
    pub fn encode<S: AsRef<str>>(entry_point: &'static str, items: &[S]) -> Result<Self> {
        let count = encode_count(entry_point, items.len())?;
        let owned = items
            .iter()
            .map(|item| encode_text(entry_point, item.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        let pointers = owned.iter().map(|s| s.as_ptr()).collect();

        Ok(Self {
            owned,
            pointers,
            count,
        })
    }

    /// Base address of the pointer array
    pub fn as_ptr(&self) -> *const *const c_char {
        self.pointers.as_ptr()
    }

    /// Element count as passed to the native side
    pub fn count(&self) -> c_int {
        self.count
    }

    /// Caller-side label for element `index`
    pub fn label(&self, index: usize) -> String {
        self.owned
            .get(index)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("#{}", index))
    }
}
