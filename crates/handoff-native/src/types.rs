//! Record layouts shared with foreign callers
//!
//! Field order and widths are part of the contract. A record owns every
//! non-null text field it holds, and dropping the record frees them.

use std::os::raw::{c_char, c_float, c_int};
use std::ptr;

use crate::memory::release_string;

/// Metadata scraped from one URL
///
/// A failed scrape inside a batch keeps `url` and leaves every other text
/// field null with `port` 0.
#[repr(C)]
#[derive(Debug)]
pub struct Site {
    /// URL as requested
    pub url: *mut c_char,
    /// Host name
    pub domain: *mut c_char,
    /// `Server` response header, empty when absent
    pub server: *mut c_char,
    /// URL scheme
    pub protocol: *mut c_char,
    /// `Content-Type` response header
    pub content_type: *mut c_char,
    /// Response body
    pub body: *mut c_char,
    /// Explicit or scheme-default port
    pub port: c_int,
}

impl Site {
    /// Slot for a URL that could not be scraped
    pub(crate) fn failed(url: *mut c_char) -> Self {
        Self {
            url,
            domain: ptr::null_mut(),
            server: ptr::null_mut(),
            protocol: ptr::null_mut(),
            content_type: ptr::null_mut(),
            body: ptr::null_mut(),
            port: 0,
        }
    }
}

impl Drop for Site {
    fn drop(&mut self) {
        unsafe {
            release_string(self.url);
            release_string(self.domain);
            release_string(self.server);
            release_string(self.protocol);
            release_string(self.content_type);
            release_string(self.body);
        }
    }
}

/// A person record
#[repr(C)]
#[derive(Debug)]
pub struct User {
    /// Display name
    pub name: *mut c_char,
    /// Age in years
    pub age: c_int,
    /// Contact address
    pub email: *mut c_char,
}

impl Drop for User {
    fn drop(&mut self) {
        unsafe {
            release_string(self.name);
            release_string(self.email);
        }
    }
}

/// Closest dictionary word for a lookup
///
/// `likelihood` is a percentage; a word found verbatim reports 0.0. A miss
/// inside a batch leaves `word` null.
#[repr(C)]
#[derive(Debug)]
pub struct Suggestion {
    /// Suggested word
    pub word: *mut c_char,
    /// Similarity as a percentage
    pub likelihood: c_float,
}

impl Suggestion {
    pub(crate) fn missing() -> Self {
        Self {
            word: ptr::null_mut(),
            likelihood: 0.0,
        }
    }
}

impl Drop for Suggestion {
    fn drop(&mut self) {
        unsafe {
            release_string(self.word);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::allocate_string;
    use std::mem::{align_of, size_of};

    #[test]
    fn test_layouts_follow_declaration_order() {
        let ptr = size_of::<*mut c_char>();
        assert_eq!(size_of::<Suggestion>(), ptr * 2);
        assert_eq!(std::mem::offset_of!(Site, port), ptr * 6);
        assert_eq!(std::mem::offset_of!(User, age), ptr);
        assert_eq!(std::mem::offset_of!(User, email), ptr * 2);
        assert_eq!(align_of::<Site>(), align_of::<*mut c_char>());
    }

    #[test]
    fn test_drop_with_null_fields() {
        let url = allocate_string("https://example.com").unwrap();
        drop(Site::failed(url));
        drop(Suggestion::missing());
    }
}
