//! Record layouts and their decoded values
//!
//! The `Raw*` structs mirror the native layouts field for field. They are
//! only ever seen behind a guard; the plain structs are what callers get.

use std::os::raw::{c_char, c_float, c_int};

use serde::{Deserialize, Serialize};

use crate::decode::{required_text, Degenerate, ForeignRecord};

/// Native layout of a scraped site
#[repr(C)]
#[derive(Debug)]
pub struct RawSite {
    pub url: *mut c_char,
    pub domain: *mut c_char,
    pub server: *mut c_char,
    pub protocol: *mut c_char,
    pub content_type: *mut c_char,
    pub body: *mut c_char,
    pub port: c_int,
}

/// Native layout of a user
#[repr(C)]
#[derive(Debug)]
pub struct RawUser {
    pub name: *mut c_char,
    pub age: c_int,
    pub email: *mut c_char,
}

/// Native layout of a spellcheck suggestion
#[repr(C)]
#[derive(Debug)]
pub struct RawSuggestion {
    pub word: *mut c_char,
    pub likelihood: c_float,
}

/// Metadata scraped from one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub url: String,
    pub domain: String,
    pub server: String,
    pub protocol: String,
    pub content_type: String,
    pub body: String,
    pub port: i32,
}

impl ForeignRecord for Site {
    type Raw = RawSite;

    unsafe fn decode(raw: &RawSite) -> Result<Self, Degenerate> {
        Ok(Self {
            url: required_text(raw.url, "url")?,
            domain: required_text(raw.domain, "domain")?,
            server: required_text(raw.server, "server")?,
            protocol: required_text(raw.protocol, "protocol")?,
            content_type: required_text(raw.content_type, "content_type")?,
            body: required_text(raw.body, "body")?,
            port: raw.port,
        })
    }
}

/// A person record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub age: i32,
    pub email: String,
}

impl ForeignRecord for User {
    type Raw = RawUser;

    unsafe fn decode(raw: &RawUser) -> Result<Self, Degenerate> {
        Ok(Self {
            name: required_text(raw.name, "name")?,
            age: raw.age,
            email: required_text(raw.email, "email")?,
        })
    }
}

/// Closest dictionary word for a lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub word: String,
    /// Similarity as a percentage; 0.0 means the word was already correct
    pub likelihood: f32,
}

impl Suggestion {
    /// Whether the looked-up word was found verbatim
    pub fn is_exact(&self) -> bool {
        self.likelihood == 0.0
    }
}

impl ForeignRecord for Suggestion {
    type Raw = RawSuggestion;

    unsafe fn decode(raw: &RawSuggestion) -> Result<Self, Degenerate> {
        Ok(Self {
            word: required_text(raw.word, "word")?,
            likelihood: raw.likelihood,
        })
    }
}
