//! The marshaller: encode, call, guard, decode, release
//!
//! Every call that receives an address wraps it in an [`Acquired`] before
//! reading anything, so the release happens when the guard leaves scope
//! whether decoding finished, bailed out in strict mode or panicked.

use std::os::raw::c_int;
use std::sync::Arc;

use tracing::instrument;

use crate::config::MarshalConfig;
use crate::decode::{decode_text, ForeignRecord};
use crate::encode::{encode_count, encode_text, TextArray};
use crate::error::{MarshalError, Result};
use crate::guard::Acquired;
use crate::library::{NativeLibrary, Symbols};
use crate::records::{Site, Suggestion, User};

/// Caller-side handle for every native entry point
///
/// Cheap to clone; clones share the same library handle.
#[derive(Debug, Clone)]
pub struct Marshaller {
    library: Arc<NativeLibrary>,
    config: MarshalConfig,
}

impl Marshaller {
    /// Build a marshaller over an already opened library
    pub fn new(library: NativeLibrary, config: MarshalConfig) -> Self {
        Self {
            library: Arc::new(library),
            config,
        }
    }

    /// Open the library `config` names and build a marshaller over it
    pub fn from_config(config: MarshalConfig) -> Result<Self> {
        let library = NativeLibrary::open(&config.library)?;
        tracing::debug!(origin = ?library.origin(), "native library ready");
        Ok(Self::new(library, config))
    }

    /// Same handle, different degenerate-element policy
    pub fn with_fail_on_error(mut self, fail_on_error: bool) -> Self {
        self.config.fail_on_error = fail_on_error;
        self
    }

    /// Policy this marshaller applies to every call
    pub fn config(&self) -> &MarshalConfig {
        &self.config
    }

    /// Handle whose entry points every call goes through
    pub fn library(&self) -> &NativeLibrary {
        &self.library
    }

    fn symbols(&self) -> &Symbols {
        self.library.symbols()
    }

    /// Domain error for a null sentinel, carrying the native reason
    fn sentinel(&self, entry_point: &'static str, input: impl Into<String>) -> MarshalError {
        let reason = unsafe { decode_text((self.symbols().last_error)()) }
            .unwrap_or_else(|| "no reason reported".to_string());
        tracing::warn!(entry_point, %reason, "native call returned null");
        MarshalError::Sentinel {
            entry_point,
            input: input.into(),
            reason,
        }
    }

    /// Guard and decode a single-record result
    ///
    /// # Safety
    /// `ptr` must have just been returned by `entry_point`, and `release`
    /// must be its matching release function.
    unsafe fn take_single<R: ForeignRecord>(
        &self,
        entry_point: &'static str,
        input: &str,
        ptr: *mut R::Raw,
        release: unsafe extern "C" fn(*mut R::Raw),
    ) -> Result<R> {
        let guard = Acquired::single(ptr, release, entry_point)
            .ok_or_else(|| self.sentinel(entry_point, input))?;

        R::decode(guard.get()).map_err(|degenerate| {
            tracing::warn!(entry_point, %degenerate, "single record incomplete");
            MarshalError::Degenerate {
                entry_point,
                index: 0,
                label: input.to_string(),
            }
        })
    }

    /// Guard and decode an array result of `count` elements
    ///
    /// Degenerate elements are dropped, or raised when `fail_on_error` is
    /// set. Either way the block is released exactly once with `count`.
    ///
    /// # Safety
    /// As for `take_single`, and the block must hold `count` elements.
    unsafe fn take_array<R: ForeignRecord>(
        &self,
        entry_point: &'static str,
        input: &str,
        ptr: *mut R::Raw,
        count: c_int,
        release: unsafe extern "C" fn(*mut R::Raw, c_int),
        label: impl Fn(usize) -> String,
    ) -> Result<Vec<R>> {
        let guard = Acquired::array(ptr, count, release, entry_point)
            .ok_or_else(|| self.sentinel(entry_point, input))?;

        let mut decoded = Vec::with_capacity(guard.len());
        for (index, raw) in guard.as_slice().iter().enumerate() {
            match R::decode(raw) {
                Ok(value) => decoded.push(value),
                Err(degenerate) if self.config.fail_on_error => {
                    tracing::warn!(entry_point, index, %degenerate, "degenerate element");
                    return Err(MarshalError::Degenerate {
                        entry_point,
                        index,
                        label: label(index),
                    });
                }
                Err(degenerate) => {
                    tracing::debug!(entry_point, index, %degenerate, "dropping degenerate element");
                }
            }
        }

        Ok(decoded)
    }

    /// Version text reported by the library
    pub fn version(&self) -> String {
        unsafe { decode_text((self.symbols().version)()) }.unwrap_or_default()
    }

    /// `n!`, or 0 for negative input or 32-bit overflow
    pub fn factorial(&self, n: i32) -> i32 {
        unsafe { (self.symbols().factorial)(n) }
    }

    /// Greeting text for `name`
    #[instrument(skip(self))]
    pub fn greet(&self, name: &str) -> Result<String> {
        const ENTRY: &str = "handoff_greet";
        let encoded = encode_text(ENTRY, name)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.greet)(encoded.as_ptr());
            let guard = Acquired::single(ptr, symbols.string_free, ENTRY)
                .ok_or_else(|| self.sentinel(ENTRY, name))?;
            Ok(decode_text(guard.as_ptr()).unwrap_or_default())
        }
    }

    /// The first `n` Fibonacci numbers
    #[instrument(skip(self))]
    pub fn fib_sequence(&self, n: usize) -> Result<Vec<i32>> {
        const ENTRY: &str = "handoff_fib_sequence";
        let count = encode_count(ENTRY, n)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.fib_sequence)(count);
            self.take_array(ENTRY, &n.to_string(), ptr, count, symbols.free_int_array, |i| {
                format!("#{}", i)
            })
        }
    }

    /// `count` copies of `text`
    #[instrument(skip(self))]
    pub fn multiply_string(&self, text: &str, count: usize) -> Result<Vec<String>> {
        const ENTRY: &str = "handoff_multiply_string";
        let encoded = encode_text(ENTRY, text)?;
        let count = encode_count(ENTRY, count)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.multiply_string)(encoded.as_ptr(), count);
            self.take_array(ENTRY, text, ptr, count, symbols.free_string_array, |i| {
                format!("#{}", i)
            })
        }
    }

    /// A user built from the given fields
    #[instrument(skip(self))]
    pub fn create_user(&self, name: &str, age: i32, email: &str) -> Result<User> {
        const ENTRY: &str = "handoff_create_user";
        let encoded_name = encode_text(ENTRY, name)?;
        let encoded_email = encode_text(ENTRY, email)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.create_user)(encoded_name.as_ptr(), age, encoded_email.as_ptr());
            self.take_single(ENTRY, name, ptr, symbols.free_user)
        }
    }

    /// One user with random fields
    #[instrument(skip(self))]
    pub fn create_random_user(&self) -> Result<User> {
        const ENTRY: &str = "handoff_create_random_user";
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.create_random_user)();
            self.take_single(ENTRY, "random user", ptr, symbols.free_user)
        }
    }

    /// `count` users with random fields
    #[instrument(skip(self))]
    pub fn create_random_users(&self, count: usize) -> Result<Vec<User>> {
        const ENTRY: &str = "handoff_create_random_users";
        let encoded = encode_count(ENTRY, count)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.create_random_users)(encoded);
            self.take_array(ENTRY, &count.to_string(), ptr, encoded, symbols.free_users, |i| {
                format!("user #{}", i)
            })
        }
    }

    /// Closest dictionary word by Jaro-Winkler similarity
    #[instrument(skip(self))]
    pub fn spellcheck(&self, word: &str) -> Result<Suggestion> {
        const ENTRY: &str = "handoff_spellcheck";
        let encoded = encode_text(ENTRY, word)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.spellcheck)(encoded.as_ptr());
            self.take_single(ENTRY, word, ptr, symbols.free_suggestion)
        }
    }

    /// Closest dictionary word by normalized Levenshtein similarity
    #[instrument(skip(self))]
    pub fn spellcheck_levenshtein(&self, word: &str) -> Result<Suggestion> {
        const ENTRY: &str = "handoff_spellcheck_levenshtein";
        let encoded = encode_text(ENTRY, word)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.spellcheck_levenshtein)(encoded.as_ptr());
            self.take_single(ENTRY, word, ptr, symbols.free_suggestion)
        }
    }

    /// Suggestions for every word in one native call
    #[instrument(skip(self, words), fields(count = words.len()))]
    pub fn spellcheck_words<S: AsRef<str>>(&self, words: &[S]) -> Result<Vec<Suggestion>> {
        const ENTRY: &str = "handoff_spellcheck_words";
        let encoded = TextArray::encode(ENTRY, words)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.spellcheck_words)(encoded.as_ptr(), encoded.count());
            self.take_array(
                ENTRY,
                &format!("{} words", words.len()),
                ptr,
                encoded.count(),
                symbols.free_suggestions,
                |i| encoded.label(i),
            )
        }
    }

    /// Metadata for one URL
    #[instrument(skip(self))]
    pub fn scrape(&self, url: &str) -> Result<Site> {
        const ENTRY: &str = "handoff_scrape_site";
        let encoded = encode_text(ENTRY, url)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.scrape_site)(encoded.as_ptr());
            self.take_single(ENTRY, url, ptr, symbols.free_site)
        }
    }

    /// Metadata for every URL in one native call
    ///
    /// Order follows `urls`. URLs that could not be scraped are left out,
    /// or reported by index when `fail_on_error` is set.
    #[instrument(skip(self, urls), fields(count = urls.len()))]
    pub fn scrape_batch<S: AsRef<str>>(&self, urls: &[S]) -> Result<Vec<Site>> {
        const ENTRY: &str = "handoff_scrape_sites";
        let encoded = TextArray::encode(ENTRY, urls)?;
        let symbols = self.symbols();
        unsafe {
            let ptr = (symbols.scrape_sites)(encoded.as_ptr(), encoded.count());
            self.take_array(
                ENTRY,
                &format!("{} urls", urls.len()),
                ptr,
                encoded.count(),
                symbols.free_sites,
                |i| encoded.label(i),
            )
        }
    }
}
