//! Instrumented symbol tables for boundary tests
//!
//! Release functions are wrapped so each call is counted before the real
//! native release runs. Scrape entry points are replaced by local stubs
//! that build records in the native crate's own layout, so no network is
//! involved.

#![allow(dead_code)]

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::ptr;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::time::Duration;

use handoff_marshal::{MarshalConfig, Marshaller, NativeLibrary, RawSite, RawSuggestion, RawUser, Symbols};
use handoff_native as native;

pub static SINGLE_RELEASES: AtomicUsize = AtomicUsize::new(0);
pub static ARRAY_RELEASES: AtomicUsize = AtomicUsize::new(0);
pub static LAST_ARRAY_COUNT: AtomicI32 = AtomicI32::new(-1);

/// Inputs with this prefix make the scrape stubs fail that slot
pub const FAIL_PREFIX: &str = "fail:";
/// A batch whose first input has this prefix makes the stub return null
pub const ABORT_PREFIX: &str = "abort:";
/// Inputs with this prefix get a record whose required fields are null
pub const HOLLOW_PREFIX: &str = "hollow:";
/// Inputs with this prefix get a body holding invalid UTF-8
pub const BINARY_PREFIX: &str = "binary:";
/// Body bytes served for `BINARY_PREFIX` inputs
pub const BINARY_BODY: &[u8] = b"caf\xC3( \xFF!";

/// How long `slow_greet` blocks before answering
pub const SLOW_CALL: Duration = Duration::from_millis(300);

pub fn reset() {
    SINGLE_RELEASES.store(0, Ordering::SeqCst);
    ARRAY_RELEASES.store(0, Ordering::SeqCst);
    LAST_ARRAY_COUNT.store(-1, Ordering::SeqCst);
}

pub fn single_releases() -> usize {
    SINGLE_RELEASES.load(Ordering::SeqCst)
}

pub fn array_releases() -> usize {
    ARRAY_RELEASES.load(Ordering::SeqCst)
}

pub fn last_array_count() -> i32 {
    LAST_ARRAY_COUNT.load(Ordering::SeqCst)
}

fn count_single() {
    SINGLE_RELEASES.fetch_add(1, Ordering::SeqCst);
}

fn count_array(count: c_int) {
    ARRAY_RELEASES.fetch_add(1, Ordering::SeqCst);
    LAST_ARRAY_COUNT.store(count, Ordering::SeqCst);
}

unsafe extern "C" fn counting_string_free(s: *mut c_char) {
    count_single();
    native::handoff_string_free(s)
}

unsafe extern "C" fn counting_free_int_array(ptr: *mut c_int, count: c_int) {
    count_array(count);
    native::handoff_free_int_array(ptr, count)
}

unsafe extern "C" fn counting_free_string_array(ptr: *mut *mut c_char, count: c_int) {
    count_array(count);
    native::handoff_free_string_array(ptr, count)
}

unsafe extern "C" fn counting_free_user(user: *mut RawUser) {
    count_single();
    native::handoff_free_user(user.cast())
}

unsafe extern "C" fn counting_free_users(users: *mut RawUser, count: c_int) {
    count_array(count);
    native::handoff_free_users(users.cast(), count)
}

unsafe extern "C" fn counting_free_suggestion(suggestion: *mut RawSuggestion) {
    count_single();
    native::handoff_free_suggestion(suggestion.cast())
}

unsafe extern "C" fn counting_free_suggestions(suggestions: *mut RawSuggestion, count: c_int) {
    count_array(count);
    native::handoff_free_suggestions(suggestions.cast(), count)
}

unsafe extern "C" fn counting_free_site(site: *mut RawSite) {
    count_single();
    native::handoff_free_site(site.cast())
}

unsafe extern "C" fn counting_free_sites(sites: *mut RawSite, count: c_int) {
    count_array(count);
    native::handoff_free_sites(sites.cast(), count)
}

fn owned(bytes: &[u8]) -> *mut c_char {
    CString::new(bytes).unwrap().into_raw()
}

/// A fully populated site for `url`, in the native layout
pub fn stub_site(url: &[u8]) -> native::Site {
    let body: &[u8] = if url.starts_with(BINARY_PREFIX.as_bytes()) {
        BINARY_BODY
    } else {
        b"<html>stub</html>"
    };

    native::Site {
        url: owned(url),
        domain: owned(b"stub.test"),
        server: owned(b"stub/1.0"),
        protocol: owned(b"http"),
        content_type: owned(b"text/html"),
        body: owned(body),
        port: 80,
    }
}

fn failed_site(url: &[u8]) -> native::Site {
    native::Site {
        url: owned(url),
        domain: ptr::null_mut(),
        server: ptr::null_mut(),
        protocol: ptr::null_mut(),
        content_type: ptr::null_mut(),
        body: ptr::null_mut(),
        port: 0,
    }
}

unsafe extern "C" fn stub_scrape_site(url: *const c_char) -> *mut RawSite {
    let url = CStr::from_ptr(url).to_bytes();
    if url.starts_with(FAIL_PREFIX.as_bytes()) {
        return ptr::null_mut();
    }
    if url.starts_with(HOLLOW_PREFIX.as_bytes()) {
        return Box::into_raw(Box::new(failed_site(url))).cast();
    }
    Box::into_raw(Box::new(stub_site(url))).cast()
}

unsafe extern "C" fn stub_scrape_sites(urls: *const *const c_char, count: c_int) -> *mut RawSite {
    let urls: Vec<&[u8]> = (0..count as usize)
        .map(|i| CStr::from_ptr(*urls.add(i)).to_bytes())
        .collect();

    if urls.first().is_some_and(|u| u.starts_with(ABORT_PREFIX.as_bytes())) {
        return ptr::null_mut();
    }

    let sites: Vec<native::Site> = urls
        .into_iter()
        .map(|url| {
            if url.starts_with(FAIL_PREFIX.as_bytes()) {
                failed_site(url)
            } else {
                stub_site(url)
            }
        })
        .collect();

    Box::into_raw(sites.into_boxed_slice()).cast()
}

unsafe extern "C" fn slow_greet(name: *const c_char) -> *mut c_char {
    std::thread::sleep(SLOW_CALL);
    native::handoff_greet(name)
}

/// Linked entry points with every release counted and scraping stubbed
pub fn counting_symbols() -> Symbols {
    let mut symbols = *NativeLibrary::linked().symbols();
    symbols.string_free = counting_string_free;
    symbols.free_int_array = counting_free_int_array;
    symbols.free_string_array = counting_free_string_array;
    symbols.free_user = counting_free_user;
    symbols.free_users = counting_free_users;
    symbols.free_suggestion = counting_free_suggestion;
    symbols.free_suggestions = counting_free_suggestions;
    symbols.scrape_site = stub_scrape_site;
    symbols.scrape_sites = stub_scrape_sites;
    symbols.free_site = counting_free_site;
    symbols.free_sites = counting_free_sites;
    symbols
}

/// Same as `counting_symbols`, with a greeting that blocks for `SLOW_CALL`
pub fn slow_symbols() -> Symbols {
    let mut symbols = counting_symbols();
    symbols.greet = slow_greet;
    symbols
}

pub fn marshaller(symbols: Symbols, fail_on_error: bool) -> Marshaller {
    Marshaller::new(NativeLibrary::from_symbols(symbols), MarshalConfig::default())
        .with_fail_on_error(fail_on_error)
}
