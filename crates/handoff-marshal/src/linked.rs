//! Symbol table over the statically linked native crate
//!
//! Record-producing exports are declared against the native crate's own
//! record types, so they are re-exposed through thin shims typed with this
//! crate's layouts. Everything else is taken as-is.

use std::os::raw::{c_char, c_int};

use handoff_native as native;

use crate::library::Symbols;
use crate::records::{RawSite, RawSuggestion, RawUser};

pub(crate) fn symbols() -> Symbols {
    Symbols {
        version: native::handoff_version,
        last_error: native::handoff_last_error,
        factorial: native::handoff_factorial,
        greet: native::handoff_greet,
        string_free: native::handoff_string_free,
        fib_sequence: native::handoff_fib_sequence,
        free_int_array: native::handoff_free_int_array,
        multiply_string: native::handoff_multiply_string,
        free_string_array: native::handoff_free_string_array,
        create_user,
        create_random_user,
        create_random_users,
        free_user,
        free_users,
        spellcheck,
        spellcheck_levenshtein,
        spellcheck_words,
        free_suggestion,
        free_suggestions,
        scrape_site,
        scrape_sites,
        free_site,
        free_sites,
    }
}

unsafe extern "C" fn create_user(name: *const c_char, age: c_int, email: *const c_char) -> *mut RawUser {
    native::handoff_create_user(name, age, email).cast()
}

unsafe extern "C" fn create_random_user() -> *mut RawUser {
    native::handoff_create_random_user().cast()
}

unsafe extern "C" fn create_random_users(count: c_int) -> *mut RawUser {
    native::handoff_create_random_users(count).cast()
}

unsafe extern "C" fn free_user(user: *mut RawUser) {
    native::handoff_free_user(user.cast())
}

unsafe extern "C" fn free_users(users: *mut RawUser, count: c_int) {
    native::handoff_free_users(users.cast(), count)
}

unsafe extern "C" fn spellcheck(word: *const c_char) -> *mut RawSuggestion {
    native::handoff_spellcheck(word).cast()
}

unsafe extern "C" fn spellcheck_levenshtein(word: *const c_char) -> *mut RawSuggestion {
    native::handoff_spellcheck_levenshtein(word).cast()
}

unsafe extern "C" fn spellcheck_words(words: *const *const c_char, count: c_int) -> *mut RawSuggestion {
    native::handoff_spellcheck_words(words, count).cast()
}

unsafe extern "C" fn free_suggestion(suggestion: *mut RawSuggestion) {
    native::handoff_free_suggestion(suggestion.cast())
}

unsafe extern "C" fn free_suggestions(suggestions: *mut RawSuggestion, count: c_int) {
    native::handoff_free_suggestions(suggestions.cast(), count)
}

unsafe extern "C" fn scrape_site(url: *const c_char) -> *mut RawSite {
    native::handoff_scrape_site(url).cast()
}

unsafe extern "C" fn scrape_sites(urls: *const *const c_char, count: c_int) -> *mut RawSite {
    native::handoff_scrape_sites(urls, count).cast()
}

unsafe extern "C" fn free_site(site: *mut RawSite) {
    native::handoff_free_site(site.cast())
}

unsafe extern "C" fn free_sites(sites: *mut RawSite, count: c_int) {
    native::handoff_free_sites(sites.cast(), count)
}
