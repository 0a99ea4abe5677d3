//! Dictionary spellcheck entry points
//!
//! Lookups normalize the word (trim, lowercase) and then compare it with
//! every dictionary entry. A word found verbatim comes back unchanged with
//! likelihood 0.0; anything else comes back as the most similar entry with
//! its similarity as a percentage.

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::sync::OnceLock;

use crate::error::{NativeError, Result};
use crate::ffi_boundary;
use crate::memory::{allocate_array, allocate_string, borrow_text_array, copy_c_str, release_array};
use crate::types::Suggestion;

static WORDS: &str = include_str!("../data/words.txt");

/// Similarity measure used to rank dictionary entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Metric {
    JaroWinkler,
    Levenshtein,
}

impl Metric {
    fn similarity(self, a: &str, b: &str) -> f64 {
        match self {
            Metric::JaroWinkler => strsim::jaro_winkler(a, b),
            Metric::Levenshtein => strsim::normalized_levenshtein(a, b),
        }
    }
}

/// Sorted, deduplicated word list
fn dictionary() -> &'static [&'static str] {
    static DICTIONARY: OnceLock<Vec<&'static str>> = OnceLock::new();
    DICTIONARY.get_or_init(|| {
        let mut words: Vec<&'static str> = WORDS
            .lines()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .collect();
        words.sort_unstable();
        words.dedup();
        words
    })
}

/// Find the closest dictionary entry for `word`
pub(crate) fn suggest(word: &str, metric: Metric) -> Result<(&'static str, f32)> {
    let normalized = word.trim().to_lowercase();
    if normalized.is_empty() || !normalized.chars().all(char::is_alphabetic) {
        return Err(NativeError::NoSuggestion { word: normalized });
    }

    let words = dictionary();
    if let Ok(index) = words.binary_search(&normalized.as_str()) {
        return Ok((words[index], 0.0));
    }

    let mut best: Option<(&'static str, f64)> = None;
    for &candidate in words {
        let score = metric.similarity(&normalized, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    match best {
        Some((candidate, score)) => Ok((candidate, (score * 100.0) as f32)),
        None => Err(NativeError::NoSuggestion { word: normalized }),
    }
}

fn suggestion_for(word: &CStr, metric: Metric) -> Result<Suggestion> {
    let (candidate, likelihood) = suggest(&word.to_string_lossy(), metric)?;
    Ok(Suggestion {
        word: allocate_string(candidate)?,
        likelihood,
    })
}

unsafe fn check(word: *const c_char, metric: Metric) -> Result<*mut Suggestion> {
    let word = copy_c_str(word, "word")?;
    let suggestion = suggestion_for(&word, metric)?;
    tracing::debug!(word = ?word, ?metric, likelihood = suggestion.likelihood, "spellcheck hit");
    Ok(Box::into_raw(Box::new(suggestion)))
}

/// Suggest a dictionary word using Jaro-Winkler similarity
///
/// Returns null when the word is empty, contains non-alphabetic characters,
/// or is null.
///
/// # Safety
/// `word` must be null or a valid null-terminated string. A non-null result
/// must be freed with `handoff_free_suggestion`.
#[no_mangle]
pub unsafe extern "C" fn handoff_spellcheck(word: *const c_char) -> *mut Suggestion {
    ffi_boundary!("handoff_spellcheck", check(word, Metric::JaroWinkler))
}

/// Suggest a dictionary word using normalized Levenshtein similarity
///
/// # Safety
/// Same contract as `handoff_spellcheck`.
#[no_mangle]
pub unsafe extern "C" fn handoff_spellcheck_levenshtein(word: *const c_char) -> *mut Suggestion {
    ffi_boundary!("handoff_spellcheck_levenshtein", check(word, Metric::Levenshtein))
}

/// Suggest a dictionary word for each of `count` words
///
/// Slot `i` answers `words[i]`. A miss, including a null entry, leaves the
/// slot's `word` null. Returns null only if `count` is negative or `words`
/// is null while `count > 0`.
///
/// # Safety
/// `words` must point to `count` entries, each null or a valid
/// null-terminated string. A non-null result must be freed with
/// `handoff_free_suggestions(ptr, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_spellcheck_words(words: *const *const c_char, count: c_int) -> *mut Suggestion {
    ffi_boundary!("handoff_spellcheck_words", {
        let words = borrow_text_array(words, count, "words")?;
        let suggestions = words
            .into_iter()
            .map(|word| {
                word.and_then(|w| suggestion_for(w, Metric::JaroWinkler).ok())
                    .unwrap_or_else(Suggestion::missing)
            })
            .collect();
        Ok(allocate_array(suggestions))
    })
}

/// Free a suggestion and its word
///
/// # Safety
/// `suggestion` must be null or come from a single-word spellcheck.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_suggestion(suggestion: *mut Suggestion) {
    if suggestion.is_null() {
        return;
    }

    drop(Box::from_raw(suggestion));
}

/// Free an array of suggestions and the words they hold
///
/// # Safety
/// `suggestions` must be null or come from `handoff_spellcheck_words(_, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_suggestions(suggestions: *mut Suggestion, count: c_int) {
    release_array(suggestions, count);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn test_known_word_scores_zero() {
        assert_eq!(suggest("  Water ", Metric::JaroWinkler).unwrap(), ("water", 0.0));
    }

    #[test]
    fn test_misspelling_finds_neighbour() {
        let (word, likelihood) = suggest("almni", Metric::JaroWinkler).unwrap();
        assert_eq!(word, "amni");
        assert!(likelihood > 80.0 && likelihood <= 100.0);

        let (word, _) = suggest("watr", Metric::Levenshtein).unwrap();
        assert_eq!(word, "water");
    }

    #[test]
    fn test_rejects_unusable_words() {
        assert!(suggest("", Metric::JaroWinkler).is_err());
        assert!(suggest("   ", Metric::JaroWinkler).is_err());
        assert!(suggest("h3llo", Metric::Levenshtein).is_err());
    }

    #[test]
    fn test_single_entry_points() {
        let word = CString::new("wator").unwrap();
        let bad = CString::new("12").unwrap();
        unsafe {
            let hit = handoff_spellcheck(word.as_ptr());
            assert!(!hit.is_null());
            assert!((*hit).likelihood > 0.0);
            handoff_free_suggestion(hit);

            let hit = handoff_spellcheck_levenshtein(word.as_ptr());
            assert!(!hit.is_null());
            handoff_free_suggestion(hit);

            assert!(handoff_spellcheck(bad.as_ptr()).is_null());
            assert!(handoff_spellcheck(std::ptr::null()).is_null());
        }
    }

    #[test]
    fn test_batch_keeps_positions() {
        let good = CString::new("house").unwrap();
        let bad = CString::new("?!").unwrap();
        let words = [good.as_ptr(), bad.as_ptr(), std::ptr::null()];
        unsafe {
            let batch = handoff_spellcheck_words(words.as_ptr(), 3);
            assert!(!batch.is_null());
            let slots = std::slice::from_raw_parts(batch, 3);
            assert!(!slots[0].word.is_null());
            assert!(slots[1].word.is_null());
            assert!(slots[2].word.is_null());
            handoff_free_suggestions(batch, 3);
        }
    }
}
