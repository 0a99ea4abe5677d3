//! Spellcheck command handler

use crate::cli::SpellcheckArgs;
use crate::error::Result;
use crate::output::OutputWriter;
use handoff_marshal::{MarshalError, Marshaller, Suggestion};
use tracing::{instrument, warn};

/// Handle the spellcheck command
///
/// `--batch` sends every word in one array call. Otherwise each word is a
/// separate call and words without a suggestion are reported and skipped.
#[instrument(skip(marshaller, output), fields(words = args.words.len()))]
pub fn handle_spellcheck(args: SpellcheckArgs, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    if args.batch {
        let suggestions = marshaller.spellcheck_words(&args.words)?;
        if suggestions.len() < args.words.len() {
            output.warning(&format!(
                "{} of {} words had no suggestion",
                args.words.len() - suggestions.len(),
                args.words.len()
            ))?;
        }
        return output.list(&suggestions);
    }

    let mut suggestions: Vec<Suggestion> = Vec::with_capacity(args.words.len());
    for word in &args.words {
        let result = if args.levenshtein {
            marshaller.spellcheck_levenshtein(word)
        } else {
            marshaller.spellcheck(word)
        };

        match result {
            Ok(suggestion) => suggestions.push(suggestion),
            Err(MarshalError::Sentinel { reason, .. }) if !marshaller.config().fail_on_error => {
                warn!(word = %word, reason = %reason, "no suggestion");
                output.warning(&format!("{}: {}", word, reason))?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    output.list(&suggestions)
}
