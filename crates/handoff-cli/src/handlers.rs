//! Command handlers for CLI subcommands
//!
//! Each handler makes its native calls through the marshaller and prints
//! the owned results.

mod completions;
mod scrape;
mod spellcheck;
mod users;
mod values;

pub use completions::handle_completions;
pub use scrape::handle_scrape;
pub use spellcheck::handle_spellcheck;
pub use users::{handle_user, handle_users};
pub use values::{handle_factorial, handle_fib, handle_greet, handle_repeat};

use crate::error::Result;
use handoff_marshal::{MarshalError, Marshaller};

/// Run a marshaller call on the blocking pool
///
/// Native scrape calls block for as long as their requests take, which
/// would stall an async worker thread.
pub(crate) async fn blocking<T, F>(marshaller: &Marshaller, label: &str, call: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&Marshaller) -> handoff_marshal::Result<T> + Send + 'static,
{
    let marshaller = marshaller.clone();
    let joined = tokio::task::spawn_blocking(move || call(&marshaller)).await;
    match joined {
        Ok(result) => Ok(result?),
        Err(e) => Err(MarshalError::Worker {
            input: label.to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}
