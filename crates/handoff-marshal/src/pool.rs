//! Caller-driven concurrency over blocking native calls
//!
//! Each input gets its own blocking task that owns the whole
//! call, decode and release sequence. A timeout only stops the caller from
//! waiting. The task keeps running and its guard still releases whatever
//! the native side eventually hands back.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{self, JoinHandle};

use crate::client::Marshaller;
use crate::config::ConcurrencyConfig;
use crate::error::{MarshalError, Result};

/// Worker limit and per-call timeout for [`Marshaller::run_concurrent`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    pub workers: usize,
    pub timeout: Option<Duration>,
}

impl From<&ConcurrencyConfig> for PoolOptions {
    fn from(config: &ConcurrencyConfig) -> Self {
        Self {
            workers: config.workers,
            timeout: config.timeout(),
        }
    }
}

impl Marshaller {
    /// Pool options taken from this marshaller's config
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions::from(&self.config().concurrency)
    }

    /// Run `op` once per input on the blocking pool
    ///
    /// At most `options.workers` native calls are in flight at once.
    /// Results come back in input order; a call that outlives
    /// `options.timeout` yields [`MarshalError::Timeout`] in its slot.
    pub async fn run_concurrent<I, T, F>(&self, inputs: Vec<I>, options: PoolOptions, op: F) -> Vec<Result<T>>
    where
        I: Display + Send + 'static,
        T: Send + 'static,
        F: Fn(&Marshaller, &I) -> Result<T> + Send + Sync + 'static,
    {
        let limit = Arc::new(Semaphore::new(options.workers.max(1)));
        let op = Arc::new(op);

        let calls: Vec<(String, JoinHandle<Result<T>>)> = inputs
            .into_iter()
            .map(|input| {
                let label = input.to_string();
                let marshaller = self.clone();
                let limit = Arc::clone(&limit);
                let op = Arc::clone(&op);
                let call = task::spawn(run_one(marshaller, input, limit, op, options.timeout));
                (label, call)
            })
            .collect();

        let mut results = Vec::with_capacity(calls.len());
        for (label, call) in calls {
            results.push(match call.await {
                Ok(result) => result,
                Err(err) => Err(MarshalError::Worker {
                    input: label,
                    reason: err.to_string(),
                }),
            });
        }
        results
    }
}

async fn run_one<I, T, F>(
    marshaller: Marshaller,
    input: I,
    limit: Arc<Semaphore>,
    op: Arc<F>,
    timeout: Option<Duration>,
) -> Result<T>
where
    I: Display + Send + 'static,
    T: Send + 'static,
    F: Fn(&Marshaller, &I) -> Result<T> + Send + Sync + 'static,
{
    let label = input.to_string();
    let permit = Arc::clone(&limit)
        .acquire_owned()
        .await
        .map_err(|e| MarshalError::Worker {
            input: label.clone(),
            reason: e.to_string(),
        })?;

    // The permit travels with the blocking call so a timed-out call still
    // counts against the limit until the native side returns
    let blocking = task::spawn_blocking(move || {
        let _permit = permit;
        op(&marshaller, &input)
    });

    let joined = match timeout {
        Some(after) => match tokio::time::timeout(after, blocking).await {
            Ok(joined) => joined,
            Err(_) => {
                tracing::warn!(input = %label, ?after, "call timed out; release left to the worker");
                return Err(MarshalError::Timeout { input: label, after });
            }
        },
        None => blocking.await,
    };

    joined.map_err(|e| MarshalError::Worker {
        input: label,
        reason: e.to_string(),
    })?
}

#[cfg(all(test, feature = "linked"))]
mod tests {
    use super::*;
    use crate::config::MarshalConfig;
    use crate::library::NativeLibrary;

    #[tokio::test]
    async fn test_results_follow_input_order() {
        let marshaller = Marshaller::new(NativeLibrary::linked(), MarshalConfig::default());
        let names: Vec<String> = (0..20).map(|i| format!("n{}", i)).collect();

        let results = marshaller
            .run_concurrent(
                names.clone(),
                PoolOptions {
                    workers: 3,
                    timeout: None,
                },
                |m, name| m.greet(name),
            )
            .await;

        assert_eq!(results.len(), names.len());
        for (name, result) in names.iter().zip(results) {
            assert!(result.unwrap().contains(name.as_str()));
        }
    }

    #[test]
    fn test_options_from_config() {
        let config = ConcurrencyConfig {
            workers: 4,
            timeout_secs: Some(2),
        };
        assert_eq!(
            PoolOptions::from(&config),
            PoolOptions {
                workers: 4,
                timeout: Some(Duration::from_secs(2)),
            }
        );
    }
}
