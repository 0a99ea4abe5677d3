//! Scrape command handler
//!
//! Three ways to fetch the same URLs: one call per URL in order, one array
//! call for all of them, or one call per URL on the worker pool.

use crate::cli::ScrapeArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::handlers::blocking;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use handoff_marshal::{MarshalError, Marshaller, PoolOptions, Site};
use tracing::{info, instrument, warn};

/// Handle the scrape command
#[instrument(skip_all, fields(urls = args.urls.len(), batch = args.batch, concurrent = args.concurrent))]
pub async fn handle_scrape(
    args: ScrapeArgs,
    config: &Config,
    marshaller: &Marshaller,
    output: &mut OutputWriter,
) -> Result<()> {
    let _timer = Timer::with_details("scrape", &format!("{} urls", args.urls.len()));

    if args.batch {
        return scrape_batch(args.urls, marshaller, output).await;
    }

    let total = args.urls.len();
    let results = if args.concurrent {
        let options = PoolOptions::from(&config.with_concurrency(args.workers, args.timeout).concurrency);
        info!(workers = options.workers, timeout = ?options.timeout, "scraping on worker pool");

        let spinner = output.spinner(&format!("Scraping {} sites...", total));
        let results = marshaller
            .run_concurrent(args.urls.clone(), options, |m, url| m.scrape(url))
            .await;
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }
        results
    } else {
        scrape_each(&args.urls, marshaller, output).await
    };

    report(&args.urls, results, marshaller.config().fail_on_error, output)?;
    Ok(())
}

async fn scrape_batch(urls: Vec<String>, marshaller: &Marshaller, output: &mut OutputWriter) -> Result<()> {
    let total = urls.len();
    let spinner = output.spinner(&format!("Scraping {} sites in one call...", total));
    let sites = blocking(marshaller, "batch", move |m| m.scrape_batch(&urls)).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let sites = sites?;
    if sites.len() < total {
        output.warning(&format!("{} of {} sites could not be fetched", total - sites.len(), total))?;
    }
    output.list(&sites)
}

async fn scrape_each(urls: &[String], marshaller: &Marshaller, output: &mut OutputWriter) -> Vec<handoff_marshal::Result<Site>> {
    let progress = output.progress_bar(urls.len() as u64, "scraping");
    let mut results = Vec::with_capacity(urls.len());

    for url in urls {
        let owned = url.clone();
        let result = match blocking(marshaller, url, move |m| m.scrape(&owned)).await {
            Ok(site) => Ok(site),
            Err(Error::Marshal(e)) | Err(Error::InvalidArgs(e)) | Err(Error::Library(e)) => Err(e),
            Err(other) => Err(MarshalError::Worker {
                input: url.clone(),
                reason: other.to_string(),
            }),
        };
        results.push(result);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    results
}

/// Print successes, warn about failures
///
/// With `fail_on_error` any failure fails the command; otherwise only a
/// run where nothing succeeded does.
fn report(
    urls: &[String],
    results: Vec<handoff_marshal::Result<Site>>,
    fail_on_error: bool,
    output: &mut OutputWriter,
) -> Result<()> {
    let total = results.len();
    let mut sites = Vec::with_capacity(total);
    let mut failed = 0;

    for (url, result) in urls.iter().zip(results) {
        match result {
            Ok(site) => sites.push(site),
            Err(e) => {
                failed += 1;
                warn!(url = %url, error = %e, "scrape failed");
                output.warning(&e.to_string())?;
            }
        }
    }

    output.list(&sites)?;

    if failed > 0 && (fail_on_error || sites.is_empty()) {
        return Err(Error::Partial { failed, total });
    }
    Ok(())
}
