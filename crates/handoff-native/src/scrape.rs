//! Site scraping entry points
//!
//! Each call runs on its own current-thread tokio runtime and tears it down
//! before returning, so the caller sees an ordinary blocking call. When the
//! calling thread is already inside a runtime, the private one runs on a
//! scoped helper thread instead.

use std::ffi::CStr;
use std::future::Future;
use std::os::raw::{c_char, c_int};
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, SERVER};
use reqwest::Client;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

use crate::error::{NativeError, Result};
use crate::ffi_boundary;
use crate::memory::{allocate_array, allocate_lossy, borrow_text_array, copy_c_str, release_array};
use crate::types::Site;

/// Per-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on requests in flight during a batch
pub const MAX_IN_FLIGHT: usize = 50;

const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Where a URL points, resolved before any request is made
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Target {
    pub url: Url,
    pub protocol: String,
    pub domain: String,
    pub port: u16,
}

/// Parse `raw` into a scrape target
///
/// The port is the explicit one, else the scheme default (443 for https,
/// 80 for http and anything unknown).
pub(crate) fn parse_target(raw: &str) -> Result<Target> {
    let invalid = |reason: String| NativeError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    let domain = url
        .host_str()
        .ok_or_else(|| invalid("missing host".to_string()))?
        .to_string();
    let port = url.port_or_known_default().unwrap_or(80);

    Ok(Target {
        protocol: url.scheme().to_string(),
        domain,
        port,
        url,
    })
}

/// A fetched page, still in Rust types
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Scraped {
    pub requested: String,
    pub target: Target,
    pub server: String,
    pub content_type: String,
    pub body: String,
}

impl Scraped {
    fn into_site(self) -> Site {
        Site {
            url: allocate_lossy(self.requested),
            domain: allocate_lossy(self.target.domain),
            server: allocate_lossy(self.server),
            protocol: allocate_lossy(self.target.protocol),
            content_type: allocate_lossy(self.content_type),
            body: allocate_lossy(self.body),
            port: c_int::from(self.target.port),
        }
    }
}

fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(|e| NativeError::Runtime(e.to_string()))
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| NativeError::Runtime(e.to_string()))
}

/// Drive `future` to completion on a private runtime, blocking the caller
fn block_on<F>(future: F) -> Result<F::Output>
where
    F: Future + Send,
    F::Output: Send,
{
    if Handle::try_current().is_err() {
        return Ok(build_runtime()?.block_on(future));
    }

    // A runtime cannot be started on a thread that is already driving one
    std::thread::scope(|scope| {
        scope
            .spawn(move || build_runtime().map(|runtime| runtime.block_on(future)))
            .join()
            .map_err(|_| NativeError::Runtime("scrape thread panicked".to_string()))?
    })
}

async fn scrape(client: &Client, raw: &str) -> Result<Scraped> {
    let target = parse_target(raw)?;
    let request_error = |e: reqwest::Error| NativeError::Request {
        url: raw.to_string(),
        reason: e.to_string(),
    };

    let response = client
        .get(target.url.clone())
        .send()
        .await
        .map_err(request_error)?;

    let header = |name| {
        response
            .headers()
            .get(name)
            .map(|v: &reqwest::header::HeaderValue| String::from_utf8_lossy(v.as_bytes()).into_owned())
    };
    let server = header(SERVER).unwrap_or_default();
    let content_type = header(CONTENT_TYPE).unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());

    let body = response.bytes().await.map_err(request_error)?;

    tracing::debug!(url = raw, status = "ok", bytes = body.len(), "scraped");
    Ok(Scraped {
        requested: raw.to_string(),
        target,
        server,
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Scrape every URL with bounded concurrency, keeping input order
async fn scrape_all(client: Client, urls: Vec<Option<String>>) -> Vec<Option<Result<Scraped>>> {
    let limit = Arc::new(Semaphore::new(MAX_IN_FLIGHT));
    let mut slots: Vec<Option<Result<Scraped>>> = (0..urls.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (index, url) in urls.into_iter().enumerate() {
        let Some(url) = url else { continue };
        let client = client.clone();
        let limit = Arc::clone(&limit);
        tasks.spawn(async move {
            let _permit = limit.acquire_owned().await;
            (index, scrape(&client, &url).await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(err) => tracing::error!(error = %err, "scrape task failed"),
        }
    }

    slots
}

/// One site record per requested URL, failed slots keeping their URL
fn into_sites(requested: Vec<Option<String>>, results: Vec<Option<Result<Scraped>>>) -> Vec<Site> {
    requested
        .into_iter()
        .zip(results)
        .map(|(url, result)| match result {
            Some(Ok(scraped)) => scraped.into_site(),
            Some(Err(err)) => {
                tracing::debug!(error = %err, "scrape slot failed");
                Site::failed(url.map_or(std::ptr::null_mut(), allocate_lossy))
            }
            // A requested URL whose task never reported back
            None => Site::failed(url.map_or(std::ptr::null_mut(), allocate_lossy)),
        })
        .collect()
}

unsafe fn scrape_one(url: *const c_char) -> Result<*mut Site> {
    let url = copy_c_str(url, "url")?;
    let url = url.to_string_lossy().into_owned();

    // Reject malformed input before paying for a runtime
    parse_target(&url)?;

    let client = build_client()?;
    let scraped = block_on(scrape(&client, &url))??;
    Ok(Box::into_raw(Box::new(scraped.into_site())))
}

unsafe fn scrape_many(urls: *const *const c_char, count: c_int) -> Result<*mut Site> {
    let borrowed = borrow_text_array(urls, count, "urls")?;
    let requested: Vec<Option<String>> = borrowed
        .iter()
        .map(|url| url.map(|u: &CStr| u.to_string_lossy().into_owned()))
        .collect();

    let results = if requested.iter().any(Option::is_some) {
        let client = build_client()?;
        block_on(scrape_all(client, requested.clone()))?
    } else {
        (0..requested.len()).map(|_| None).collect()
    };

    Ok(allocate_array(into_sites(requested, results)))
}

/// Scrape metadata from a single URL
///
/// Returns null when the URL is null or unparseable, or the request fails.
///
/// # Safety
/// `url` must be null or a valid null-terminated string. A non-null result
/// must be freed with `handoff_free_site`.
#[no_mangle]
pub unsafe extern "C" fn handoff_scrape_site(url: *const c_char) -> *mut Site {
    ffi_boundary!("handoff_scrape_site", scrape_one(url))
}

/// Scrape metadata from `count` URLs concurrently
///
/// Slot `i` answers `urls[i]`. A failed slot keeps its `url`, leaves every
/// other text field null and sets `port` to 0. Returns null only if `count`
/// is negative or `urls` is null while `count > 0`.
///
/// # Safety
/// `urls` must point to `count` entries, each null or a valid
/// null-terminated string. A non-null result must be freed with
/// `handoff_free_sites(ptr, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_scrape_sites(urls: *const *const c_char, count: c_int) -> *mut Site {
    ffi_boundary!("handoff_scrape_sites", scrape_many(urls, count))
}

/// Free a site and its text
///
/// # Safety
/// `site` must be null or come from `handoff_scrape_site`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_site(site: *mut Site) {
    if site.is_null() {
        return;
    }

    drop(Box::from_raw(site));
}

/// Free an array of sites and the text each one holds
///
/// # Safety
/// `sites` must be null or come from `handoff_scrape_sites(_, count)`.
#[no_mangle]
pub unsafe extern "C" fn handoff_free_sites(sites: *mut Site, count: c_int) {
    release_array(sites, count);
}
