//! Concurrent call tests

#![cfg(feature = "linked")]

mod common;

use std::time::{Duration, Instant};

use common::*;
use handoff_marshal::{MarshalError, PoolOptions};
use serial_test::serial;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_timed_out_call_is_still_released() {
    reset();
    let m = marshaller(slow_symbols(), false);
    let options = PoolOptions {
        workers: 2,
        timeout: Some(Duration::from_millis(50)),
    };

    let results = m
        .run_concurrent(vec!["late".to_string()], options, |m, name| m.greet(name))
        .await;

    assert!(matches!(
        results.as_slice(),
        [Err(MarshalError::Timeout { input, .. })] if input == "late"
    ));

    // The blocking worker finishes after the caller gave up
    let deadline = Instant::now() + SLOW_CALL * 10;
    while single_releases() == 0 && Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(single_releases(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
#[serial]
async fn test_concurrent_scrapes_release_each_call() {
    reset();
    let m = marshaller(counting_symbols(), false);
    let urls: Vec<String> = (0..25)
        .map(|i| {
            if i % 5 == 0 {
                format!("fail://{}", i)
            } else {
                format!("http://site{}", i)
            }
        })
        .collect();

    let results = m
        .run_concurrent(urls.clone(), m.pool_options(), |m, url| m.scrape(url))
        .await;

    assert_eq!(results.len(), urls.len());
    for (url, result) in urls.iter().zip(&results) {
        match result {
            Ok(site) => assert_eq!(&site.url, url),
            Err(MarshalError::Sentinel { input, .. }) => {
                assert_eq!(input, url);
                assert!(url.starts_with("fail://"));
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    // One release per non-null result, none for the five sentinels
    assert_eq!(single_releases(), 20);
}

#[tokio::test]
#[serial]
async fn test_generous_timeout_returns_values() {
    reset();
    let m = marshaller(slow_symbols(), false);
    let options = PoolOptions {
        workers: 4,
        timeout: Some(SLOW_CALL * 10),
    };

    let names: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
    let results = m.run_concurrent(names, options, |m, name| m.greet(name)).await;

    let greetings: Vec<String> = results.into_iter().map(|r| r.unwrap()).collect();
    assert!(greetings[0].starts_with("Hello a"));
    assert!(greetings[2].starts_with("Hello c"));
    assert_eq!(single_releases(), 3);
}
