use std::sync::Arc;

use chrono::Utc;
use httpcache::cache::{Cache, FileCache, InMemoryCache, NoCache};
use httpcache::config::ConfigProperties;
use httpcache::http::agent::UreqTransport;
use httpcache::http::{CacheTransport, Method, Request};
use httpcache::io::Transport;
use httpcache::time::{format_http_date, Seconds};
use httpmock::prelude::*;
use httpmock::Method::{GET, POST};
use tempfile::TempDir;

fn now() -> String {
    format_http_date(&Utc::now())
}

fn client<C: Cache>(cache: C) -> CacheTransport<C, UreqTransport> {
    CacheTransport::new(cache, UreqTransport::new(Seconds::new(5)))
}

#[test]
fn test_http_transport() {
    let server = MockServer::start();
    let body_str = r#"{"id": 4, "default_branch": "main"}"#;
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/articles/42");
        then.status(200)
            .header("content-type", "application/json")
            .body(body_str);
    });

    let transport = UreqTransport::new(Seconds::new(5));
    let request = Request::new(&server.url("/articles/42"), Method::GET);
    let response = transport.perform(&request).unwrap();
    assert_eq!(200, response.status);
    assert_eq!(Some("application/json"), response.header("Content-Type"));
    assert!(response.body_str().contains("default_branch"));
    server_mock.assert();
}

#[test]
fn test_http_transport_error_status_is_a_response() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/missing");
        then.status(404).body("not found");
    });
    let transport = UreqTransport::new(Seconds::new(5));
    let request = Request::new(&server.url("/missing"), Method::GET);
    let response = transport.perform(&request).unwrap();
    assert_eq!(404, response.status);
    assert_eq!("not found", response.body_str());
    server_mock.assert();
}

#[test]
fn test_http_transport_server_down() {
    let client = client(NoCache);
    let request = Request::new("http://localhost:8091/articles/42", Method::GET);
    let err = client.perform(&request).unwrap_err();
    assert!(err.to_string().contains("Connection refused"));
}

#[test]
fn test_fresh_response_served_from_cache() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/articles/42");
        then.status(200)
            .header("date", now())
            .header("cache-control", "max-age=3600")
            .body("hello");
    });

    let client = client(InMemoryCache::new());
    let request = Request::new(&server.url("/articles/42"), Method::GET);
    let first = client.perform(&request).unwrap();
    assert!(first.header("X-From-Cache").is_none());
    let second = client.perform(&request).unwrap();
    assert_eq!("hello", second.body_str());
    assert_eq!(Some("1"), second.header("X-From-Cache"));
    server_mock.assert_hits(1);
}

#[test]
fn test_stale_response_revalidated_with_etag() {
    let server = MockServer::start();
    let not_modified = server.mock(|when, then| {
        when.method(GET)
            .path("/articles/42")
            .header("If-None-Match", "\"v1\"");
        then.status(304).header("date", now()).header("etag", "\"v1\"");
    });
    let full = server.mock(|when, then| {
        when.method(GET)
            .path("/articles/42")
            .matches(|req| {
                !req.headers.as_ref().map_or(false, |headers| {
                    headers
                        .iter()
                        .any(|(name, _)| name.eq_ignore_ascii_case("if-none-match"))
                })
            });
        then.status(200)
            .header("date", now())
            .header("etag", "\"v1\"")
            .header("content-type", "text/plain")
            .body("hello");
    });

    let client = client(InMemoryCache::new());
    let request = Request::new(&server.url("/articles/42"), Method::GET);
    client.perform(&request).unwrap();
    let revalidated = client.perform(&request).unwrap();
    assert_eq!(200, revalidated.status);
    assert_eq!("hello", revalidated.body_str());
    assert_eq!(Some("text/plain"), revalidated.header("content-type"));
    assert_eq!(Some("1"), revalidated.header("X-From-Cache"));
    full.assert_hits(1);
    not_modified.assert_hits(1);
}

#[test]
fn test_post_request_passes_through_and_invalidates() {
    let server = MockServer::start();
    let get_mock = server.mock(|when, then| {
        when.method(GET).path("/articles/42");
        then.status(200)
            .header("date", now())
            .header("cache-control", "max-age=3600")
            .body("v1");
    });
    let post_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/articles/42")
            .body(r#"{"title":"New"}"#);
        then.status(201).body("created");
    });

    let url = server.url("/articles/42");
    let client = client(InMemoryCache::new());
    client.perform(&Request::new(&url, Method::GET)).unwrap();
    assert!(client.cache().contains_key(&url));

    let post = Request::new(&url, Method::POST).with_body(r#"{"title":"New"}"#);
    let response = client.perform(&post).unwrap();
    assert_eq!(201, response.status);
    assert!(!client.cache().contains_key(&url));

    let response = client.perform(&Request::new(&url, Method::GET)).unwrap();
    assert!(response.header("X-From-Cache").is_none());
    get_mock.assert_hits(2);
    post_mock.assert();
}

#[test]
fn test_vary_selects_cached_variant() {
    let server = MockServer::start();
    let english = server.mock(|when, then| {
        when.method(GET).path("/greeting").header("Accept-Language", "en");
        then.status(200)
            .header("date", now())
            .header("cache-control", "max-age=3600")
            .header("vary", "Accept-Language")
            .body("hello");
    });
    let french = server.mock(|when, then| {
        when.method(GET).path("/greeting").header("Accept-Language", "fr");
        then.status(200)
            .header("date", now())
            .header("cache-control", "max-age=3600")
            .header("vary", "Accept-Language")
            .body("bonjour");
    });

    let client = client(InMemoryCache::new());
    let url = server.url("/greeting");
    let en = Request::new(&url, Method::GET).with_header("Accept-Language", "en");
    let fr = Request::new(&url, Method::GET).with_header("Accept-Language", "fr");
    client.perform(&en).unwrap();
    let cached = client.perform(&en).unwrap();
    assert_eq!(Some("1"), cached.header("X-From-Cache"));
    let response = client.perform(&fr).unwrap();
    assert_eq!("bonjour", response.body_str());
    assert!(response.header("X-From-Cache").is_none());
    english.assert_hits(1);
    french.assert_hits(1);
}

#[test]
fn test_only_if_cached_never_reaches_the_network() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/uncached");
        then.status(200).body("hello");
    });
    let client = client(InMemoryCache::new());
    let request = Request::new(&server.url("/uncached"), Method::GET)
        .with_header("Cache-Control", "only-if-cached");
    let response = client.perform(&request).unwrap();
    assert_eq!(504, response.status);
    server_mock.assert_hits(0);
}

#[test]
fn test_no_store_response_is_not_cached() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/secret");
        then.status(200)
            .header("date", now())
            .header("cache-control", "no-store, max-age=3600")
            .body("secret");
    });
    let client = client(InMemoryCache::new());
    let request = Request::new(&server.url("/secret"), Method::GET);
    client.perform(&request).unwrap();
    client.perform(&request).unwrap();
    assert!(client.cache().is_empty());
    server_mock.assert_hits(2);
}

struct TestConfig {
    cache_dir: String,
}

impl ConfigProperties for TestConfig {
    fn cache_location(&self) -> Option<&str> {
        Some(&self.cache_dir)
    }
}

#[test]
fn test_responses_persisted_on_disk_survive_new_client() {
    let server = MockServer::start();
    let server_mock = server.mock(|when, then| {
        when.method(GET).path("/feeds/latest.xml");
        then.status(200)
            .header("date", now())
            .header("cache-control", "max-age=3600")
            .body("persisted");
    });
    let temp_dir = TempDir::new().unwrap();
    let config = Arc::new(TestConfig {
        cache_dir: temp_dir.path().to_str().unwrap().to_string(),
    });
    let request = Request::new(&server.url("/feeds/latest.xml"), Method::GET);

    let first = client(FileCache::new(config.clone()));
    first.perform(&request).unwrap();

    let second = client(FileCache::new(config));
    let response = second.perform(&request).unwrap();
    assert_eq!("persisted", response.body_str());
    assert_eq!(Some("1"), response.header("X-From-Cache"));
    server_mock.assert_hits(1);
}
