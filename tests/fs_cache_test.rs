use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use flate2::read::GzDecoder;
use std::io::Read;
use tempfile::TempDir;

use httpcache::{
    cache::{filesystem::FileCache, Cache},
    config::ConfigProperties,
    error::CacheError,
    http::{cached_response, Headers, Method, Request},
    io::Response,
};

struct TestConfig {
    cache_dir: PathBuf,
    compress: bool,
}

impl ConfigProperties for TestConfig {
    fn cache_location(&self) -> Option<&str> {
        self.cache_dir.to_str()
    }

    fn compress_cache(&self) -> bool {
        self.compress
    }
}

fn file_cache(temp_dir: &TempDir, compress: bool) -> FileCache {
    FileCache::new(Arc::new(TestConfig {
        cache_dir: temp_dir.path().to_path_buf(),
        compress,
    }))
}

fn response() -> Response {
    let mut headers = Headers::new();
    headers.set("cache-control", "max-age=7200");
    headers.set("etag", "\"abc\"");
    Response::builder()
        .status(200)
        .headers(headers)
        .body("Test response body")
        .build()
        .unwrap()
}

const URL: &str = "https://api.example.com/test";

#[test]
fn test_file_cache_set_get() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, true);
    file_cache.set(URL, &response().to_bytes().unwrap()).unwrap();

    // Verify the cache file was created
    let cache_file = file_cache.get_cache_file(URL).unwrap();
    assert!(cache_file.exists());

    let stored = file_cache.get(URL).unwrap().unwrap();
    let parsed = Response::from_bytes(&stored).unwrap();
    assert_eq!(200, parsed.status);
    assert_eq!("Test response body", parsed.body_str());
    assert_eq!(Some("\"abc\""), parsed.get_etag());
}

#[test]
fn test_file_cache_compressed_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, true);
    let bytes = response().to_bytes().unwrap();
    file_cache.set(URL, &bytes).unwrap();

    let on_disk = fs::read(file_cache.get_cache_file(URL).unwrap()).unwrap();
    let mut decoded = Vec::new();
    GzDecoder::new(on_disk.as_slice())
        .read_to_end(&mut decoded)
        .unwrap();
    assert_eq!(bytes, decoded);
}

#[test]
fn test_file_cache_uncompressed_on_disk() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, false);
    let bytes = response().to_bytes().unwrap();
    file_cache.set(URL, &bytes).unwrap();
    let on_disk = fs::read(file_cache.get_cache_file(URL).unwrap()).unwrap();
    assert_eq!(bytes, on_disk);
}

#[test]
fn test_file_cache_reads_entries_regardless_of_compression_setting() {
    let temp_dir = TempDir::new().unwrap();
    let bytes = response().to_bytes().unwrap();
    file_cache(&temp_dir, true).set(URL, &bytes).unwrap();
    assert_eq!(Some(bytes), file_cache(&temp_dir, false).get(URL).unwrap());
}

#[test]
fn test_file_cache_miss_and_delete() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, true);
    assert!(file_cache.get(URL).unwrap().is_none());
    // Deleting something never stored is not an error
    file_cache.delete(URL).unwrap();

    file_cache.set(URL, &response().to_bytes().unwrap()).unwrap();
    file_cache.delete(URL).unwrap();
    assert!(file_cache.get(URL).unwrap().is_none());
    assert!(!file_cache.get_cache_file(URL).unwrap().exists());
}

#[test]
fn test_file_cache_stats() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, false);
    let bytes = response().to_bytes().unwrap();
    file_cache.set(URL, &bytes).unwrap();
    file_cache
        .set("https://api.example.com/other", &bytes)
        .unwrap();
    let stats = file_cache.stats().unwrap();
    assert_eq!(2, stats.entries);
    assert_eq!(2 * bytes.len() as u64, stats.size);
}

#[test]
fn test_cached_response_from_disk_with_range() {
    let temp_dir = TempDir::new().unwrap();
    let file_cache = file_cache(&temp_dir, true);
    file_cache.set(URL, &response().to_bytes().unwrap()).unwrap();
    let request = Request::new(URL, Method::GET).with_header("Range", "bytes=0-3");
    let response = cached_response(&file_cache, &request).unwrap().unwrap();
    assert_eq!("Test", response.body_str());
}

#[test]
fn test_validate_cache_location_ok() {
    let temp_dir = TempDir::new().unwrap();
    assert!(file_cache(&temp_dir, true).validate_cache_location().is_ok());
}

#[test]
fn test_validate_cache_location_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    let file_path = temp_dir.path().join("not_a_dir");
    fs::write(&file_path, b"x").unwrap();
    let file_cache = FileCache::new(Arc::new(TestConfig {
        cache_dir: file_path,
        compress: true,
    }));
    let err = file_cache.validate_cache_location().unwrap_err();
    match err.downcast_ref::<CacheError>() {
        Some(CacheError::CacheLocationIsNotADirectory(_)) => (),
        _ => panic!("Expected CacheLocationIsNotADirectory"),
    }
}
