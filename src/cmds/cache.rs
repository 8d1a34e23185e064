use crate::cache::{Cache, FileCache};
use crate::cli::cache::CacheOptions;
use crate::cli::fetch::OutputFormat;
use crate::config::ConfigProperties;
use crate::http::{cache_key, cached_response, Method, Request};
use crate::Result;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

use super::fetch::print_response;

pub fn execute<W: Write>(
    options: CacheOptions,
    config: Arc<dyn ConfigProperties>,
    writer: &mut W,
) -> Result<()> {
    let cache = FileCache::new(config.clone());
    cache.validate_cache_location()?;
    match options {
        CacheOptions::Info => {
            let stats = cache.stats()?;
            writeln!(writer, "Location: {}", config.cache_location().unwrap_or_default())?;
            writeln!(writer, "Entries: {}", stats.entries)?;
            writeln!(writer, "Size: {}", BytesToHumanReadable::from(stats.size))?;
        }
        CacheOptions::Show { url } => {
            let request = Request::new(&url, Method::GET);
            match cached_response(&cache, &request)? {
                Some(response) => print_response(&response, OutputFormat::Include, writer)?,
                None => writeln!(writer, "No cached response for {url}")?,
            }
        }
        CacheOptions::Evict { url } => {
            cache.delete(&cache_key(&Request::new(&url, Method::GET)))?;
            writeln!(writer, "Evicted {url}")?;
        }
    }
    Ok(())
}

struct BytesToHumanReadable(u64);

impl From<u64> for BytesToHumanReadable {
    fn from(size: u64) -> Self {
        BytesToHumanReadable(size)
    }
}

impl fmt::Display for BytesToHumanReadable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffixes = ["B", "KB", "MB", "GB"];
        let mut size = self.0 as f64;
        let mut i = 0;
        while size >= 1024.0 && i < suffixes.len() - 1 {
            size /= 1024.0;
            i += 1;
        }
        write!(f, "{:.2} {}", size, suffixes[i])
    }
}
