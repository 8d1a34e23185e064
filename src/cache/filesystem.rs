use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::bufread::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};

use crate::cache::Cache;
use crate::config::ConfigProperties;
use crate::error::{AddContext, CacheError};
use crate::{log_debug, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Stores each response in its own file under the configured cache location.
/// File names are the SHA-256 of the key, so any URL maps to a valid path.
pub struct FileCache {
    config: Arc<dyn ConfigProperties>,
}

/// Number of entries and bytes on disk in a cache location.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CacheStats {
    pub entries: u64,
    pub size: u64,
}

impl FileCache {
    pub fn new(config: Arc<dyn ConfigProperties>) -> Self {
        FileCache { config }
    }

    fn location(&self) -> Result<&str> {
        let cache_location = self
            .config
            .cache_location()
            .ok_or(CacheError::CacheLocationNotConfigured)?;
        Ok(cache_location.strip_suffix('/').unwrap_or(cache_location))
    }

    pub fn validate_cache_location(&self) -> Result<()> {
        let cache_location = self.location()?;
        let path = Path::new(cache_location);

        if !path.exists() {
            return Err(CacheError::CacheLocationDoesNotExist(format!(
                "Cache directory does not exist: {cache_location}"
            ))
            .into());
        }

        if !path.is_dir() {
            return Err(CacheError::CacheLocationIsNotADirectory(format!(
                "Cache location is not a directory: {cache_location}"
            ))
            .into());
        }

        // Check if we can write to the directory
        let test_file_path = path.join(".write_test_cache_file");
        match File::create(&test_file_path) {
            Ok(_) => {
                fs::remove_file(&test_file_path).err_context(format!(
                    "Failed to remove cache test file {}",
                    test_file_path.to_string_lossy()
                ))?;
            }
            Err(e) => {
                return Err(CacheError::CacheLocationIsNotWriteable(format!(
                    "No write permission for cache directory {cache_location}: {e}"
                ))
                .into());
            }
        }
        Ok(())
    }

    pub fn get_cache_file(&self, url: &str) -> Result<PathBuf> {
        let mut hasher = Sha256::new();
        hasher.update(url);
        let hash = hasher.finalize();
        Ok(PathBuf::from(format!("{}/{hash:x}", self.location()?)))
    }

    /// Walks the cache location counting stored entries. Hidden files are not
    /// entries.
    pub fn stats(&self) -> Result<CacheStats> {
        let location = self.location()?;
        let mut stats = CacheStats::default();
        for entry in fs::read_dir(location).err_context(format!("Cannot read {location}"))? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().starts_with('.') {
                continue;
            }
            let metadata = entry.metadata()?;
            if metadata.is_file() {
                stats.entries += 1;
                stats.size += metadata.len();
            }
        }
        Ok(stats)
    }

    fn read_cache_data(&self, reader: impl Read) -> Result<Vec<u8>> {
        let mut data = Vec::new();
        let mut reader = BufReader::new(reader);
        reader.read_to_end(&mut data)?;
        // Entries may have been written with compression on or off.
        if data.starts_with(&GZIP_MAGIC) {
            let mut decompressed = Vec::new();
            GzDecoder::new(data.as_slice()).read_to_end(&mut decompressed)?;
            return Ok(decompressed);
        }
        Ok(data)
    }

    fn persist_cache_data(&self, value: &[u8], mut f: impl Write) -> Result<()> {
        if self.config.compress_cache() {
            let mut encoder = GzEncoder::new(f, Compression::default());
            encoder.write_all(value)?;
            encoder.finish()?.flush()?;
        } else {
            f.write_all(value)?;
            f.flush()?;
        }
        Ok(())
    }
}

impl Cache for FileCache {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.get_cache_file(key)?;
        match File::open(&path) {
            Ok(f) => Ok(Some(self.read_cache_data(f)?)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.get_cache_file(key)?;
        log_debug!("Storing {} in {}", key, path.to_string_lossy());
        let f = File::create(&path)
            .err_context(format!("Cannot create cache file {}", path.to_string_lossy()))?;
        self.persist_cache_data(value, BufWriter::new(f))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.get_cache_file(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::utils::ConfigMock;

    const URL: &str = "https://example.com/articles/42?lang=en";

    fn file_cache(location: Option<&str>, compress: bool) -> FileCache {
        FileCache::new(Arc::new(ConfigMock::new(location, compress)))
    }

    #[test]
    fn test_get_cache_file() {
        let file_cache = file_cache(Some("/home/user/.cache"), true);
        let cache_file = file_cache.get_cache_file(URL).unwrap();
        assert_eq!(
            PathBuf::from(
                "/home/user/.cache/c298699e20c986b72bfa8a64a641c8d23deb3a5d912940401b2bbc21ddede3e2"
            ),
            cache_file
        );
    }

    #[test]
    fn test_get_cache_file_trailing_slash() {
        let with_slash = file_cache(Some("/home/user/.cache/"), true);
        let without = file_cache(Some("/home/user/.cache"), true);
        assert_eq!(
            without.get_cache_file(URL).unwrap(),
            with_slash.get_cache_file(URL).unwrap()
        );
    }

    #[test]
    fn test_cache_location_not_configured() {
        let file_cache = file_cache(None, true);
        let err = file_cache.get(URL).unwrap_err();
        match err.downcast_ref::<CacheError>() {
            Some(CacheError::CacheLocationNotConfigured) => (),
            _ => panic!("Expected CacheLocationNotConfigured"),
        }
    }

    #[test]
    fn test_read_compressed_and_plain_entries() {
        let data = b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok";
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        let compressed = enc.finish().unwrap();
        let fc = file_cache(Some("/tmp"), true);
        assert_eq!(
            data.to_vec(),
            fc.read_cache_data(std::io::Cursor::new(compressed)).unwrap()
        );
        assert_eq!(
            data.to_vec(),
            fc.read_cache_data(std::io::Cursor::new(data.to_vec())).unwrap()
        );
    }

    #[test]
    fn test_persist_compresses_when_configured() {
        let data = b"HTTP/1.1 200 OK\r\n\r\n";
        let mut compressed = Vec::new();
        file_cache(Some("/tmp"), true)
            .persist_cache_data(data, &mut compressed)
            .unwrap();
        assert!(compressed.starts_with(&GZIP_MAGIC));

        let mut plain = Vec::new();
        file_cache(Some("/tmp"), false)
            .persist_cache_data(data, &mut plain)
            .unwrap();
        assert_eq!(data.to_vec(), plain);
    }

    #[test]
    fn test_validate_missing_location() {
        let fc = file_cache(Some("/this/path/does/not/exist/httpcache"), true);
        let err = fc.validate_cache_location().unwrap_err();
        match err.downcast_ref::<CacheError>() {
            Some(CacheError::CacheLocationDoesNotExist(_)) => (),
            _ => panic!("Expected CacheLocationDoesNotExist"),
        }
    }
}
