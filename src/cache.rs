pub mod filesystem;
pub mod inmemory;
pub mod nocache;

use std::sync::Arc;

use crate::Result;
pub use filesystem::FileCache;
pub use inmemory::InMemoryCache;
pub use nocache::NoCache;

/// Byte store behind the cache transport. Values are responses in HTTP/1.1
/// wire format, keyed by request URL. A missing key is not an error.
/// Implementations do their own locking and can be shared across threads.
pub trait Cache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

impl<C: Cache + ?Sized> Cache for &C {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }
}

impl<C: Cache + ?Sized> Cache for Arc<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.as_ref().set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.as_ref().delete(key)
    }
}

impl<C: Cache + ?Sized> Cache for Box<C> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.as_ref().get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.as_ref().set(key, value)
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.as_ref().delete(key)
    }
}
