use std::fmt::Display;

use anyhow::{anyhow, Context, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Response has no Date header")]
    MissingDate,
    #[error("Stored entry could not be parsed as an HTTP response: {0}")]
    MalformedStoredEntry(String),
    #[error("Invalid range bounds: {0}")]
    InvalidRangeBounds(String),
    #[error("HTTP transport error: {0}")]
    TransportFailure(String),
    #[error("Cache store error: {0}")]
    StoreFailure(String),
    #[error("Could not serialize response: {0}")]
    SerializationFailure(String),
    #[error("Time conversion error: {0}")]
    TimeConversionError(String),
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    #[error("Cache location not configured")]
    CacheLocationNotConfigured,
    #[error("Cache location does not exist: {0}")]
    CacheLocationDoesNotExist(String),
    #[error("Cache location is not a directory: {0}")]
    CacheLocationIsNotADirectory(String),
    #[error("Cache location is not writeable: {0}")]
    CacheLocationIsNotWriteable(String),
}

pub trait AddContext<T, E>: Context<T, E> {
    fn err_context<C: Display + Send + Sync + 'static>(self, msg: C) -> Result<T, anyhow::Error>
    where
        Self: Sized,
    {
        self.with_context(|| msg.to_string())
    }
}

impl<U, T, E> AddContext<T, E> for U where U: Context<T, E> {}

pub fn gen<T: AsRef<str>>(msg: T) -> anyhow::Error {
    anyhow!(msg.as_ref().to_string())
}
