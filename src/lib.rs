//! A private HTTP cache that sits in front of an HTTP transport and follows
//! the caching rules of RFC 7234.
//!
//! ```no_run
//! use httpcache::cache::InMemoryCache;
//! use httpcache::http::{agent::UreqTransport, CacheTransport, Method, Request};
//! use httpcache::io::Transport;
//!
//! let client = CacheTransport::new(InMemoryCache::new(), UreqTransport::default());
//! let request = Request::new("https://example.com/", Method::GET);
//! let response = client.perform(&request).unwrap();
//! // Served from the cache if the first response was fresh.
//! let again = client.perform(&request).unwrap();
//! println!("{} {:?}", response.status, again.header("X-From-Cache"));
//! ```

pub mod api_defaults;
pub mod cache;
pub mod cli;
pub mod cmds;
pub mod config;
pub mod error;
pub mod http;
pub mod io;
pub mod logging;
pub mod time;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate derive_builder;
