pub mod agent;
pub mod cache_control;
pub mod freshness;
pub mod hop;
pub mod range;
pub mod vary;

use crate::api_defaults::X_FROM_CACHE;
use crate::cache::Cache;
use crate::io::{Response, Transport};
use crate::time::{Clock, SystemClock};
use crate::{log_debug, log_info, log_warn, Result};
use cache_control::{CacheControl, ONLY_IF_CACHED};
use freshness::Freshness;
use serde::Serialize;
use std::collections::{hash_map, HashMap};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// A cache transport sits in front of another transport. It returns stored
/// responses where possible, avoiding a network request, and adds validators
/// (`If-None-Match`, `If-Modified-Since`) to repeated requests so the server
/// can answer with a 304 Not Modified.
///
/// Requests are processed synchronously on the caller's thread. There is no
/// coordination between concurrent requests for the same key, so two of them
/// finding a stale entry will both go to the network.
pub struct CacheTransport<C, T> {
    cache: C,
    transport: T,
    clock: Box<dyn Clock>,
    mark_cached_responses: bool,
}

impl<C, T> CacheTransport<C, T> {
    pub fn new(cache: C, transport: T) -> Self {
        CacheTransport {
            cache,
            transport,
            clock: Box::new(SystemClock),
            mark_cached_responses: true,
        }
    }

    pub fn with_clock<K: Clock + 'static>(mut self, clock: K) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Responses served from the cache carry `X-From-Cache: 1` when enabled.
    /// Enabled by default.
    pub fn mark_cached_responses(mut self, mark: bool) -> Self {
        self.mark_cached_responses = mark;
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

enum Lookup {
    Hit(Response),
    Miss,
}

impl<C: Cache, T: Transport> CacheTransport<C, T> {
    fn lookup(&self, key: &str, request: &Request) -> Lookup {
        match load(&self.cache, key) {
            Ok(Some(cached)) => {
                if !vary::matches(&cached.headers, request.headers()) {
                    log_debug!("Cached response for {} varies from request", key);
                    return Lookup::Miss;
                }
                if request.method == Method::GET && !has_complete_body(&cached) {
                    log_debug!("Cached response for {} has no body to serve a GET", key);
                    return Lookup::Miss;
                }
                Lookup::Hit(cached)
            }
            Ok(None) => Lookup::Miss,
            Err(err) => {
                log_warn!("Error loading response from cache for {}: {}", key, err);
                Lookup::Miss
            }
        }
    }

    fn revalidate(&self, key: &str, mut request: Request, cached: Response) -> Result<Response> {
        match freshness::evaluate(&cached.headers, request.headers(), self.clock.as_ref()) {
            Freshness::Fresh => {
                log_info!("Fresh cache hit for {}", key);
                return self.from_cache(cached, &request);
            }
            Freshness::Stale => {
                log_info!("Stale cache hit for {}, revalidating", key);
                add_validators(&mut request, &cached);
            }
            Freshness::Transparent => {
                log_info!("Request for {} bypasses the cache", key);
            }
        }
        let response = match self.transport.perform(&request) {
            Ok(response) => response,
            Err(err) => {
                self.delete(key);
                return Err(err);
            }
        };
        if request.method == Method::GET && response.status == 304 {
            // Replace the 304 with the cached response updated with the
            // end-to-end headers the origin sent.
            log_debug!("Not modified {}, merging headers into cached response", key);
            let merged = merge_not_modified(cached, &response);
            let merged = self.store_or_invalidate(key, &request, merged);
            return self.from_cache(merged, &request);
        }
        if request.method == Method::HEAD && response.status == 200 && !cached.body.is_empty() {
            // Keep the stored GET entry, a HEAD response has no body to
            // replace it with.
            log_debug!("Keeping cached body for {} after HEAD validation", key);
            return Ok(response);
        }
        if response.status != 200 {
            log_debug!(
                "Validation of {} returned {}, dropping cached response",
                key,
                response.status
            );
            self.delete(key);
            return Ok(response);
        }
        Ok(self.store_or_invalidate(key, &request, response))
    }

    fn fetch(&self, key: &str, request: &Request) -> Result<Response> {
        if CacheControl::parse(request.headers()).contains(ONLY_IF_CACHED) {
            log_info!("Nothing cached for {} and only-if-cached requested", key);
            return Ok(Response::gateway_timeout());
        }
        let response = self.transport.perform(request)?;
        Ok(self.store_or_invalidate(key, request, response))
    }

    fn store_or_invalidate(&self, key: &str, request: &Request, mut response: Response) -> Response {
        let request_cc = CacheControl::parse(request.headers());
        let response_cc = CacheControl::parse(&response.headers);
        if !cache_control::can_store(&request_cc, &response_cc) {
            log_debug!("Response for {} is not storable", key);
            self.delete(key);
            return response;
        }
        vary::snapshot(&mut response.headers, request.headers());
        match response.to_bytes() {
            Ok(bytes) => {
                if let Err(err) = self.cache.set(key, &bytes) {
                    log_warn!("Could not store response for {}: {}", key, err);
                }
            }
            Err(err) => log_warn!("Could not serialize response for {}: {}", key, err),
        }
        response
    }

    fn from_cache(&self, mut response: Response, request: &Request) -> Result<Response> {
        if self.mark_cached_responses {
            response.headers.set(X_FROM_CACHE, "1");
        }
        if request.method == Method::HEAD {
            response.body.clear();
            return Ok(response);
        }
        apply_range(&mut response, request)?;
        Ok(response)
    }

    fn delete(&self, key: &str) {
        if let Err(err) = self.cache.delete(key) {
            log_warn!("Could not delete cached response for {}: {}", key, err);
        }
    }
}

impl<C: Cache, T: Transport> Transport for CacheTransport<C, T> {
    /// If there is a fresh response already in cache, then it is returned
    /// without connecting to the server.
    ///
    /// If there is a stale response, then any validators it contains are set
    /// on the new request to give the server a chance to respond with
    /// NotModified. If this happens, then the cached response is returned.
    fn perform(&self, request: &Request) -> Result<Response> {
        let key = cache_key(request);
        if !request.method.is_cacheable() {
            // A write to the resource invalidates what we have stored.
            self.delete(&key);
            return self.transport.perform(request);
        }
        match self.lookup(&key, request) {
            Lookup::Hit(cached) => self.revalidate(&key, request.clone(), cached),
            Lookup::Miss => self.fetch(&key, request),
        }
    }
}

/// Cache key for a request: its URL without the fragment. The method is not
/// part of the key.
pub fn cache_key(request: &Request) -> String {
    let url = request.url();
    match url.split_once('#') {
        Some((url, _)) => url.to_string(),
        None => url.to_string(),
    }
}

fn load<C: Cache + ?Sized>(cache: &C, key: &str) -> Result<Option<Response>> {
    match cache.get(key)? {
        Some(bytes) => Ok(Some(Response::from_bytes(&bytes)?)),
        None => Ok(None),
    }
}

/// Returns the cached response for `request` if present. A `Range` header on
/// the request is applied to the returned copy.
pub fn cached_response<C: Cache + ?Sized>(cache: &C, request: &Request) -> Result<Option<Response>> {
    match load(cache, &cache_key(request))? {
        Some(mut response) => {
            apply_range(&mut response, request)?;
            Ok(Some(response))
        }
        None => Ok(None),
    }
}

fn apply_range(response: &mut Response, request: &Request) -> Result<()> {
    if let Some(range) = request.headers().get("range") {
        if let Some(body) = range::apply(&response.body, range)? {
            if response.headers.contains("content-length") {
                response.headers.set("content-length", body.len().to_string());
            }
            response.body = body;
        }
    }
    Ok(())
}

/// Adds validators from the cached response unless the caller already set
/// them.
fn add_validators(request: &mut Request, cached: &Response) {
    if let Some(etag) = cached.get_etag() {
        if !request.headers().contains("if-none-match") {
            request.set_header("If-None-Match", etag);
        }
    }
    if let Some(last_modified) = cached.get_last_modified() {
        if !request.headers().contains("if-modified-since") {
            request.set_header("If-Modified-Since", last_modified);
        }
    }
}

/// A bodiless entry can only answer a GET if it declares an empty body.
/// Entries stored from a HEAD response keep the length of the body they
/// describe.
fn has_complete_body(cached: &Response) -> bool {
    if !cached.body.is_empty() {
        return true;
    }
    matches!(cached.header("content-length").map(str::trim), Some("0"))
}

fn merge_not_modified(mut cached: Response, not_modified: &Response) -> Response {
    for name in hop::end_to_end_headers(&not_modified.headers) {
        // The length describes the cached body, not the 304.
        if name == "Content-Length" {
            continue;
        }
        cached
            .headers
            .set_all(&name, not_modified.headers.get_all(&name).to_vec());
    }
    cached.status = 200;
    cached
}

/// Canonical form of a header name: the first letter and any letter
/// following a hyphen in upper case, the rest in lower case. For example,
/// `accept-encoding` becomes `Accept-Encoding`. Names containing characters
/// not allowed in a header token are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    let name = name.trim();
    if !name.bytes().all(is_token_byte) {
        return name.to_string();
    }
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// HTTP headers keyed by canonical name. A header can hold several values,
/// one per occurrence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Headers(HashMap<String, Vec<String>>);

impl Headers {
    pub fn new() -> Self {
        Headers(HashMap::new())
    }

    /// Replaces any existing values of `key`.
    pub fn set<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0
            .insert(canonical_header_key(key.as_ref()), vec![value.into()]);
    }

    /// Appends a value to `key`.
    pub fn add<K: AsRef<str>, V: Into<String>>(&mut self, key: K, value: V) {
        self.0
            .entry(canonical_header_key(key.as_ref()))
            .or_default()
            .push(value.into());
    }

    pub fn set_all<K: AsRef<str>>(&mut self, key: K, values: Vec<String>) {
        self.0.insert(canonical_header_key(key.as_ref()), values);
    }

    /// First value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(&canonical_header_key(key))
            .and_then(|values| values.first())
            .map(|s| s.as_str())
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0
            .get(&canonical_header_key(key))
            .map(|values| values.as_slice())
            .unwrap_or(&[])
    }

    /// All comma separated values of `key` across its occurrences, each
    /// trimmed. Used for list headers such as `Vary` and `Connection`.
    pub fn comma_separated_values(&self, key: &str) -> Vec<String> {
        self.get_all(key)
            .iter()
            .flat_map(|value| value.split(','))
            .map(|value| value.trim().to_string())
            .collect()
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.0.remove(&canonical_header_key(key))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(&canonical_header_key(key))
    }

    pub fn names(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> hash_map::Iter<String, Vec<String>> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    PATCH,
    DELETE,
    OPTIONS,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
            Method::OPTIONS => "OPTIONS",
        }
    }

    /// Only responses to GET and HEAD are stored.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Method::GET | Method::HEAD)
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(method: &str) -> std::result::Result<Self, Self::Err> {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "OPTIONS" => Ok(Method::OPTIONS),
            _ => Err(crate::error::gen(format!("Unsupported HTTP method {method}"))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Request {
    pub method: Method,
    url: String,
    headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(url: &str, method: Method) -> Self {
        Request {
            method,
            url: url.to_string(),
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.set_header(key, value);
        self
    }

    pub fn set_header(&mut self, key: &str, value: &str) {
        self.headers.set(key, value);
    }

    /// Appends a value to `key`, keeping any earlier ones.
    pub fn add_header(&mut self, key: &str, value: &str) {
        self.headers.add(key, value);
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }
}
