//! Freshness of a stored response as seen by a new request. Private cache
//! semantics only: `public`, `private` and `s-maxage` are not considered.

use chrono::{DateTime, Utc};

use super::cache_control::{
    CacheControl, MAX_AGE, MAX_STALE, MIN_FRESH, NO_CACHE, ONLY_IF_CACHED,
};
use super::Headers;
use crate::error::CacheError;
use crate::time::{self, Clock};
use crate::{log_debug, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Freshness {
    /// The stored response can be returned as is.
    Fresh,
    /// The stored response must be validated with the origin first.
    Stale,
    /// The stored response must not be used to fulfil the request.
    Transparent,
}

/// Parses the `Date` header of a response.
pub fn date(headers: &Headers) -> Result<DateTime<Utc>> {
    let value = headers.get("date").ok_or(CacheError::MissingDate)?;
    time::parse_http_date(value).ok_or_else(|| {
        CacheError::TimeConversionError(format!("Could not parse Date header {value}")).into()
    })
}

pub fn evaluate(response: &Headers, request: &Headers, clock: &dyn Clock) -> Freshness {
    let response_cc = CacheControl::parse(response);
    let request_cc = CacheControl::parse(request);
    if request_cc.contains(NO_CACHE) {
        return Freshness::Transparent;
    }
    if response_cc.contains(NO_CACHE) {
        return Freshness::Stale;
    }
    if request_cc.contains(ONLY_IF_CACHED) {
        return Freshness::Fresh;
    }

    let date = match date(response) {
        Ok(date) => date,
        Err(err) => {
            log_debug!("Cannot establish age of cached response: {}", err);
            return Freshness::Stale;
        }
    };
    let mut current_age = clock.seconds_since(date);

    // max-age overrides Expires, even if Expires is more restrictive.
    let mut lifetime = match response_cc.seconds(MAX_AGE) {
        Some(max_age) => max_age,
        None => response
            .get("expires")
            .and_then(time::parse_http_date)
            .map(|expires| expires.timestamp() - date.timestamp())
            .unwrap_or(0),
    };

    if let Some(max_age) = request_cc.seconds(MAX_AGE) {
        lifetime = max_age;
    }
    if let Some(min_fresh) = request_cc.seconds(MIN_FRESH) {
        current_age = current_age.saturating_add(min_fresh);
    }
    if let Some(max_stale) = request_cc.get(MAX_STALE) {
        if max_stale.is_empty() {
            return Freshness::Fresh;
        }
        if let Some(max_stale) = request_cc.seconds(MAX_STALE) {
            current_age = current_age.saturating_sub(max_stale);
        }
    }

    if lifetime > current_age {
        return Freshness::Fresh;
    }
    Freshness::Stale
}
