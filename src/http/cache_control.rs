//! `Cache-Control` directive parsing.

use std::collections::HashMap;

use super::Headers;

pub const NO_CACHE: &str = "no-cache";
pub const NO_STORE: &str = "no-store";
pub const MAX_AGE: &str = "max-age";
pub const MIN_FRESH: &str = "min-fresh";
pub const MAX_STALE: &str = "max-stale";
pub const ONLY_IF_CACHED: &str = "only-if-cached";

/// Directives found in the `Cache-Control` headers of a single request or
/// response. Directive names are lowercased. Directives without an argument
/// map to an empty value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CacheControl(HashMap<String, String>);

impl CacheControl {
    /// Collects the directives of every `Cache-Control` occurrence in
    /// `headers`. Never fails: tokens that cannot be understood are dropped.
    pub fn parse(headers: &Headers) -> Self {
        headers
            .get_all("cache-control")
            .iter()
            .fold(CacheControl::default(), |mut cc, value| {
                cc.extend(value);
                cc
            })
    }

    pub fn parse_value(value: &str) -> Self {
        let mut cc = CacheControl::default();
        cc.extend(value);
        cc
    }

    fn extend(&mut self, value: &str) {
        for directive in value.split(',') {
            let directive = directive.trim();
            if directive.is_empty() {
                continue;
            }
            let (name, value) = match directive.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim().trim_matches('"')),
                None => (directive, ""),
            };
            if name.is_empty() {
                continue;
            }
            self.0.insert(name.to_ascii_lowercase(), value.to_string());
        }
    }

    pub fn contains(&self, directive: &str) -> bool {
        self.0.contains_key(directive)
    }

    pub fn get(&self, directive: &str) -> Option<&str> {
        self.0.get(directive).map(|s| s.as_str())
    }

    /// Value of a delta-seconds directive. `None` when the directive is
    /// absent; an argument that is not a number counts as zero seconds.
    pub fn seconds(&self, directive: &str) -> Option<i64> {
        self.get(directive).map(parse_delta_seconds)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// Bounded so that adding ages and lifetimes together cannot overflow.
const MAX_DELTA_SECONDS: i64 = i64::MAX / 4;

fn parse_delta_seconds(value: &str) -> i64 {
    value
        .parse::<i64>()
        .map(|secs| secs.clamp(-MAX_DELTA_SECONDS, MAX_DELTA_SECONDS))
        .unwrap_or(0)
}

/// A response can be stored unless the request or the response carry
/// `no-store`.
pub fn can_store(request_cc: &CacheControl, response_cc: &CacheControl) -> bool {
    !(response_cc.contains(NO_STORE) || request_cc.contains(NO_STORE))
}
