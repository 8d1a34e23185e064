//! `Vary` handling. A stored response remembers the values the original
//! request carried for every header named in `Vary` as `X-Varied-<Name>`
//! headers. A new request can only be served from that response if it carries
//! the same values.

use super::{canonical_header_key, Headers};
use crate::api_defaults::X_VARIED_PREFIX;

fn varied_header(name: &str) -> String {
    format!("{}{}", X_VARIED_PREFIX, canonical_header_key(name))
}

/// Returns false unless all the values snapshotted for the headers listed in
/// the stored response's `Vary` match the new request.
pub fn matches(stored: &Headers, request: &Headers) -> bool {
    for name in stored.comma_separated_values("vary") {
        if name.is_empty() {
            continue;
        }
        if name == "*" {
            return false;
        }
        let requested = request.get(&name).unwrap_or("");
        let snapshot = stored.get(&varied_header(&name)).unwrap_or("");
        if requested != snapshot {
            return false;
        }
    }
    true
}

/// Records on the response the request values of the headers it varies on.
pub fn snapshot(response: &mut Headers, request: &Headers) {
    for name in response.comma_separated_values("vary") {
        if name.is_empty() || name == "*" {
            continue;
        }
        if let Some(value) = request.get(&name).filter(|value| !value.is_empty()) {
            response.set(varied_header(&name), value);
        }
    }
}
