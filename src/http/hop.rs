use std::collections::HashSet;

use super::{canonical_header_key, Headers};

// These headers are always hop-by-hop
const HOP_BY_HOP_HEADERS: [&str; 8] = [
    "Connection",
    "Keep-Alive",
    "Proxy-Authenticate",
    "Proxy-Authorization",
    "Te",
    "Trailers",
    "Transfer-Encoding",
    "Upgrade",
];

/// Names of the end-to-end headers in `headers`, the ones that can be carried
/// over from a 304 onto the stored response. Any header listed in
/// `Connection` is hop-by-hop as well.
pub fn end_to_end_headers(headers: &Headers) -> Vec<String> {
    let mut hop_by_hop: HashSet<String> =
        HOP_BY_HOP_HEADERS.iter().map(|h| h.to_string()).collect();
    for extra in headers.comma_separated_values("connection") {
        if !extra.is_empty() {
            hop_by_hop.insert(canonical_header_key(&extra));
        }
    }
    headers
        .names()
        .into_iter()
        .filter(|name| !hop_by_hop.contains(name))
        .collect()
}
