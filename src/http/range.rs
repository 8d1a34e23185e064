//! Serves a `Range` request out of a stored body. Only single ranges in the
//! `bytes` unit are understood.

use crate::error::CacheError;
use crate::{log_warn, Result};

const BYTES_UNIT: &str = "bytes";

/// Slices a copy of `body` according to the `Range` header value `range`.
///
/// Returns `Ok(None)` when the range cannot be served from the stored body
/// and the full body must be returned instead, e.g. units other than
/// `bytes`. When several ranges are requested only the first one is served.
pub fn apply(body: &[u8], range: &str) -> Result<Option<Vec<u8>>> {
    let Some((unit, value)) = range.split_once('=') else {
        log_warn!("Range header {} not supported", range);
        return Ok(None);
    };
    let unit = unit.trim();
    if unit != BYTES_UNIT {
        log_warn!("Range type {} not supported", unit);
        return Ok(None);
    }
    let mut value = value.trim();
    if let Some((first, _)) = value.split_once(',') {
        log_warn!(
            "Unsupported multiple ranges {}, only fulfilling {}",
            value,
            first
        );
        value = first.trim();
    }
    let (start, end) = bounds(value, body.len())?;
    if start >= end {
        log_warn!("Received non valid range start {} end {}", start, end);
        return Err(CacheError::InvalidRangeBounds(format!(
            "start {start} is not before end {end} for {value}"
        ))
        .into());
    }
    Ok(Some(body[start..end].to_vec()))
}

/// Start and exclusive end offsets of a single byte range spec against a body
/// of `len` bytes.
fn bounds(spec: &str, len: usize) -> Result<(usize, usize)> {
    if let Some(suffix) = spec.strip_prefix('-') {
        // -N: the last N bytes
        let suffix = parse_bound(suffix, spec)?;
        return Ok((len.saturating_sub(suffix), len));
    }
    if let Some(start) = spec.strip_suffix('-') {
        // N-: from N until the end
        return Ok((parse_bound(start, spec)?, len));
    }
    let Some((start, end)) = spec.split_once('-') else {
        return Err(CacheError::InvalidRangeBounds(format!("no range separator in {spec}")).into());
    };
    let start = parse_bound(start, spec)?;
    let last = parse_bound(end, spec)?;
    Ok((start, last.saturating_add(1).min(len)))
}

fn parse_bound(bound: &str, spec: &str) -> Result<usize> {
    bound.trim().parse::<usize>().map_err(|err| {
        CacheError::InvalidRangeBounds(format!("cannot parse range {spec}: {err}")).into()
    })
}
