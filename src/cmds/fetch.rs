use std::io::Write;
use std::sync::Arc;

use serde::Serialize;

use crate::cache::FileCache;
use crate::cli::fetch::{FetchCliArgs, OutputFormat};
use crate::config::ConfigProperties;
use crate::http::agent::UreqTransport;
use crate::http::{CacheTransport, Headers, Request};
use crate::io::{Response, Transport};
use crate::Result;

pub fn execute<W: Write>(
    args: FetchCliArgs,
    config: Arc<dyn ConfigProperties>,
    writer: &mut W,
) -> Result<()> {
    let cache = FileCache::new(config.clone());
    cache.validate_cache_location()?;
    let client = CacheTransport::new(cache, UreqTransport::from_config(config.as_ref()))
        .mark_cached_responses(config.mark_cached_responses());
    fetch(&client, &args, writer)
}

fn fetch<T: Transport, W: Write>(client: &T, args: &FetchCliArgs, writer: &mut W) -> Result<()> {
    let response = client.perform(&build_request(args))?;
    print_response(&response, args.format, writer)
}

fn build_request(args: &FetchCliArgs) -> Request {
    let mut request = Request::new(&args.url, args.method.clone());
    for (name, value) in &args.headers {
        request.add_header(name, value);
    }
    match &args.body {
        Some(body) => request.with_body(body.as_bytes()),
        None => request,
    }
}

#[derive(Serialize)]
struct ResponseSummary<'a> {
    status: u16,
    headers: &'a Headers,
    body: String,
}

pub fn print_response<W: Write>(
    response: &Response,
    format: OutputFormat,
    writer: &mut W,
) -> Result<()> {
    match format {
        OutputFormat::Body => writer.write_all(&response.body)?,
        OutputFormat::Include => {
            writeln!(writer, "{}", response.status_line())?;
            let mut names = response.headers.names();
            names.sort();
            for name in names {
                for value in response.headers.get_all(&name) {
                    writeln!(writer, "{name}: {value}")?;
                }
            }
            writeln!(writer)?;
            writer.write_all(&response.body)?;
        }
        OutputFormat::Json => {
            let summary = ResponseSummary {
                status: response.status,
                headers: &response.headers,
                body: response.body_str(),
            };
            serde_json::to_writer_pretty(&mut *writer, &summary)?;
            writeln!(writer)?;
        }
    }
    writer.flush()?;
    Ok(())
}
