use clap::Parser;

use crate::http::Method;

#[derive(Parser)]
pub struct FetchCommand {
    /// URL to request
    #[clap()]
    pub url: String,
    /// HTTP method
    #[clap(long = "request", short = 'X', default_value = "GET", value_parser = parse_method)]
    pub method: Method,
    /// Request header as 'Name: value'. Can be repeated
    #[clap(long = "header", short = 'H', value_parser = parse_header)]
    pub headers: Vec<(String, String)>,
    /// Request body
    #[clap(long = "data", short)]
    pub data: Option<String>,
    /// Print the status line and response headers before the body
    #[clap(long, short)]
    pub include: bool,
    /// Print the response as a JSON document
    #[clap(long, conflicts_with = "include")]
    pub json: bool,
}

fn parse_method(method: &str) -> Result<Method, String> {
    method.parse().map_err(|err: crate::Error| err.to_string())
}

fn parse_header(header: &str) -> Result<(String, String), String> {
    match header.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("Invalid header {header}. Expected 'Name: value'")),
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OutputFormat {
    Body,
    Include,
    Json,
}

pub struct FetchCliArgs {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub format: OutputFormat,
}

impl From<FetchCommand> for FetchCliArgs {
    fn from(options: FetchCommand) -> Self {
        let format = if options.json {
            OutputFormat::Json
        } else if options.include {
            OutputFormat::Include
        } else {
            OutputFormat::Body
        };
        FetchCliArgs {
            url: options.url,
            method: options.method,
            headers: options.headers,
            body: options.data,
            format,
        }
    }
}
