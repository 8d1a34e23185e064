use crate::{
    api_defaults,
    error::CacheError,
    http::{Headers, Request},
    Result,
};
use std::{io::Write, sync::Arc};

/// A trait for the HTTP protocol. Implementors perform a single HTTP exchange:
/// they take a `Request` and hand back the `Response` the remote produced.
/// Clients can potentially do HTTP calls against a remote server, consult a
/// cache first or mock the responses for testing purposes. A status code
/// returned by the remote, including 4xx and 5xx, is a response and not an
/// error. Errors are reserved for exchanges that could not complete.
pub trait Transport {
    fn perform(&self, request: &Request) -> Result<Response>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn perform(&self, request: &Request) -> Result<Response> {
        (**self).perform(request)
    }
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn perform(&self, request: &Request) -> Result<Response> {
        self.as_ref().perform(request)
    }
}

/// A complete HTTP response. Also the unit the cache stores, serialized in
/// HTTP/1.1 wire format.
#[derive(Clone, Debug, PartialEq, Builder)]
pub struct Response {
    #[builder(default = "200")]
    pub status: u16,
    #[builder(default)]
    pub headers: Headers,
    #[builder(setter(into), default)]
    pub body: Vec<u8>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::default()
    }

    /// Response handed back when a request demands `only-if-cached` and there
    /// is nothing usable in the cache.
    pub fn gateway_timeout() -> Self {
        Response {
            status: 504,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn get_etag(&self) -> Option<&str> {
        self.header("etag")
    }

    pub fn get_last_modified(&self) -> Option<&str> {
        self.header("last-modified")
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    pub fn status_line(&self) -> String {
        format!("HTTP/1.1 {} {}", self.status, reason_phrase(self.status))
    }

    /// Serializes the response as HTTP/1.1: status line, CRLF terminated
    /// header block and body. The body is stored decoded, so
    /// `Transfer-Encoding` is dropped and `Content-Length` reflects the actual
    /// body whenever there is one.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut lines = Vec::new();
        let mut names = self.headers.names();
        names.sort();
        for name in names {
            if name == "Transfer-Encoding" {
                continue;
            }
            if name == "Content-Length" && !self.body.is_empty() {
                continue;
            }
            for value in self.headers.get_all(&name) {
                if invalid_header_field(&name) || invalid_header_field(value) {
                    return Err(CacheError::SerializationFailure(format!(
                        "header {name} contains a line break"
                    ))
                    .into());
                }
                lines.push(format!("{}: {}", name, value));
            }
        }
        if !self.body.is_empty() {
            lines.push(format!("Content-Length: {}", self.body.len()));
        }
        // from_bytes cannot read back more header lines than this.
        if lines.len() > api_defaults::MAX_STORED_HEADERS {
            return Err(CacheError::SerializationFailure(format!(
                "{} header lines exceed the limit of {}",
                lines.len(),
                api_defaults::MAX_STORED_HEADERS
            ))
            .into());
        }
        let mut buf = Vec::with_capacity(self.body.len() + 512);
        write!(buf, "{}\r\n", self.status_line())?;
        for line in lines {
            write!(buf, "{}\r\n", line)?;
        }
        buf.extend_from_slice(b"\r\n");
        buf.extend_from_slice(&self.body);
        Ok(buf)
    }

    /// Parses a response previously written by `to_bytes`. Everything after
    /// the header block is the body, bounded by `Content-Length` if present.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut raw_headers = [httparse::EMPTY_HEADER; api_defaults::MAX_STORED_HEADERS];
        let mut parsed = httparse::Response::new(&mut raw_headers);
        let offset = match parsed.parse(data) {
            Ok(httparse::Status::Complete(offset)) => offset,
            Ok(httparse::Status::Partial) => {
                return Err(
                    CacheError::MalformedStoredEntry("incomplete header block".to_string()).into(),
                )
            }
            Err(err) => return Err(CacheError::MalformedStoredEntry(err.to_string()).into()),
        };
        let status = parsed
            .code
            .ok_or_else(|| CacheError::MalformedStoredEntry("missing status code".to_string()))?;
        let mut headers = Headers::new();
        for header in parsed.headers.iter() {
            headers.add(header.name, String::from_utf8_lossy(header.value).trim());
        }
        let rest = &data[offset..];
        let body_len = headers
            .get("content-length")
            .and_then(|len| len.parse::<usize>().ok())
            .map(|len| len.min(rest.len()))
            .unwrap_or(rest.len());
        Ok(Response {
            status,
            headers,
            body: rest[..body_len].to_vec(),
        })
    }
}

fn invalid_header_field(field: &str) -> bool {
    field.contains('\r') || field.contains('\n')
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        410 => "Gone",
        412 => "Precondition Failed",
        416 => "Range Not Satisfiable",
        422 => "Unprocessable Entity",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "",
    }
}
