//! Network transport backed by ureq.

use std::time::Duration;

use ureq::http;
use ureq::{Agent, AsSendBody};

use super::{Headers, Request};
use crate::config::ConfigProperties;
use crate::error::CacheError;
use crate::io::{Response, Transport};
use crate::time::Seconds;
use crate::{log_debug, Result};

/// Performs requests over the network. Any status code the server sends back
/// is a response, errors are only raised for exchanges that did not complete.
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Seconds) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from(timeout)))
            .build();
        UreqTransport {
            agent: Agent::new_with_config(config),
        }
    }

    pub fn from_config<C: ConfigProperties + ?Sized>(config: &C) -> Self {
        Self::new(config.timeout())
    }

    fn run<B: AsSendBody>(&self, request: &Request, body: B) -> Result<Response> {
        let builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url());
        let builder = request
            .headers()
            .iter()
            .fold(builder, |builder, (name, values)| {
                values
                    .iter()
                    .fold(builder, |builder, value| builder.header(name.as_str(), value.as_str()))
            });
        let ureq_req = builder
            .body(body)
            .map_err(|err| CacheError::TransportFailure(err.to_string()))?;
        let response = self
            .agent
            .run(ureq_req)
            .map_err(|err| CacheError::TransportFailure(err.to_string()))?;
        let (parts, mut body) = response.into_parts();
        let mut headers = Headers::new();
        for (name, value) in parts.headers.iter() {
            headers.add(name.as_str(), String::from_utf8_lossy(value.as_bytes()));
        }
        let body = body
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|err| CacheError::TransportFailure(err.to_string()))?;
        log_debug!(
            "{} {} returned {}",
            request.method,
            request.url(),
            parts.status.as_u16()
        );
        Ok(Response::builder()
            .status(parts.status.as_u16())
            .headers(headers)
            .body(body)
            .build()?)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(Seconds::new(crate::api_defaults::DEFAULT_TIMEOUT_SECONDS))
    }
}

impl Transport for UreqTransport {
    fn perform(&self, request: &Request) -> Result<Response> {
        if request.body.is_empty() {
            self.run(request, ())
        } else {
            self.run(request, request.body.as_slice())
        }
    }
}
