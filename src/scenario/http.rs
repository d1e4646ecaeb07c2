use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    Client, Request,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tokio::time::Instant;
use tracing::debug;

use crate::{
    args::HttpMethod,
    checks::{self, Check, ResponseView},
    error::{AppError, AppResult, HttpError, NetworkError},
    metrics::RequestOutcome,
    target::ValidatedTarget,
};

use super::{IterationContext, Scenario};

/// Upper bound on how much of a body is kept for checks.
const MAX_CAPTURED_BODY_BYTES: usize = 1024 * 1024;

/// Build the shared HTTP client with the per-request timeout applied.
///
/// # Errors
///
/// Returns an error if the client cannot be constructed.
pub fn build_client(
    request_timeout: Duration,
    connect_timeout: Duration,
    insecure: bool,
) -> AppResult<Client> {
    let user_agent = format!("loadcheck/{}", env!("CARGO_PKG_VERSION"));
    Client::builder()
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .danger_accept_invalid_certs(insecure)
        .user_agent(user_agent)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}

#[derive(Debug, Clone)]
pub struct HttpScenarioOptions {
    pub method: HttpMethod,
    pub headers: Vec<(String, String)>,
    pub body: String,
    pub checks: Vec<Check>,
}

/// One HTTP request per iteration, checked against every configured check.
#[derive(Debug)]
pub struct HttpScenario {
    client: Client,
    target: ValidatedTarget,
    method: reqwest::Method,
    headers: HeaderMap,
    body: String,
    checks: Vec<Check>,
    capture_body: bool,
}

impl HttpScenario {
    /// # Errors
    ///
    /// Returns an error if a header name or value is not valid HTTP.
    pub fn new(
        client: Client,
        target: ValidatedTarget,
        options: HttpScenarioOptions,
    ) -> AppResult<Self> {
        let headers = build_header_map(&options.headers)?;
        let capture_body = checks::any_needs_body(&options.checks);
        Ok(Self {
            client,
            target,
            method: options.method.into(),
            headers,
            body: options.body,
            checks: options.checks,
            capture_body,
        })
    }

    #[must_use]
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    fn build_request(&self) -> Result<Request, reqwest::Error> {
        let mut builder = self
            .client
            .request(self.method.clone(), self.target.url().clone())
            .headers(self.headers.clone());
        if !self.body.is_empty() {
            builder = builder.body(self.body.clone());
        }
        builder.build()
    }
}

fn build_header_map(headers: &[(String, String)]) -> AppResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderName {
                name: name.clone(),
                source: err,
            })
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|err| {
            AppError::http(HttpError::InvalidHeaderValue {
                name: name.clone(),
                source: err,
            })
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

struct Exchange {
    status: Option<u16>,
    response_bytes: u64,
    body: Option<Vec<u8>>,
    error: Option<NetworkError>,
}

#[async_trait]
impl Scenario for HttpScenario {
    async fn execute(&self, ctx: IterationContext) -> RequestOutcome {
        let timestamp = Instant::now();
        let exchange = match self.build_request() {
            Ok(request) => execute_request(&self.client, request, self.capture_body).await,
            Err(err) => Exchange {
                status: None,
                response_bytes: 0,
                body: None,
                error: Some(NetworkError::from_request(&err)),
            },
        };
        let latency = timestamp.elapsed();

        if let Some(error) = exchange.error.as_ref() {
            debug!(vu = ctx.vu_id, iteration = ctx.iteration, "Request failed: {}", error);
        }

        let view = ResponseView::new(
            exchange.status,
            latency,
            exchange.body.as_deref(),
            exchange.error.as_ref(),
        );
        let checks = checks::evaluate(&view, &self.checks);

        RequestOutcome {
            vu_id: ctx.vu_id,
            iteration: ctx.iteration,
            status_code: exchange.status,
            latency,
            timestamp,
            response_bytes: exchange.response_bytes,
            error: exchange.error,
            checks,
        }
    }
}

async fn execute_request(client: &Client, request: Request, capture_body: bool) -> Exchange {
    let response = match client.execute(request).await {
        Ok(response) => response,
        Err(err) => {
            return Exchange {
                status: None,
                response_bytes: 0,
                body: None,
                error: Some(NetworkError::from_request(&err)),
            };
        }
    };
    let status = response.status().as_u16();
    let mut captured = capture_body.then(Vec::new);
    match drain_response_body(response, captured.as_mut()).await {
        Ok(response_bytes) => Exchange {
            status: Some(status),
            response_bytes,
            body: captured,
            error: None,
        },
        Err(err) => Exchange {
            status: Some(status),
            response_bytes: 0,
            body: None,
            error: Some(NetworkError::from_body(&err)),
        },
    }
}

async fn drain_response_body(
    response: reqwest::Response,
    mut capture: Option<&mut Vec<u8>>,
) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
        if let Some(buffer) = capture.as_deref_mut() {
            let room = MAX_CAPTURED_BODY_BYTES.saturating_sub(buffer.len());
            let take = room.min(bytes.len());
            if let Some(slice) = bytes.get(..take) {
                buffer.extend_from_slice(slice);
            }
        }
    }
    Ok(total_bytes)
}
