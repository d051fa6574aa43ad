//! Long-running operation polling.
//!
//! A write that the service finishes asynchronously is tracked one of three
//! ways, in order of preference: an `Azure-AsyncOperation` status URL, a
//! `Location` URL answering 202 until done, or the resource's own
//! `properties.provisioningState`.

use std::time::Duration;

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::client::{RawResponse, ResourceManagerClient};
use super::error::{ApiError, ErrorDetail};
use super::OperationStatus;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";
const LOCATION: &str = "location";

/// How completion of an operation is observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollStrategy {
    /// The initial response was final.
    Done,
    /// Poll an operation status URL until `status` is terminal.
    AsyncOperation(Url),
    /// Poll a location URL until it stops answering 202.
    Location(Url),
    /// Re-read the resource until its provisioning state is terminal.
    ProvisioningState(Url),
}

#[derive(Debug, Deserialize)]
struct OperationResult {
    status: OperationStatus,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisioningEnvelope {
    #[serde(default)]
    properties: Option<ProvisioningProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct ProvisioningProperties {
    #[serde(rename = "provisioningState", default)]
    provisioning_state: Option<OperationStatus>,
}

fn header_url(headers: &HeaderMap, name: &str, base: &Url) -> Result<Option<Url>, ApiError> {
    match headers.get(name).and_then(|v| v.to_str().ok()) {
        Some(value) if !value.is_empty() => Ok(Some(base.join(value)?)),
        _ => Ok(None),
    }
}

/// The delay requested by a `Retry-After` header, in whole seconds.
pub(crate) fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn provisioning_state(body: &str) -> Option<OperationStatus> {
    serde_json::from_str::<ProvisioningEnvelope>(body)
        .ok()
        .and_then(|e| e.properties)
        .and_then(|p| p.provisioning_state)
}

/// Pick a strategy from the response to the initial request.
pub(crate) fn strategy_for(
    method: &Method,
    resource_url: &Url,
    response: &RawResponse,
) -> Result<PollStrategy, ApiError> {
    if let Some(url) = header_url(&response.headers, AZURE_ASYNC_OPERATION, resource_url)? {
        return Ok(PollStrategy::AsyncOperation(url));
    }

    if response.status == StatusCode::ACCEPTED {
        if let Some(url) = header_url(&response.headers, LOCATION, resource_url)? {
            return Ok(PollStrategy::Location(url));
        }
    }

    if *method != Method::DELETE {
        if let Some(state) = provisioning_state(&response.body) {
            if state.is_failure() {
                return Err(ApiError::OperationFailed {
                    status: state.to_string(),
                    message: String::new(),
                });
            }
            if !state.is_terminal() {
                return Ok(PollStrategy::ProvisioningState(resource_url.clone()));
            }
        }
    }

    Ok(PollStrategy::Done)
}

/// Wait until the operation started by `initial` has finished.
pub(crate) async fn poll_until_done(
    client: &ResourceManagerClient,
    method: &Method,
    resource_url: &Url,
    initial: &RawResponse,
) -> Result<(), ApiError> {
    let strategy = strategy_for(method, resource_url, initial)?;
    if strategy == PollStrategy::Done {
        return Ok(());
    }

    debug!(?strategy, "polling long-running operation");
    let mut delay = retry_after(&initial.headers).unwrap_or_else(|| client.poll_interval());

    loop {
        tokio::time::sleep(delay).await;

        let response = match &strategy {
            PollStrategy::Done => return Ok(()),
            PollStrategy::AsyncOperation(url) => {
                let response = client.execute(Method::GET, url.clone(), None).await?;
                let result: OperationResult = serde_json::from_str(&response.body)?;
                if result.status.is_failure() {
                    return Err(ApiError::OperationFailed {
                        status: result.status.to_string(),
                        message: result
                            .error
                            .and_then(|e| e.message)
                            .unwrap_or_default(),
                    });
                }
                if result.status.is_terminal() {
                    return Ok(());
                }
                response
            },
            PollStrategy::Location(url) => {
                let response = client.send(Method::GET, url.clone(), None).await?;
                match response.status {
                    StatusCode::ACCEPTED => response,
                    StatusCode::NOT_FOUND if *method == Method::DELETE => return Ok(()),
                    status if status.is_success() => return Ok(()),
                    status => return Err(ApiError::from_response(status, &response.body)),
                }
            },
            PollStrategy::ProvisioningState(url) => {
                let response = client.execute(Method::GET, url.clone(), None).await?;
                match provisioning_state(&response.body) {
                    Some(state) if state.is_failure() => {
                        return Err(ApiError::OperationFailed {
                            status: state.to_string(),
                            message: String::new(),
                        })
                    },
                    Some(state) if !state.is_terminal() => response,
                    _ => return Ok(()),
                }
            },
        };

        delay = retry_after(&response.headers).unwrap_or_else(|| client.poll_interval());
    }
}
