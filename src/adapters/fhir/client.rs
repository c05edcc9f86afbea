//! FHIR REST client
//!
//! Provides the two fetch paths of the ingestion engine:
//!
//! - [`PageWalker`] lazily follows the `next` cursor over the root Patient
//!   listing. Nothing is retried here; a transport or non-success response is
//!   fatal for the run. The root fetch happens at most once and is coarse
//!   grained, so a failed run is simply re-run by the operator.
//! - [`FhirClient::fetch_for_patient`] queries one linked resource type for
//!   one patient, with bounded retries, a fixed delay on transport failures
//!   and `Retry-After` handling on 429 responses. Per-patient fetches are
//!   many and must tolerate transient blips.

use super::models::Bundle;
use crate::config::{FhirConfig, RetryConfig};
use crate::domain::{FhirError, ResourceType, Result, StageError};
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// Outcome of a per-patient fetch
#[derive(Debug)]
pub enum FetchOutcome {
    /// The server returned one or more linked records
    Records(Vec<Value>),
    /// The server confirmed there are no linked records for this patient
    Empty,
    /// All retry attempts failed; whether the patient has records is unknown
    Exhausted,
}

/// HTTP client for a FHIR server
pub struct FhirClient {
    base_url: String,
    client: Client,
    retry: RetryConfig,
    page_delay: Duration,
}

impl FhirClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &FhirConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FhirError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retry: config.retry.clone(),
            page_delay: Duration::from_millis(config.page_delay_ms),
        })
    }

    /// Base URL of the FHIR server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Start walking the paginated listing of a resource type
    pub fn walk(&self, resource: ResourceType, page_size: usize) -> PageWalker<'_> {
        let first_url = format!(
            "{}/{}?_count={}",
            self.base_url,
            resource.as_str(),
            page_size
        );
        PageWalker {
            client: self,
            resource,
            next_url: Some(first_url),
            pages_read: 0,
        }
    }

    /// Fetch all records of `resource` that reference `patient_id`
    ///
    /// Issues one query per attempt, up to the configured maximum. A 429
    /// response waits for the server-supplied `Retry-After` (or the
    /// configured fallback) and consumes one attempt; any other failure logs,
    /// waits the fixed retry delay and consumes one attempt. A successful
    /// response with no entries is [`FetchOutcome::Empty`] — the confirmed
    /// empty signal the skip list is built from. Exhausted retries yield
    /// [`FetchOutcome::Exhausted`] so the caller can leave the patient to be
    /// retried on a later run instead of recording it as empty.
    pub async fn fetch_for_patient(
        &self,
        resource: ResourceType,
        patient_id: &str,
    ) -> Result<FetchOutcome> {
        let param = resource.link_param().ok_or_else(|| {
            StageError::Ingestion(format!(
                "{resource} is the root type and cannot be fetched per patient"
            ))
        })?;

        let url = format!(
            "{}/{}?{}=Patient/{}",
            self.base_url,
            resource.as_str(),
            param.as_str(),
            patient_id
        );

        let mut retries = 0;
        while retries < self.retry.max_retries {
            match self.client.get(&url).send().await {
                Ok(resp) if resp.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let wait_secs = retry_after_secs(&resp)
                        .unwrap_or(self.retry.rate_limit_wait_secs);
                    tracing::warn!(
                        resource = %resource,
                        patient_id = %patient_id,
                        wait_secs = wait_secs,
                        "Rate limited, waiting before retry"
                    );
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                    retries += 1;
                }
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(
                        resource = %resource,
                        patient_id = %patient_id,
                        status = resp.status().as_u16(),
                        "Unexpected status fetching linked records"
                    );
                    retries += 1;
                    tokio::time::sleep(Duration::from_secs(self.retry.retry_delay_secs)).await;
                }
                Ok(resp) => match resp.json::<Bundle>().await {
                    Ok(bundle) => {
                        if bundle.is_empty() {
                            return Ok(FetchOutcome::Empty);
                        }
                        return Ok(FetchOutcome::Records(bundle.into_resources()));
                    }
                    Err(e) => {
                        tracing::warn!(
                            resource = %resource,
                            patient_id = %patient_id,
                            error = %e,
                            "Failed to decode bundle"
                        );
                        retries += 1;
                        tokio::time::sleep(Duration::from_secs(self.retry.retry_delay_secs)).await;
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        resource = %resource,
                        patient_id = %patient_id,
                        error = %e,
                        "Transport error fetching linked records"
                    );
                    retries += 1;
                    tokio::time::sleep(Duration::from_secs(self.retry.retry_delay_secs)).await;
                }
            }
        }

        tracing::warn!(
            resource = %resource,
            patient_id = %patient_id,
            retries = retries,
            "Retries exhausted, leaving patient for the next run"
        );
        Ok(FetchOutcome::Exhausted)
    }

    /// Issue one GET and decode the bundle, without retries
    async fn get_bundle(&self, url: &str) -> Result<Bundle> {
        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FhirError::Timeout(e.to_string())
            } else {
                FhirError::ConnectionFailed(e.to_string())
            }
        })?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs =
                retry_after_secs(&resp).unwrap_or(self.retry.rate_limit_wait_secs);
            return Err(FhirError::RateLimited { retry_after_secs }.into());
        }
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            let err = if status.is_server_error() {
                FhirError::ServerError {
                    status: status.as_u16(),
                    message,
                }
            } else {
                FhirError::ClientError {
                    status: status.as_u16(),
                    message,
                }
            };
            return Err(err.into());
        }

        let bundle = resp
            .json::<Bundle>()
            .await
            .map_err(|e| FhirError::InvalidResponse(e.to_string()))?;
        Ok(bundle)
    }
}

/// Parse the `Retry-After` header as integer seconds
fn retry_after_secs(resp: &Response) -> Option<u64> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Lazy walker over a paginated collection endpoint
///
/// Produces one page of records at a time, following the server's `next`
/// link relation until none remains. Pauses briefly before each follow-up
/// request to respect source load limits.
pub struct PageWalker<'a> {
    client: &'a FhirClient,
    resource: ResourceType,
    next_url: Option<String>,
    pages_read: usize,
}

impl PageWalker<'_> {
    /// Fetch the next page of records
    ///
    /// Returns `Ok(None)` once the sequence is exhausted.
    ///
    /// # Errors
    ///
    /// Any transport or non-success response propagates; root pagination is
    /// intentionally not retried (see module docs).
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let url = match self.next_url.take() {
            Some(url) => url,
            None => return Ok(None),
        };

        if self.pages_read > 0 {
            tokio::time::sleep(self.client.page_delay).await;
        }

        let bundle = self.client.get_bundle(&url).await.map_err(|e| {
            tracing::error!(
                resource = %self.resource,
                url = %url,
                error = %e,
                "Root page fetch failed"
            );
            e
        })?;
        self.pages_read += 1;

        self.next_url = bundle.next_url().map(str::to_string);
        tracing::debug!(
            resource = %self.resource,
            page = self.pages_read,
            has_next = self.next_url.is_some(),
            "Fetched page"
        );

        Ok(Some(bundle.into_resources()))
    }

    /// Number of pages read so far
    pub fn pages_read(&self) -> usize {
        self.pages_read
    }
}
