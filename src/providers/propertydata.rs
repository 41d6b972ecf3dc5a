use crate::error::ProviderError;
use crate::providers::traits::PropertyProvider;
use crate::providers::types::{SalesRequest, SalesResponse};
use crate::query::Query;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT: &str = "https://api.propertydata.co.uk/sales";
const USER_AGENT: &str = "PropIndex/2.0";

/// PropertyData.co.uk sold-prices client
pub struct PropertyDataClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl PropertyDataClient {
    /// Create a client for `endpoint`; every call is cut off after `timeout`
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl PropertyProvider for PropertyDataClient {
    async fn fetch(&self, query: &Query) -> Result<SalesResponse, ProviderError> {
        let body = SalesRequest::from(query);

        debug!(
            endpoint = %self.endpoint,
            postcode = %body.postcode,
            limit = body.limit,
            period = body.period,
            "Requesting sold properties"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!("PropertyData returned status: {}", response.status());
            return Err(ProviderError::Status(response.status().as_u16()));
        }

        let payload: SalesResponse = response.json().await?;

        info!(
            postcode = %body.postcode,
            records = payload.data.as_ref().map_or(0, Vec::len),
            "Fetched sold properties from PropertyData"
        );

        Ok(payload)
    }

    fn source_name(&self) -> &'static str {
        "PropertyData.co.uk"
    }
}
