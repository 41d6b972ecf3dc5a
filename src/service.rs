use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::cache::QueryCache;
use crate::config::Config;
use crate::error::{AppError, ProviderError};
use crate::insights::compute_insights;
use crate::limiter::RateLimiter;
use crate::models::{FallbackReason, QueryResult, Source};
use crate::providers::{
    synthetic, transform, PropertyDataClient, PropertyProvider, ProviderPayload,
};
use crate::query::{self, Query};

const MISSING_KEY_WARNING: &str = "PropertyData API key not configured - using synthetic data";

/// The property query pipeline: rate limit, validate, cache, fetch, reshape.
///
/// Owns the rate ledger and the result cache; one instance is shared by every
/// request the server handles.
pub struct PropertyService {
    limiter: RateLimiter,
    cache: QueryCache,
    provider: Option<Arc<dyn PropertyProvider>>,
    synthetic_count: usize,
    strict_upstream: bool,
}

impl PropertyService {
    pub fn new(
        limiter: RateLimiter,
        cache: QueryCache,
        provider: Option<Arc<dyn PropertyProvider>>,
    ) -> Self {
        Self {
            limiter,
            cache,
            provider,
            synthetic_count: synthetic::DEFAULT_COUNT,
            strict_upstream: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let provider: Option<Arc<dyn PropertyProvider>> = match config.api_key() {
            Some(key) => Some(Arc::new(PropertyDataClient::new(
                &config.upstream_url,
                key,
                config.upstream_timeout(),
            )?)),
            None => {
                warn!("{}", MISSING_KEY_WARNING);
                None
            }
        };

        Ok(Self::new(
            RateLimiter::new(config.rate_limit, config.rate_window(), config.ledger_capacity),
            QueryCache::new(config.cache_ttl(), config.cache_capacity),
            provider,
        )
        .with_synthetic_count(config.synthetic_count)
        .with_strict_upstream(config.strict_upstream))
    }

    pub fn with_synthetic_count(mut self, count: usize) -> Self {
        self.synthetic_count = count;
        self
    }

    pub fn with_strict_upstream(mut self, strict: bool) -> Self {
        self.strict_upstream = strict;
        self
    }

    pub fn rate_limit(&self) -> (u32, Duration) {
        (self.limiter.limit(), self.limiter.window())
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache.ttl()
    }

    /// Run one request from `client` with raw JSON `body` through the pipeline.
    ///
    /// The rate limiter is charged before the body is parsed, so malformed
    /// requests still count against the client's window.
    pub async fn handle(&self, client: &str, body: &[u8]) -> Result<QueryResult, AppError> {
        if !self.limiter.allow(client).await {
            warn!(client, "Rate limit exceeded");
            return Err(AppError::RateLimited);
        }

        let query = query::parse(body).map_err(|err| {
            debug!(client, fields = ?err.fields().collect::<Vec<_>>(), "Rejected invalid query");
            err
        })?;

        let key = query.cache_key();
        if let Some(mut hit) = self.cache.get(&key).await {
            debug!(client, key = %key, "Cache hit");
            hit.cached = true;
            hit.timestamp = Utc::now();
            hit.postcode = query.postcode.clone();
            return Ok(hit);
        }

        let (properties, fallback_reason) = match self.fetch(&query).await? {
            ProviderPayload::Live(response) => {
                match transform(response, &query.normalized_postcode()) {
                    Some(records) => (records, None),
                    None => {
                        warn!(postcode = %query.postcode, "Provider response had no data - using synthetic data");
                        (
                            synthetic::generate(self.synthetic_count),
                            Some(FallbackReason::MissingData),
                        )
                    }
                }
            }
            ProviderPayload::Synthetic { records, reason } => (records, Some(reason)),
        };

        let insights = compute_insights(&properties);
        let result = QueryResult {
            success: true,
            total: properties.len(),
            properties,
            insights,
            postcode: query.postcode.clone(),
            source: if fallback_reason.is_some() {
                Source::Synthetic
            } else {
                Source::PropertyData
            },
            degraded: fallback_reason.is_some(),
            fallback_reason,
            timestamp: Utc::now(),
            cached: false,
        };

        // Upstream failures are not cached so recovery shows on the next request
        if matches!(fallback_reason, None | Some(FallbackReason::NotConfigured)) {
            self.cache.put(key, result.clone()).await;
        }

        info!(
            client,
            postcode = %result.postcode,
            total = result.total,
            degraded = result.degraded,
            "✅ Served property query"
        );

        Ok(result)
    }

    /// Get provider data for a query, substituting synthetic records when the
    /// provider is not configured or fails. In strict mode provider failures
    /// are returned instead.
    pub async fn fetch(&self, query: &Query) -> Result<ProviderPayload, AppError> {
        let Some(provider) = &self.provider else {
            warn!("{}", MISSING_KEY_WARNING);
            return Ok(self.synthetic(FallbackReason::NotConfigured));
        };

        match provider.fetch(query).await {
            Ok(response) => Ok(ProviderPayload::Live(response)),
            Err(err) if self.strict_upstream => {
                error!(source = provider.source_name(), error = %err, "Provider request failed");
                Err(err.into())
            }
            Err(err) => {
                warn!(
                    source = provider.source_name(),
                    error = %err,
                    "Provider request failed - falling back to synthetic data"
                );
                let reason = match err {
                    ProviderError::Timeout => FallbackReason::UpstreamTimeout,
                    _ => FallbackReason::UpstreamError,
                };
                Ok(self.synthetic(reason))
            }
        }
    }

    fn synthetic(&self, reason: FallbackReason) -> ProviderPayload {
        ProviderPayload::Synthetic {
            records: synthetic::generate(self.synthetic_count),
            reason,
        }
    }
}
