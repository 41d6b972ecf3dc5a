use crate::error::ProviderError;
use crate::providers::types::SalesResponse;
use crate::query::Query;
use async_trait::async_trait;

/// Common trait for sold-property data sources.
/// The request pipeline only talks to this, so alternative providers (or
/// test doubles) can be plugged in without touching it.
#[async_trait]
pub trait PropertyProvider: Send + Sync {
    /// Fetch recent sales matching the query
    async fn fetch(&self, query: &Query) -> Result<SalesResponse, ProviderError>;

    /// Get the name of the data source
    fn source_name(&self) -> &'static str;
}
