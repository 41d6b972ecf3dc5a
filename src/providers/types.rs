use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{FallbackReason, PropertyRecord};
use crate::query::Query;

/// Detail sections requested from the provider for every sale
pub const INCLUDE_SECTIONS: [&str; 4] = [
    "property_details",
    "sale_details",
    "images",
    "market_trends",
];

/// Body of a sold-properties request to the provider. A price bound of
/// zero is treated as unset and left out of `filters`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SalesRequest {
    /// Uppercase, no whitespace
    pub postcode: String,
    pub limit: u32,
    pub period: &'static str,
    pub include: [&'static str; 4],
    pub filters: SalesFilters,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SalesFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
}

impl From<&Query> for SalesRequest {
    fn from(query: &Query) -> Self {
        Self {
            postcode: query.normalized_postcode(),
            limit: query.limit,
            period: query.timeframe.as_str(),
            include: INCLUDE_SECTIONS,
            filters: SalesFilters {
                price_min: query.price_min.filter(|v| *v != 0.0),
                price_max: query.price_max.filter(|v| *v != 0.0),
            },
        }
    }
}

/// Provider response envelope. `data` is absent when the provider has
/// nothing usable to say.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SalesResponse {
    #[serde(default)]
    pub data: Option<Vec<UpstreamProperty>>,
}

/// One sale as the provider reports it. Every field is optional; the
/// transform decides what to fall back to.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamProperty {
    pub id: Option<Value>,
    pub full_address: Option<String>,
    pub house_number: Option<Value>,
    pub street_name: Option<String>,
    pub postcode: Option<String>,
    pub sale_price: Option<f64>,
    pub price: Option<f64>,
    pub original_asking_price: Option<f64>,
    pub sale_date: Option<String>,
    pub completion_date: Option<String>,
    pub images: Option<Vec<UpstreamImage>>,
    pub main_image: Option<String>,
    pub days_on_market: Option<f64>,
    pub property_type: Option<String>,
    pub bedrooms: Option<f64>,
    pub bathrooms: Option<f64>,
    pub estate_agent: Option<UpstreamAgent>,
    pub price_changes: Option<f64>,
    pub tenure: Option<String>,
    pub epc_rating: Option<String>,
    pub price_per_sqft: Option<f64>,
    pub market_trend: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamImage {
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct UpstreamAgent {
    pub name: Option<String>,
}

/// What the fetch stage hands to the rest of the pipeline
#[derive(Debug, Clone)]
pub enum ProviderPayload {
    /// Provider answered successfully
    Live(SalesResponse),
    /// Stand-in records, and why they were needed
    Synthetic {
        records: Vec<PropertyRecord>,
        reason: FallbackReason,
    },
}
