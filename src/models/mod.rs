use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Where the records in a response came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum Source {
    #[serde(rename = "PropertyData.co.uk")]
    PropertyData,
    Synthetic,
}

/// Why a response is carrying synthetic records instead of live ones
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    NotConfigured,
    UpstreamTimeout,
    UpstreamError,
    MissingData,
}

/// Normalized sold-property record
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: String,
    pub address: String,
    pub postcode: String,
    pub sold_price: f64,
    pub original_price: f64,
    /// ISO-8601 sale date as reported by the source
    pub sold_date: String,
    pub image: Option<String>,
    pub time_on_market: Option<u32>,
    pub property_type: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub agent: String,
    pub price_change: f64,
    pub tenure: String,
    pub epc_rating: Option<String>,
    pub price_per_sq_ft: Option<f64>,
    pub market_trend: String,
    pub days_on_market: Option<u32>,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

/// Aggregate statistics over a set of records
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct MarketInsights {
    pub average_price: f64,
    pub median_price: f64,
    pub average_time_on_market: f64,
    pub price_range: PriceRange,
    pub property_types: BTreeMap<String, usize>,
}

/// Body of a successful `POST /api/properties`
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub success: bool,
    pub properties: Vec<PropertyRecord>,
    pub insights: MarketInsights,
    pub total: usize,
    pub postcode: String,
    pub source: Source,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    pub timestamp: DateTime<Utc>,
    pub cached: bool,
}
