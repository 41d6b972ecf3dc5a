use std::collections::BTreeMap;

use crate::models::{MarketInsights, PriceRange, PropertyRecord};

/// Aggregate statistics over a result set.
///
/// The median is the element at index `n / 2` of the ascending prices, so
/// even-sized sets report the upper-middle price rather than an interpolated
/// one. Records without a time on market count as zero towards
/// `averageTimeOnMarket`. An empty set yields zero for every figure, including
/// both ends of the price range.
pub fn compute_insights(records: &[PropertyRecord]) -> MarketInsights {
    if records.is_empty() {
        return MarketInsights::default();
    }

    let mut prices: Vec<f64> = records.iter().map(|r| r.sold_price).collect();
    prices.sort_by(|a, b| a.total_cmp(b));

    let average_price = prices.iter().sum::<f64>() / prices.len() as f64;
    let median_price = prices[prices.len() / 2];
    let price_range = PriceRange {
        min: prices[0],
        max: prices[prices.len() - 1],
    };

    let average_time_on_market = records
        .iter()
        .map(|r| r.time_on_market.map_or(0.0, f64::from))
        .sum::<f64>()
        / records.len() as f64;

    let mut property_types = BTreeMap::new();
    for record in records {
        *property_types
            .entry(record.property_type.clone())
            .or_insert(0) += 1;
    }

    MarketInsights {
        average_price,
        median_price,
        average_time_on_market,
        price_range,
        property_types,
    }
}
