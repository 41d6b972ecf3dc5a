use crate::models::PropertyRecord;
use crate::providers::types::{SalesResponse, UpstreamProperty};
use chrono::{SecondsFormat, Utc};
use serde_json::Value;

/// Map a provider response onto normalized records.
///
/// Returns `None` when the response carries no data array at all, so the
/// caller can substitute synthetic records. `fallback_postcode` fills in
/// records the provider sent without one.
pub fn transform(response: SalesResponse, fallback_postcode: &str) -> Option<Vec<PropertyRecord>> {
    let data = response.data?;
    Some(
        data.into_iter()
            .enumerate()
            .map(|(index, item)| to_record(item, index, fallback_postcode))
            .collect(),
    )
}

fn to_record(item: UpstreamProperty, index: usize, fallback_postcode: &str) -> PropertyRecord {
    let sale_price = amount(item.sale_price);
    let days_on_market = count(item.days_on_market);

    PropertyRecord {
        id: scalar(item.id).unwrap_or_else(|| format!("prop_{}", index)),
        address: text(item.full_address).unwrap_or_else(|| {
            format!(
                "{} {}",
                scalar(item.house_number).unwrap_or_default(),
                text(item.street_name).as_deref().unwrap_or("Unknown Street")
            )
            .trim()
            .to_string()
        }),
        postcode: text(item.postcode).unwrap_or_else(|| fallback_postcode.to_string()),
        sold_price: sale_price.or(amount(item.price)).unwrap_or(0.0),
        original_price: amount(item.original_asking_price)
            .or(sale_price)
            .unwrap_or(0.0),
        sold_date: text(item.sale_date)
            .or(text(item.completion_date))
            .unwrap_or_else(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        image: item
            .images
            .and_then(|images| images.into_iter().next())
            .and_then(|image| text(image.url))
            .or(text(item.main_image)),
        time_on_market: days_on_market,
        property_type: text(item.property_type).unwrap_or_else(|| "Unknown".to_string()),
        bedrooms: count(item.bedrooms),
        bathrooms: count(item.bathrooms),
        agent: item
            .estate_agent
            .and_then(|agent| text(agent.name))
            .unwrap_or_else(|| "Unknown Agent".to_string()),
        price_change: item.price_changes.filter(|v| v.is_finite()).unwrap_or(0.0),
        tenure: text(item.tenure).unwrap_or_else(|| "Unknown".to_string()),
        epc_rating: text(item.epc_rating),
        price_per_sq_ft: amount(item.price_per_sqft),
        market_trend: text(item.market_trend).unwrap_or_else(|| "stable".to_string()),
        days_on_market,
    }
}

/// Non-blank string
fn text(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Positive, finite money amount; zero counts as missing
fn amount(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Whole non-negative count (days, rooms)
fn count(value: Option<f64>) -> Option<u32> {
    value
        .filter(|v| v.is_finite() && *v >= 0.0 && *v <= u32::MAX as f64)
        .map(|v| v.round() as u32)
}

/// String or number rendered as an identifier
fn scalar(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(data: Value) -> SalesResponse {
        serde_json::from_value(json!({ "data": data })).unwrap()
    }

    #[test]
    fn maps_a_complete_record() {
        let records = transform(
            response(json!([{
                "id": "pd-1",
                "full_address": "10 Downing Street, London",
                "postcode": "SW1A 2AA",
                "sale_price": 950000,
                "original_asking_price": 1000000,
                "sale_date": "2024-03-01",
                "images": [{ "url": "https://img/1.jpg" }],
                "days_on_market": 42,
                "property_type": "Terraced",
                "bedrooms": 4,
                "bathrooms": 2,
                "estate_agent": { "name": "Foxtons" },
                "price_changes": -50000,
                "tenure": "Leasehold",
                "epc_rating": "D",
                "price_per_sqft": 1200,
                "market_trend": "rising"
            }])),
            "E16AN",
        )
        .unwrap();

        let r = &records[0];
        assert_eq!(r.id, "pd-1");
        assert_eq!(r.address, "10 Downing Street, London");
        assert_eq!(r.postcode, "SW1A 2AA");
        assert_eq!(r.sold_price, 950000.0);
        assert_eq!(r.original_price, 1000000.0);
        assert_eq!(r.sold_date, "2024-03-01");
        assert_eq!(r.image.as_deref(), Some("https://img/1.jpg"));
        assert_eq!(r.time_on_market, Some(42));
        assert_eq!(r.days_on_market, Some(42));
        assert_eq!(r.property_type, "Terraced");
        assert_eq!(r.bedrooms, Some(4));
        assert_eq!(r.agent, "Foxtons");
        assert_eq!(r.price_change, -50000.0);
        assert_eq!(r.tenure, "Leasehold");
        assert_eq!(r.epc_rating.as_deref(), Some("D"));
        assert_eq!(r.price_per_sq_ft, Some(1200.0));
        assert_eq!(r.market_trend, "rising");
    }

    #[test]
    fn falls_back_field_by_field() {
        let records = transform(
            response(json!([
                {
                    "house_number": 12,
                    "street_name": "Mill Lane",
                    "price": 310000,
                    "completion_date": "2024-02-02",
                    "main_image": "https://img/main.jpg"
                },
                { "sale_price": 0 }
            ])),
            "E16AN",
        )
        .unwrap();

        let first = &records[0];
        assert_eq!(first.id, "prop_0");
        assert_eq!(first.address, "12 Mill Lane");
        assert_eq!(first.postcode, "E16AN");
        assert_eq!(first.sold_price, 310000.0);
        assert_eq!(first.original_price, 0.0);
        assert_eq!(first.sold_date, "2024-02-02");
        assert_eq!(first.image.as_deref(), Some("https://img/main.jpg"));
        assert_eq!(first.property_type, "Unknown");
        assert_eq!(first.agent, "Unknown Agent");
        assert_eq!(first.tenure, "Unknown");
        assert_eq!(first.market_trend, "stable");

        let second = &records[1];
        assert_eq!(second.id, "prop_1");
        assert_eq!(second.address, "Unknown Street");
        assert_eq!(second.sold_price, 0.0);
        assert_eq!(second.time_on_market, None);
        assert_eq!(second.bedrooms, None);
        assert_eq!(second.epc_rating, None);
        assert_eq!(second.price_per_sq_ft, None);
        assert_eq!(second.image, None);
        assert!(!second.sold_date.is_empty());
    }

    #[test]
    fn original_price_falls_back_to_sale_price() {
        let records = transform(response(json!([{ "sale_price": 500000 }])), "E16AN").unwrap();
        assert_eq!(records[0].original_price, 500000.0);
    }

    #[test]
    fn missing_data_array_is_none_but_empty_array_is_empty() {
        assert!(transform(SalesResponse::default(), "E16AN").is_none());
        assert_eq!(transform(response(json!([])), "E16AN"), Some(Vec::new()));
    }
}
