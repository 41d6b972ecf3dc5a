use crate::models::PropertyRecord;
use chrono::{Duration, SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_COUNT: usize = 20;

const ADDRESSES: [&str; 10] = [
    "123 Oak Street, SW1A 1AA",
    "45 Victoria Road, W1K 3TD",
    "78 Mill Lane, E1 6AN",
    "12 Church Close, N1 9GU",
    "34 High Street, SE1 9SG",
    "56 Park Avenue, WC1H 9JP",
    "89 Green Road, EC1A 4HD",
    "23 Kings Way, SW7 2AZ",
    "67 Queens Gate, NW1 4RY",
    "91 Baker Street, W1U 6QW",
];

const PROPERTY_TYPES: [&str; 4] = ["House", "Flat", "Terraced", "Semi-Detached"];

const IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1560184318-d4c4b2e0e5d4?w=300&h=200&fit=crop&auto=format";

/// Generate `count` plausible sold-property records.
///
/// Values are random but shaped like real sales: prices between £200k and
/// £1m, 1 to 90 days on market, 1 to 5 bedrooms, 1 to 3 bathrooms, sold in
/// the last 30 days. Query filters are not applied.
pub fn generate(count: usize) -> Vec<PropertyRecord> {
    generate_with(&mut rand::thread_rng(), count)
}

pub fn generate_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<PropertyRecord> {
    (0..count).map(|i| synthetic_record(rng, i)).collect()
}

fn synthetic_record<R: Rng + ?Sized>(rng: &mut R, index: usize) -> PropertyRecord {
    let entry = ADDRESSES.choose(rng).copied().unwrap_or(ADDRESSES[0]);
    let (street, postcode) = entry.rsplit_once(", ").unwrap_or((entry, ""));

    let sold_price = rng.gen_range(200_000..1_000_000) as f64;
    let original_price = rng.gen_range(250_000..1_150_000) as f64;
    let days = rng.gen_range(1..=90);
    let sold_at = Utc::now() - Duration::seconds(rng.gen_range(0..30 * 24 * 60 * 60));

    PropertyRecord {
        id: format!("synthetic_{}", index + 1),
        address: street.to_string(),
        postcode: postcode.to_string(),
        sold_price,
        original_price,
        sold_date: sold_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        image: Some(IMAGE_URL.to_string()),
        time_on_market: Some(days),
        property_type: PROPERTY_TYPES
            .choose(rng)
            .copied()
            .unwrap_or("House")
            .to_string(),
        bedrooms: Some(rng.gen_range(1..=5)),
        bathrooms: Some(rng.gen_range(1..=3)),
        agent: "Sample Estate Agent".to_string(),
        price_change: 0.0,
        tenure: "Freehold".to_string(),
        epc_rating: Some("C".to_string()),
        price_per_sq_ft: Some(rng.gen_range(300..800) as f64),
        market_trend: "stable".to_string(),
        days_on_market: Some(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn generates_requested_count_with_unique_ids() {
        let records = generate(DEFAULT_COUNT);
        assert_eq!(records.len(), 20);

        let mut ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn values_fall_in_plausible_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let cutoff = Utc::now() - Duration::days(31);

        for record in generate_with(&mut rng, 200) {
            assert!((200_000.0..1_000_000.0).contains(&record.sold_price));
            assert!((1..=90).contains(&record.time_on_market.unwrap()));
            assert_eq!(record.time_on_market, record.days_on_market);
            assert!((1..=5).contains(&record.bedrooms.unwrap()));
            assert!((1..=3).contains(&record.bathrooms.unwrap()));

            let sold = DateTime::parse_from_rfc3339(&record.sold_date).unwrap();
            assert!(sold > cutoff);
        }
    }

    #[test]
    fn postcode_matches_the_chosen_address() {
        let mut rng = StdRng::seed_from_u64(42);
        for record in generate_with(&mut rng, 50) {
            let entry = format!("{}, {}", record.address, record.postcode);
            assert!(ADDRESSES.contains(&entry.as_str()), "{}", entry);
        }
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generate(0).is_empty());
    }
}
