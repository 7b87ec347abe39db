//! Deterministic stand-in data for development fallback
//!
//! Every value is derived from its inputs (ids, indices, the query string, an
//! anchor date) so repeated calls return identical results.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use productwhisper_domain::{
    AspectPoint, AspectStat, FacetCount, FeatureValue, Notification, NotificationKind, Product,
    ProductAttribute, ProductReview, ProductSpecification, ProfileUpdate, RelatedProduct,
    SearchFacets, SearchResult, SpecificationItem, TrendAnalysis, TrendPeriod, TrendPoint,
    TrendSeries, User,
};

const BRANDS: [&str; 2] = ["SoundMaster", "AudioPro"];
const ASPECTS: [&str; 5] = ["quality", "price", "design", "performance", "support"];
const SEARCH_PAGE_SIZE: usize = 5;

fn brand(index: i64) -> String {
    BRANDS[usize::from(index % 2 != 0)].to_string()
}

/// Small repeatable variation in `[0, 1)` keyed on `seed`.
fn jitter(seed: i64) -> f64 {
    let folded = seed.wrapping_mul(2_654_435_761).rem_euclid(1_000);
    #[allow(clippy::cast_precision_loss)]
    let value = folded as f64 / 1_000.0;
    value
}

fn features(entries: &[(&str, &str, f64)]) -> BTreeMap<String, FeatureValue> {
    entries
        .iter()
        .map(|(name, value, score)| {
            ((*name).to_string(), FeatureValue { value: (*value).to_string(), score: Some(*score) })
        })
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn attribute(name: &str, score: f64, mentions: u64) -> ProductAttribute {
    ProductAttribute { name: name.to_string(), score, mentions }
}

fn spec_group(category: &str, items: &[(&str, &str)]) -> ProductSpecification {
    ProductSpecification {
        category: category.to_string(),
        items: items
            .iter()
            .map(|(name, value)| SpecificationItem {
                name: (*name).to_string(),
                value: (*value).to_string(),
            })
            .collect(),
    }
}

/// Profile returned for `GET /auth/me`.
pub fn user(now: DateTime<Utc>) -> User {
    User {
        id: 1,
        name: "John Doe".to_string(),
        email: "john.doe@example.com".to_string(),
        bio: Some("Audio enthusiast and tech reviewer".to_string()),
        created_at: Some(now),
        last_login: Some(now),
    }
}

/// The mock user with `update` applied.
pub fn updated_user(update: &ProfileUpdate, now: DateTime<Utc>) -> User {
    let mut user = user(now);
    if let Some(name) = &update.name {
        user.name.clone_from(name);
    }
    if let Some(email) = &update.email {
        user.email.clone_from(email);
    }
    if update.bio.is_some() {
        user.bio.clone_from(&update.bio);
    }
    user
}

/// Fully populated product detail page.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
pub fn product(id: i64) -> Product {
    let offset = id as f64 * 10.0;
    Product {
        id,
        name: format!("Premium Product {id}"),
        brand: brand(id.wrapping_add(1)),
        category: "Electronics".to_string(),
        subcategory: Some("Audio".to_string()),
        description: "Experience crystal-clear audio with premium wireless headphones. \
                      Industry-leading active noise cancellation, 30-hour battery life, and \
                      a comfortable over-ear design."
            .to_string(),
        price: 199.99 + offset,
        original_price: Some(249.99 + offset),
        rating: 4.0 + jitter(id),
        review_count: id.unsigned_abs().saturating_mul(50).saturating_add(500),
        sentiment_score: 0.7 + jitter(id.wrapping_add(7)) * 0.2,
        image_url: Some(format!("https://source.unsplash.com/random/600x600/?electronics&sig={id}")),
        features: features(&[
            ("Sound Quality", "Excellent", 0.92),
            ("Battery Life", "30 hours", 0.88),
            ("Comfort", "Very Good", 0.87),
            ("Noise Cancellation", "Excellent", 0.90),
            ("Build Quality", "Premium", 0.85),
            ("Connectivity", "Bluetooth 5.0", 0.82),
        ]),
        positive_attributes: vec![
            attribute("Sound quality", 0.92, 987),
            attribute("Battery life", 0.89, 845),
            attribute("Comfort", 0.87, 756),
        ],
        negative_attributes: vec![
            attribute("Price", 0.42, 345),
            attribute("Bluetooth connectivity", 0.38, 187),
        ],
        pros: strings(&[
            "Exceptional sound clarity",
            "Long battery life",
            "Comfortable for extended use",
            "Effective noise cancellation",
        ]),
        cons: strings(&["Expensive", "Occasional Bluetooth connectivity issues", "Bulky case"]),
        specifications: vec![
            spec_group(
                "Audio",
                &[
                    ("Driver Size", "40mm"),
                    ("Frequency Response", "4Hz-40,000Hz"),
                    ("Impedance", "32 ohms"),
                ],
            ),
            spec_group(
                "Battery",
                &[
                    ("Battery Life", "30 hours (ANC on)"),
                    ("Charging Time", "3 hours"),
                    ("Quick Charge", "5 hours playback from 10 min charge"),
                ],
            ),
        ],
        reviews: vec![
            ProductReview {
                id: 1,
                user: "AudioEnthusiast".to_string(),
                date: "2023-10-15".to_string(),
                rating: 5.0,
                title: "Best headphones I've ever owned".to_string(),
                comment: "The sound quality is incredible and the noise cancellation is on \
                          another level."
                    .to_string(),
                helpful: 42,
                sentiment: 0.95,
            },
            ProductReview {
                id: 2,
                user: "CasualListener".to_string(),
                date: "2023-09-22".to_string(),
                rating: 4.0,
                title: "Great sound but pricey".to_string(),
                comment: "Amazing sound and very comfortable, but expensive compared to \
                          competitors."
                    .to_string(),
                helpful: 28,
                sentiment: 0.75,
            },
        ],
        related_products: vec![
            related(id.wrapping_add(1), "SoundMaster True Wireless Earbuds", "earbuds", 149.99),
            related(id.wrapping_add(2), "AudioPro Studio Headphones", "headphones", 199.99),
            related(id.wrapping_add(3), "SoundMaster Bluetooth Speaker", "speaker", 129.99),
        ],
    }
}

fn related(id: i64, name: &str, topic: &str, price: f64) -> RelatedProduct {
    RelatedProduct {
        id,
        name: name.to_string(),
        image_url: format!("https://source.unsplash.com/random/300x300/?{topic}"),
        price,
    }
}

/// Catalog summary used for list endpoints.
#[allow(clippy::cast_precision_loss, clippy::cast_sign_loss)]
fn summary(index: i64, name: String, description: String, topic: &str, base_price: f64) -> Product {
    Product {
        id: index + 1,
        name,
        brand: brand(index),
        category: "Electronics".to_string(),
        subcategory: None,
        description,
        price: base_price + index as f64 * 20.0,
        original_price: None,
        rating: 4.0 + jitter(index + 1),
        review_count: 100 + index.unsigned_abs() * 50,
        sentiment_score: 0.7 + jitter(index + 11) * 0.2,
        image_url: Some(format!("https://source.unsplash.com/random/300x300/?{topic}&sig={index}")),
        features: features(&[("Quality", "Good", 0.8)]),
        positive_attributes: Vec::new(),
        negative_attributes: Vec::new(),
        pros: strings(&["Popular", "Good value"]),
        cons: strings(&["Limited availability"]),
        specifications: Vec::new(),
        reviews: Vec::new(),
        related_products: Vec::new(),
    }
}

/// `limit` trending products with ids `1..=limit`.
pub fn trending_products(limit: u32) -> Vec<Product> {
    (0..i64::from(limit))
        .map(|index| {
            summary(
                index,
                format!("Trending Product {}", index + 1),
                "A popular trending product with great features and excellent user reviews."
                    .to_string(),
                "electronics",
                99.99,
            )
        })
        .collect()
}

/// One page of results echoing `query`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn search_results(query: &str) -> SearchResult {
    let topic = query.to_lowercase();
    let products: Vec<Product> = (0..SEARCH_PAGE_SIZE as i64)
        .map(|index| {
            let mut product = summary(
                index,
                format!("{query} Product {}", index + 1),
                format!("High-quality {query} with premium features and excellent performance."),
                &topic,
                149.99,
            );
            product.price = 149.99 + index as f64 * 50.0;
            product.features =
                features(&[("Quality", "Excellent", 0.85), ("Design", "Premium", 0.9)]);
            product.pros = strings(&["Great quality", "Premium design"]);
            product.cons = strings(&["Premium price"]);
            product
        })
        .collect();

    let total = products.len() as u64;
    let lowest = products.first().map_or(0.0, |p| p.price);
    let highest = products.last().map_or(0.0, |p| p.price);

    SearchResult {
        products,
        total,
        page: 1,
        page_size: 10,
        filters: SearchFacets {
            categories: vec![FacetCount { name: "Electronics".to_string(), count: total }],
            subcategories: vec![FacetCount { name: "Audio".to_string(), count: total }],
            brands: vec![
                FacetCount { name: BRANDS[0].to_string(), count: total.div_ceil(2) },
                FacetCount { name: BRANDS[1].to_string(), count: total / 2 },
            ],
            price_range: (lowest, highest),
        },
    }
}

pub fn recent_searches() -> Vec<String> {
    strings(&["wireless headphones", "noise cancelling", "gaming headset"])
}

pub fn popular_searches() -> Vec<String> {
    strings(&[
        "wireless earbuds",
        "bluetooth speaker",
        "gaming headset",
        "noise cancelling headphones",
    ])
}

pub fn favorites() -> Vec<Product> {
    let mut favorite = product(1);
    favorite.name = "Premium Wireless Headphones".to_string();
    favorite.price = 249.99;
    favorite.original_price = None;
    vec![favorite]
}

/// Sentiment, mention, and aspect series over `period`, ending at `today`.
///
/// Each series holds `period.days() + 1` points, oldest first.
#[allow(clippy::cast_precision_loss)]
pub fn trend_analysis(product_id: i64, period: TrendPeriod, today: NaiveDate) -> TrendAnalysis {
    let days = i64::from(period.days());
    let dates: Vec<(i64, String)> = (0..=days)
        .map(|step| {
            let date = today - Duration::days(days - step);
            (step, date.format("%Y-%m-%d").to_string())
        })
        .collect();

    let sentiment = dates
        .iter()
        .map(|(step, date)| TrendPoint {
            date: date.clone(),
            value: (0.7 + (*step as f64 / 5.0).sin() * 0.05 + jitter(product_id) * 0.1)
                .clamp(0.0, 1.0),
            confidence: 0.8 + jitter(product_id.wrapping_add(*step)) * 0.15,
        })
        .collect();

    let mentions = dates
        .iter()
        .map(|(step, date)| TrendPoint {
            date: date.clone(),
            value: (100.0 + (*step as f64 / 3.0).cos() * 20.0 + (product_id % 50) as f64).max(50.0),
            confidence: 0.9,
        })
        .collect();

    let aspects = dates
        .iter()
        .map(|(step, date)| AspectPoint {
            date: date.clone(),
            aspects: ASPECTS
                .iter()
                .zip(0_i64..)
                .map(|(aspect, slot)| {
                    let seed = product_id.wrapping_mul(31).wrapping_add(step * 7 + slot);
                    let stat = AspectStat {
                        count: 10 + seed.rem_euclid(40).unsigned_abs(),
                        sentiment: 0.4 + jitter(seed) * 0.5,
                    };
                    ((*aspect).to_string(), stat)
                })
                .collect(),
        })
        .collect();

    TrendAnalysis {
        product_id,
        period,
        sentiment: series(product_id, "sentiment", period, sentiment),
        mentions: series(product_id, "mentions", period, mentions),
        aspects: series(product_id, "aspects", period, aspects),
    }
}

fn series<P>(
    product_id: i64,
    trend_type: &str,
    period: TrendPeriod,
    data_points: Vec<P>,
) -> TrendSeries<P> {
    TrendSeries { product_id, trend_type: trend_type.to_string(), period, data_points }
}

/// Three sample notifications, newest first.
pub fn notifications(now: DateTime<Utc>) -> Vec<Notification> {
    vec![
        Notification {
            id: 1,
            title: "New Product Alert".to_string(),
            message: "SoundMaster just released their new XM5 headphones!".to_string(),
            kind: NotificationKind::Info,
            read: false,
            created_at: now - Duration::minutes(30),
        },
        Notification {
            id: 2,
            title: "Price Drop".to_string(),
            message: "AudioPro Studio Headphones are now 20% off!".to_string(),
            kind: NotificationKind::Success,
            read: true,
            created_at: now - Duration::hours(3),
        },
        Notification {
            id: 3,
            title: "Review Sentiment Alert".to_string(),
            message: "Recent reviews for Wireless Earbuds show declining sentiment.".to_string(),
            kind: NotificationKind::Warning,
            read: false,
            created_at: now - Duration::days(1),
        },
    ]
}
