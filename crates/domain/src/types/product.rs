//! Product catalog types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Product with aggregated review sentiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u64,
    /// Aggregate review sentiment in `[0, 1]`.
    #[serde(default)]
    pub sentiment_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub features: BTreeMap<String, FeatureValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positive_attributes: Vec<ProductAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub negative_attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specifications: Vec<ProductSpecification>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reviews: Vec<ProductReview>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_products: Vec<RelatedProduct>,
}

/// Feature rating, e.g. `"Battery Life": { value: "30 hours", score: 0.88 }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureValue {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

/// Attribute extracted from reviews with its sentiment and mention count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub score: f64,
    pub mentions: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSpecification {
    pub category: String,
    pub items: Vec<SpecificationItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecificationItem {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: i64,
    pub user: String,
    pub date: String,
    pub rating: f64,
    pub title: String,
    pub comment: String,
    #[serde(default)]
    pub helpful: u64,
    pub sentiment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedProduct {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    pub price: f64,
}
