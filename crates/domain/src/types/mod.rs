//! Domain types and models
//!
//! Wire types exchanged with the ProductWhisper API. Field names follow the
//! server's camelCase JSON unless a module says otherwise.

pub mod notification;
pub mod product;
pub mod search;
pub mod trend;
pub mod user;

use serde::{Deserialize, Serialize};

pub use notification::{
    Notification, NotificationEnvelope, NotificationKind, NotificationList, NotificationQuery,
};
pub use product::{
    FeatureValue, Product, ProductAttribute, ProductReview, ProductSpecification, RelatedProduct,
    SpecificationItem,
};
pub use search::{FacetCount, SearchFacets, SearchFilters, SearchRequest, SearchResult, SortBy, SortOrder};
pub use trend::{AspectPoint, AspectStat, TrendAnalysis, TrendPeriod, TrendPoint, TrendSeries};
pub use user::{
    AuthResponse, AuthTokens, LoginRequest, PasswordChange, ProfileUpdate, RefreshRequest,
    RefreshResponse, RegisterRequest, User,
};

/// `{ "success": bool }` acknowledgement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub const OK: Self = Self { success: true };
}

/// `{ "count": n }` payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}

/// `{ "message": "..." }` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
