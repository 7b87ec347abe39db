//! Client constants
//!
//! Endpoint paths, storage keys, and default settings shared by every layer.

// Credential storage keys
pub const ACCESS_TOKEN_KEY: &str = "pw_access_token";
pub const REFRESH_TOKEN_KEY: &str = "pw_refresh_token";
pub const DEFAULT_KEYRING_SERVICE: &str = "ProductWhisper.api";

// Connection defaults
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REFRESH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;

// Auth endpoints
pub const AUTH_REGISTER_PATH: &str = "/auth/register";
pub const AUTH_LOGIN_PATH: &str = "/auth/login";
pub const AUTH_LOGOUT_PATH: &str = "/auth/logout";
pub const AUTH_ME_PATH: &str = "/auth/me";
pub const AUTH_PROFILE_PATH: &str = "/auth/profile";
pub const AUTH_PASSWORD_PATH: &str = "/auth/password";
pub const AUTH_REFRESH_PATH: &str = "/auth/refresh";

// Search endpoints
pub const SEARCH_PATH: &str = "/search";
pub const SEARCH_RECENT_PATH: &str = "/search/recent";
pub const SEARCH_POPULAR_PATH: &str = "/search/popular";
pub const SEARCH_FAVORITES_PATH: &str = "/search/favorites";

// Catalog endpoints
pub const PRODUCTS_PATH: &str = "/products";
pub const TRENDING_PATH: &str = "/recommendations/trending";
pub const TRENDS_ALL_PATH: &str = "/trends/all";

// Notification endpoints
pub const NOTIFICATIONS_PATH: &str = "/notifications";
pub const NOTIFICATIONS_UNREAD_COUNT_PATH: &str = "/notifications/unread-count";
pub const NOTIFICATIONS_MARK_ALL_READ_PATH: &str = "/notifications/mark-all-read";

// Environment variables
pub const ENV_API_URL: &str = "PRODUCTWHISPER_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "PRODUCTWHISPER_TIMEOUT_SECS";
pub const ENV_REFRESH_TIMEOUT_SECS: &str = "PRODUCTWHISPER_REFRESH_TIMEOUT_SECS";
pub const ENV_MAX_ATTEMPTS: &str = "PRODUCTWHISPER_MAX_ATTEMPTS";
pub const ENV_ENVIRONMENT: &str = "PRODUCTWHISPER_ENV";
pub const ENV_MOCK_FALLBACK: &str = "PRODUCTWHISPER_MOCK_FALLBACK";
pub const ENV_STORAGE_BACKEND: &str = "PRODUCTWHISPER_STORAGE";
pub const ENV_KEYRING_SERVICE: &str = "PRODUCTWHISPER_KEYRING_SERVICE";
