/// Prefix for every JSON endpoint.
pub const API_PREFIX: &str = "/api";

/// Default and maximum page size for document listings.
pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;
