//! Configuration for request parameter parsing
//!
//! Provides a builder pattern for overriding parameter names and page sizes.
//! There is no process-wide mutable state: [`QueryConfig::default`] is the
//! immutable set of defaults, and [`QueryConfig::merged_with`] fills in any
//! unset field from it.

use serde::{Deserialize, Serialize};

/// Default request key for the page number
pub const DEFAULT_PAGE_PARAM: &str = "page";
/// Default request key for the page size
pub const DEFAULT_PAGE_SIZE_PARAM: &str = "pageSize";
/// Default request key for the sort expression
pub const DEFAULT_SORT_PARAM: &str = "sort";
/// Page size used when the request does not carry one
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page size a request may ask for
pub const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

/// Parameter names and page size limits used by [`crate::Query`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryConfig {
    /// Request key read for the page number (default: "page")
    pub page_param: String,
    /// Request key read for the page size (default: "pageSize")
    pub page_size_param: String,
    /// Request key read for the sort expression (default: "sort")
    pub sort_param: String,
    /// Page size used when the request carries none (default: 10)
    pub default_page_size: i64,
    /// Upper bound on the page size; non-positive disables the bound (default: 100)
    pub max_page_size: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            page_param: DEFAULT_PAGE_PARAM.to_string(),
            page_size_param: DEFAULT_PAGE_SIZE_PARAM.to_string(),
            sort_param: DEFAULT_SORT_PARAM.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }
}

impl QueryConfig {
    /// Create a new configuration builder
    pub fn builder() -> QueryConfigBuilder {
        QueryConfigBuilder::new()
    }

    /// Return a copy where every empty name and zero size is taken from `defaults`
    ///
    /// A negative `max_page_size` is kept as is; it means "no upper bound".
    pub fn merged_with(&self, defaults: &QueryConfig) -> QueryConfig {
        fn pick(value: &str, fallback: &str) -> String {
            let picked = if value.is_empty() { fallback } else { value };
            picked.to_string()
        }

        QueryConfig {
            page_param: pick(&self.page_param, &defaults.page_param),
            page_size_param: pick(&self.page_size_param, &defaults.page_size_param),
            sort_param: pick(&self.sort_param, &defaults.sort_param),
            default_page_size: if self.default_page_size == 0 {
                defaults.default_page_size
            } else {
                self.default_page_size
            },
            max_page_size: if self.max_page_size == 0 {
                defaults.max_page_size
            } else {
                self.max_page_size
            },
        }
    }

    /// Merge with the built-in defaults
    pub fn effective(&self) -> QueryConfig {
        self.merged_with(&QueryConfig::default())
    }
}

/// Builder for QueryConfig
///
/// Fields left untouched stay empty/zero and are resolved against the
/// defaults when the query is parsed.
#[derive(Debug, Default)]
pub struct QueryConfigBuilder {
    page_param: String,
    page_size_param: String,
    sort_param: String,
    default_page_size: i64,
    max_page_size: i64,
}

impl QueryConfigBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page parameter name (default: "page")
    pub fn page_param(mut self, name: impl Into<String>) -> Self {
        self.page_param = name.into();
        self
    }

    /// Set the page size parameter name (default: "pageSize")
    pub fn page_size_param(mut self, name: impl Into<String>) -> Self {
        self.page_size_param = name.into();
        self
    }

    /// Set the sort parameter name (default: "sort")
    pub fn sort_param(mut self, name: impl Into<String>) -> Self {
        self.sort_param = name.into();
        self
    }

    /// Set the page size used when the request carries none (default: 10)
    pub fn default_page_size(mut self, size: i64) -> Self {
        self.default_page_size = size;
        self
    }

    /// Set the maximum page size (default: 100)
    pub fn max_page_size(mut self, size: i64) -> Self {
        self.max_page_size = size;
        self
    }

    /// Remove the upper bound on the page size
    pub fn unbounded_page_size(mut self) -> Self {
        self.max_page_size = -1;
        self
    }

    /// Build the configuration
    pub fn build(self) -> QueryConfig {
        QueryConfig {
            page_param: self.page_param,
            page_size_param: self.page_size_param,
            sort_param: self.sort_param,
            default_page_size: self.default_page_size,
            max_page_size: self.max_page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Default Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = QueryConfig::default();

        assert_eq!(config.page_param, "page");
        assert_eq!(config.page_size_param, "pageSize");
        assert_eq!(config.sort_param, "sort");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 100);
    }

    #[test]
    fn test_empty_builder_merges_to_defaults() {
        let config = QueryConfig::builder().build();
        assert_eq!(config.page_param, "");
        assert_eq!(config.effective(), QueryConfig::default());
    }

    // =========================================================================
    // Merge Tests
    // =========================================================================

    #[test]
    fn test_merge_keeps_overrides() {
        let config = QueryConfig::builder()
            .page_param("p")
            .max_page_size(50)
            .build()
            .effective();

        assert_eq!(config.page_param, "p");
        assert_eq!(config.page_size_param, "pageSize");
        assert_eq!(config.sort_param, "sort");
        assert_eq!(config.default_page_size, 10);
        assert_eq!(config.max_page_size, 50);
    }

    #[test]
    fn test_merge_with_custom_defaults() {
        let defaults = QueryConfig::builder()
            .page_param("pg")
            .page_size_param("size")
            .sort_param("order")
            .default_page_size(20)
            .max_page_size(200)
            .build();

        let config = QueryConfig::builder().sort_param("o").build().merged_with(&defaults);

        assert_eq!(config.page_param, "pg");
        assert_eq!(config.page_size_param, "size");
        assert_eq!(config.sort_param, "o");
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 200);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let once = QueryConfig::builder().page_param("p").build().effective();
        assert_eq!(once.effective(), once);
    }

    #[test]
    fn test_unbounded_page_size_survives_merge() {
        let config = QueryConfig::builder().unbounded_page_size().build().effective();
        assert_eq!(config.max_page_size, -1);
    }

    // =========================================================================
    // Serde Tests
    // =========================================================================

    #[test]
    fn test_deserialize_partial_config() {
        let config: QueryConfig =
            serde_json::from_str(r#"{"pageSizeParam": "limit", "maxPageSize": 25}"#).unwrap();

        assert_eq!(config.page_size_param, "limit");
        assert_eq!(config.max_page_size, 25);
        assert_eq!(config.page_param, "page");
    }
}
