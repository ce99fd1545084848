//! Query orchestration
//!
//! A [`Query`] owns the filters, pagination and sort whitelist of one list
//! endpoint. [`Query::parse`] reads the request once; the `bind*` methods then
//! apply filters, pagination and ordering to a [`SelectBuilder`].
//!
//! ```
//! use webquery::{Filter, Query, SelectBuilder, Sort, Target};
//!
//! let params = vec![("status", "active"), ("page", "2"), ("sort", "-name")];
//!
//! let mut query = Query::new()
//!     .with_filter(Filter::string("status"))
//!     .with_sort(Sort::mapped("name", "full_name"));
//! query.parse(&params).unwrap();
//!
//! let stmt = query.bind(SelectBuilder::new()).select_statement(&Target::table("users")).unwrap();
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT * FROM \"users\" WHERE (status = $1) ORDER BY full_name DESC LIMIT $2 OFFSET $3"
//! );
//! ```

use crate::config::{DEFAULT_PAGE_SIZE, QueryConfig};
use crate::error::Result;
use crate::filter::Filter;
use crate::params::ParamSource;
use crate::sql::builder::SelectBuilder;
use crate::sql::sanitize::sanitize;

/// Ordering direction selected by the `-` prefix of a sort token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Whitelist entry mapping an external sort key to a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub key: String,
    pub field: String,
}

impl Sort {
    /// Sort key that is also the column name
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field: String::new(),
        }
    }

    /// Sort key backed by a differently named column
    pub fn mapped(key: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            field: field.into(),
        }
    }

    pub fn column(&self) -> &str {
        if self.field.is_empty() {
            &self.key
        } else {
            &self.field
        }
    }
}

/// Filters, pagination and sorting for one request
#[derive(Debug, Clone)]
pub struct Query {
    filters: Vec<Filter>,
    page: i64,
    page_size: i64,
    sorts: Vec<Sort>,
    sort: String,
    config: QueryConfig,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            sorts: Vec::new(),
            sort: String::new(),
            config: QueryConfig::default(),
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter; filters parse and bind in insertion order
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn with_filters<I: IntoIterator<Item = Filter>>(mut self, filters: I) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Register a sortable key
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    pub fn with_sorts<I: IntoIterator<Item = Sort>>(mut self, sorts: I) -> Self {
        self.sorts.extend(sorts);
        self
    }

    /// Override parameter names and limits; unset fields fall back to the defaults
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Rows skipped before the current page
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// The raw, trimmed sort expression
    pub fn sort_expr(&self) -> &str {
        &self.sort
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn filter_by_key(&self, key: &str) -> Option<&Filter> {
        self.filters.iter().find(|f| f.key() == key)
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    // =========================================================================
    // Parse
    // =========================================================================

    /// Read pagination, the sort expression and every filter from `params`
    ///
    /// Filters are parsed in order and the first error is returned; filters
    /// parsed before it keep their state.
    pub fn parse(&mut self, params: &dyn ParamSource) -> Result<()> {
        self.config = self.config.effective();
        self.parse_page(params);
        self.sort = params.param(&self.config.sort_param).trim().to_string();
        self.parse_filters(params)
    }

    fn parse_page(&mut self, params: &dyn ParamSource) {
        let page = params.param(&self.config.page_param);
        self.page = page.trim().parse::<i64>().unwrap_or(1).max(1);

        let size = params.param(&self.config.page_size_param);
        let size = size.trim();
        let mut page_size = if size.is_empty() {
            self.config.default_page_size
        } else {
            size.parse::<i64>().unwrap_or(1)
        };
        if page_size < 1 {
            page_size = 1;
        }
        if self.config.max_page_size > 0 && page_size > self.config.max_page_size {
            page_size = self.config.max_page_size;
        }
        self.page_size = page_size;
    }

    fn parse_filters(&mut self, params: &dyn ParamSource) -> Result<()> {
        for filter in &mut self.filters {
            if let Err(e) = filter.parse(params) {
                tracing::debug!(key = %filter.key(), error = %e, "Filter parse failed");
                return Err(e);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Bind
    // =========================================================================

    /// Apply filters, then pagination, then ordering
    pub fn bind(&self, builder: SelectBuilder) -> SelectBuilder {
        let builder = self.bind_filter(builder);
        let builder = self.bind_page(builder);
        self.bind_sort(builder)
    }

    pub fn bind_filter(&self, builder: SelectBuilder) -> SelectBuilder {
        self.filters
            .iter()
            .fold(builder, |builder, filter| filter.bind(builder))
    }

    pub fn bind_page(&self, builder: SelectBuilder) -> SelectBuilder {
        builder.offset(self.offset()).limit(self.page_size)
    }

    pub fn bind_sort(&self, builder: SelectBuilder) -> SelectBuilder {
        self.order_clauses()
            .into_iter()
            .fold(builder, |builder, clause| builder.order_by(clause))
    }

    /// Whitelisted `column DIRECTION` items in the order they were requested
    pub fn order_clauses(&self) -> Vec<String> {
        let mut clauses = Vec::new();
        for token in self.sort.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let (direction, key) = match token.strip_prefix('-') {
                Some(rest) => (SortDirection::Desc, rest),
                None => (SortDirection::Asc, token),
            };
            let key = sanitize(key);

            match self.sorts.iter().find(|s| s.key == key) {
                Some(sort) => clauses.push(format!("{} {}", sort.column(), direction.as_sql())),
                None => tracing::debug!(token = %key, "Ignoring unknown sort key"),
            }
        }
        clauses
    }
}
