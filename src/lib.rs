//! # webquery
//!
//! Declarative filtering, sorting and pagination for PostgreSQL list endpoints.
//!
//! Request parameters arrive as untyped strings (`page`, `pageSize`, `sort`
//! and arbitrary filter keys). This crate turns them into typed, sanitized
//! predicates on a select statement and runs it, optionally with a total count.
//!
//! ## Features
//!
//! - **Typed Filters**: String, StringArray, Int, IntArray, Bool and Time filters
//!   with per-filter operators, target columns and required flags
//! - **Custom Hooks**: Replace the parse or bind step of any single filter
//! - **Sort Whitelist**: `-name,age` style sort expressions; unknown keys are ignored
//! - **Bounded Pagination**: Page and page size are clamped, page size has a ceiling
//! - **SQL Injection Prevention**: Values are always bound as parameters and stripped
//!   of SQL metacharacters; sort tokens only reach SQL through the whitelist
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webquery::{Filter, Model, Query, QueryString, Sort, Target};
//!
//! #[derive(sqlx::FromRow)]
//! struct User {
//!     id: i64,
//!     full_name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = sqlx::PgPool::connect("postgres://localhost/mydb").await?;
//!     let model = Model::<webquery::PgStore<User>>::postgres(pool, Target::table("users"));
//!
//!     // Build a fresh query for every request
//!     let mut query = Query::new()
//!         .with_filter(Filter::string("q").with_fields(["full_name", "email"]).with_symbol("LIKE"))
//!         .with_filter(Filter::int_array("ids").with_field("id"))
//!         .with_filter(Filter::boolean("active"))
//!         .with_sort(Sort::mapped("name", "full_name"))
//!         .with_sort(Sort::new("id"));
//!
//!     let params = QueryString::parse("q=ali&active=true&page=2&pageSize=20&sort=-name");
//!     query.parse(&params)?;
//!
//!     let (users, total) = model.list_and_count(&query).await?;
//!     println!("{} of {}", users.len(), total);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! Parameter names and page sizes are configured per query with `QueryConfig`:
//!
//! ```rust
//! use webquery::{Query, QueryConfig};
//!
//! let config = QueryConfig::builder()
//!     .page_param("p")           // Default "page"
//!     .page_size_param("limit")  // Default "pageSize"
//!     .sort_param("order")       // Default "sort"
//!     .default_page_size(20)     // Default 10
//!     .max_page_size(50)         // Default 100
//!     .build();
//!
//! let query = Query::new().with_config(config);
//! ```
//!
//! ## Concurrency
//!
//! `Filter` and `Query` hold per-request parse state. Construct them (or clone
//! a template) for each request instead of sharing one instance.

pub mod config;
pub mod error;
pub mod filter;
pub mod model;
pub mod params;
pub mod query;
pub mod sql;

// Re-export main types for convenience
pub use config::{QueryConfig, QueryConfigBuilder};
pub use error::{QueryError, Result};
pub use filter::{BindFn, Filter, FilterKind, ParseFn};
pub use model::{Model, Page, PgStore, Store};
pub use params::{FnParams, ParamSource, QueryString};
pub use query::{Query, Sort, SortDirection};
pub use sql::{SelectBuilder, Statement, Target, Value};
