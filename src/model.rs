//! Result materialization
//!
//! [`Model`] couples a [`Store`] with the [`Target`] table and runs a parsed
//! [`Query`] against it. [`PgStore`] is the sqlx/PostgreSQL store.

use std::future::Future;
use std::marker::PhantomData;

use chrono::Utc;
use serde::Serialize;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Arguments, FromRow, PgPool, Postgres};

use crate::error::{QueryError, Result};
use crate::query::Query;
use crate::sql::builder::{SelectBuilder, Statement, Target};
use crate::sql::value::Value;

/// Executes rendered statements
///
/// Implementations report "no rows" either as an empty vector or as
/// `sqlx::Error::RowNotFound`; [`Model`] treats both as an empty result.
pub trait Store {
    type Row;

    /// Run a `SELECT COUNT(*)` statement
    fn count(&self, statement: &Statement) -> impl Future<Output = Result<i64>> + Send;

    /// Run a `SELECT` statement and materialize every row
    fn fetch(&self, statement: &Statement) -> impl Future<Output = Result<Vec<Self::Row>>> + Send;
}

/// PostgreSQL store decoding rows into `T`
pub struct PgStore<T> {
    /// Database connection pool
    pool: PgPool,
    _row: PhantomData<fn() -> T>,
}

impl<T> Clone for PgStore<T> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<T> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _row: PhantomData,
        }
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl<T> Store for PgStore<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    type Row = T;

    async fn count(&self, statement: &Statement) -> Result<i64> {
        let args = pg_arguments(&statement.params)?;
        let count = sqlx::query_scalar_with::<Postgres, i64, _>(&statement.sql, args)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn fetch(&self, statement: &Statement) -> Result<Vec<T>> {
        let args = pg_arguments(&statement.params)?;
        let rows = sqlx::query_as_with::<Postgres, T, _>(&statement.sql, args)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Bind values with their native Postgres types; times are sent as UTC
fn pg_arguments(params: &[Value]) -> Result<PgArguments> {
    let mut args = PgArguments::default();
    for param in params {
        let added = match param {
            Value::Text(v) => args.add(v.clone()),
            Value::TextList(v) => args.add(v.clone()),
            Value::Int(v) => args.add(*v),
            Value::IntList(v) => args.add(v.clone()),
            Value::Bool(v) => args.add(*v),
            Value::Time(v) => args.add(v.with_timezone(&Utc)),
        };
        added.map_err(|e| QueryError::Sql(sqlx::Error::Encode(e)))?;
    }
    Ok(args)
}

/// One page of rows with its totals
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 {
            (total.max(0) + page_size - 1) / page_size
        } else {
            0
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// A store plus the table its rows come from
pub struct Model<S> {
    store: S,
    target: Target,
}

impl<T> Model<PgStore<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    /// Model over a PostgreSQL pool decoding rows into `T`
    pub fn postgres(pool: PgPool, target: Target) -> Self {
        Self::new(PgStore::new(pool), target)
    }
}

impl<S: Store> Model<S> {
    pub fn new(store: S, target: Target) -> Self {
        Self { store, target }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Fetch the current page with filters and ordering applied
    pub async fn list(&self, query: &Query) -> Result<Vec<S::Row>> {
        let statement = query
            .bind(SelectBuilder::new())
            .select_statement(&self.target)?;

        tracing::debug!(table = %self.target.table_name(), sql = %statement.sql, "Listing rows");
        or_empty(self.store.fetch(&statement).await)
    }

    /// Count every filtered row, then fetch the current page
    ///
    /// The count sees the filters only; pagination and ordering are applied
    /// to the same filtered builder afterwards.
    pub async fn list_and_count(&self, query: &Query) -> Result<(Vec<S::Row>, i64)> {
        let filtered = query.bind_filter(SelectBuilder::new());

        let count_statement = filtered.count_statement(&self.target)?;
        tracing::debug!(table = %self.target.table_name(), sql = %count_statement.sql, "Counting rows");
        let total = match self.store.count(&count_statement).await {
            Err(e) if e.is_not_found() => 0,
            other => other?,
        };

        let select_statement = query
            .bind_sort(query.bind_page(filtered))
            .select_statement(&self.target)?;
        tracing::debug!(table = %self.target.table_name(), sql = %select_statement.sql, "Listing rows");
        let rows = or_empty(self.store.fetch(&select_statement).await)?;

        Ok((rows, total))
    }

    /// [`Model::list_and_count`] wrapped with the query's page position
    pub async fn paginate(&self, query: &Query) -> Result<Page<S::Row>> {
        let (items, total) = self.list_and_count(query).await?;
        Ok(Page::new(items, total, query.page(), query.page_size()))
    }
}

fn or_empty<T>(result: Result<Vec<T>>) -> Result<Vec<T>> {
    match result {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}
