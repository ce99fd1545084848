//! Select statement building
//!
//! [`SelectBuilder`] collects predicates, ordering and pagination the way a
//! request is bound, and renders them into a PostgreSQL statement.
//! Predicates are written with `?` placeholders; rendering renumbers them to
//! `$1, $2, ...` and expands list values into `($n, $n+1, ...)`.

use crate::error::{QueryError, Result};
use crate::sql::sanitize::quote_identifier;
use crate::sql::value::Value;

/// One WHERE fragment with its positional values
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub fragment: String,
    pub values: Vec<Value>,
}

/// The table rows are read from, and which columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    table: String,
    columns: Vec<String>,
}

impl Target {
    /// Select every column of `table`
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
        }
    }

    /// Restrict the selected columns (quoted when rendered)
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    fn select_list(&self) -> String {
        if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_identifier(c))
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

/// Rendered SQL and the scalar parameters for its placeholders, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Accumulates the parts of a SELECT
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectBuilder {
    predicates: Vec<Predicate>,
    orders: Vec<String>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate, conjoined with the existing ones
    pub fn where_clause(mut self, fragment: impl Into<String>, values: Vec<Value>) -> Self {
        self.predicates.push(Predicate {
            fragment: fragment.into(),
            values,
        });
        self
    }

    /// Append an ORDER BY item such as `name DESC`
    pub fn order_by(mut self, clause: impl Into<String>) -> Self {
        self.orders.push(clause.into());
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn orders(&self) -> &[String] {
        &self.orders
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    /// Render `SELECT ... [WHERE] [ORDER BY] [LIMIT] [OFFSET]`
    pub fn select_statement(&self, target: &Target) -> Result<Statement> {
        let mut params = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            target.select_list(),
            quote_identifier(&target.table)
        );

        self.push_where(&mut sql, &mut params)?;

        if !self.orders.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.orders.join(", "));
        }
        if let Some(limit) = self.limit {
            params.push(Value::Int(limit));
            sql.push_str(&format!(" LIMIT ${}", params.len()));
        }
        if let Some(offset) = self.offset {
            params.push(Value::Int(offset));
            sql.push_str(&format!(" OFFSET ${}", params.len()));
        }

        tracing::trace!(sql = %sql, params = params.len(), "Rendered select statement");
        Ok(Statement { sql, params })
    }

    /// Render `SELECT COUNT(*) ... [WHERE]`; ordering and pagination are ignored
    pub fn count_statement(&self, target: &Target) -> Result<Statement> {
        let mut params = Vec::new();
        let mut sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(&target.table));

        self.push_where(&mut sql, &mut params)?;

        tracing::trace!(sql = %sql, params = params.len(), "Rendered count statement");
        Ok(Statement { sql, params })
    }

    fn push_where(&self, sql: &mut String, params: &mut Vec<Value>) -> Result<()> {
        if self.predicates.is_empty() {
            return Ok(());
        }
        let mut clauses = Vec::with_capacity(self.predicates.len());
        for predicate in &self.predicates {
            clauses.push(format!("({})", render_predicate(predicate, params)?));
        }
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
        Ok(())
    }
}

/// Replace each `?` with numbered placeholders, appending the scalars to `params`
fn render_predicate(predicate: &Predicate, params: &mut Vec<Value>) -> Result<String> {
    let found = predicate.fragment.matches('?').count();
    if found != predicate.values.len() {
        return Err(QueryError::Placeholder {
            expected: predicate.values.len(),
            found,
        });
    }

    let mut values = predicate.values.iter();
    let mut out = String::with_capacity(predicate.fragment.len() + 8);
    for c in predicate.fragment.chars() {
        if c != '?' {
            out.push(c);
            continue;
        }
        let Some(value) = values.next() else {
            break;
        };
        if value.is_list() {
            if value.placeholder_count() == 0 {
                out.push_str("(NULL)");
                continue;
            }
            let mut numbered = Vec::with_capacity(value.placeholder_count());
            for scalar in value.scalars() {
                params.push(scalar);
                numbered.push(format!("${}", params.len()));
            }
            out.push('(');
            out.push_str(&numbered.join(", "));
            out.push(')');
        } else {
            params.push(value.clone());
            out.push_str(&format!("${}", params.len()));
        }
    }
    Ok(out)
}
