//! Request filters
//!
//! A [`Filter`] maps one request parameter to one predicate over one or more
//! columns. The variants form a closed set ([`FilterKind`]); each knows how to
//! turn the raw string into a typed [`Value`] and how to contribute
//! `field SYMBOL ?` to a [`SelectBuilder`].
//!
//! Filters carry per-request parse state. Build them once per request, or
//! keep a template and clone it.
//!
//! ```
//! use std::collections::HashMap;
//! use webquery::{Filter, SelectBuilder};
//!
//! let mut params = HashMap::new();
//! params.insert("q".to_string(), "ali".to_string());
//!
//! let mut filter = Filter::string("q").with_fields(["first_name", "last_name"]).with_symbol("like");
//! filter.parse(&params).unwrap();
//!
//! let builder = filter.bind(SelectBuilder::new());
//! assert_eq!(builder.predicates()[0].fragment, "first_name LIKE ? OR last_name LIKE ?");
//! ```

use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};

use crate::error::{QueryError, Result};
use crate::params::ParamSource;
use crate::sql::builder::SelectBuilder;
use crate::sql::sanitize::sanitize;
use crate::sql::value::Value;

/// Separator for array filters when none is configured
pub const DEFAULT_SEPARATOR: &str = ",";
/// chrono layout for time filters when none is configured
pub const DEFAULT_TIME_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Replaces the default parse step of one filter
pub type ParseFn = Arc<dyn Fn(&mut Filter, &dyn ParamSource) -> Result<()> + Send + Sync>;
/// Replaces the default bind step of one filter
pub type BindFn = Arc<dyn Fn(&Filter, SelectBuilder) -> SelectBuilder + Send + Sync>;

/// The value shape a filter parses into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    String,
    StringArray,
    Int,
    IntArray,
    Bool,
    Time,
}

impl FilterKind {
    pub fn is_array(self) -> bool {
        matches!(self, FilterKind::StringArray | FilterKind::IntArray)
    }

    fn default_symbol(self) -> &'static str {
        if self.is_array() { "IN" } else { "=" }
    }
}

/// Declarative rule mapping one request parameter to one predicate
#[derive(Clone)]
pub struct Filter {
    kind: FilterKind,
    key: String,
    field: String,
    fields: Vec<String>,
    symbol: String,
    separator: String,
    layout: String,
    required: bool,
    value: Option<Value>,
    parsed: Option<Value>,
    populated: bool,
    parse_fn: Option<ParseFn>,
    bind_fn: Option<BindFn>,
    resolved_fields: OnceLock<Vec<String>>,
    resolved_symbol: OnceLock<String>,
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("kind", &self.kind)
            .field("key", &self.key)
            .field("fields", &self.fields())
            .field("symbol", &self.symbol())
            .field("required", &self.required)
            .field("value", &self.value)
            .field("parsed", &self.parsed)
            .field("populated", &self.populated)
            .field("parse_fn", &self.parse_fn.is_some())
            .field("bind_fn", &self.bind_fn.is_some())
            .finish()
    }
}

impl Filter {
    /// Create a filter of the given kind reading request parameter `key`
    pub fn new(kind: FilterKind, key: impl Into<String>) -> Self {
        Self {
            kind,
            key: key.into(),
            field: String::new(),
            fields: Vec::new(),
            symbol: String::new(),
            separator: String::new(),
            layout: String::new(),
            required: false,
            value: None,
            parsed: None,
            populated: false,
            parse_fn: None,
            bind_fn: None,
            resolved_fields: OnceLock::new(),
            resolved_symbol: OnceLock::new(),
        }
    }

    pub fn string(key: impl Into<String>) -> Self {
        Self::new(FilterKind::String, key)
    }

    pub fn string_array(key: impl Into<String>) -> Self {
        Self::new(FilterKind::StringArray, key)
    }

    pub fn int(key: impl Into<String>) -> Self {
        Self::new(FilterKind::Int, key)
    }

    pub fn int_array(key: impl Into<String>) -> Self {
        Self::new(FilterKind::IntArray, key)
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self::new(FilterKind::Bool, key)
    }

    pub fn time(key: impl Into<String>) -> Self {
        Self::new(FilterKind::Time, key)
    }

    // =========================================================================
    // Builder
    // =========================================================================

    /// Match against a single column instead of the key
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self.resolved_fields = OnceLock::new();
        self
    }

    /// Match against any of several columns (ORed together)
    pub fn with_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self.resolved_fields = OnceLock::new();
        self
    }

    /// Comparison operator; normalized to upper case
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = symbol.into();
        self.resolved_symbol = OnceLock::new();
        self
    }

    /// Fail parsing when the parameter is absent or empty
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Separator for array filters (default: ",")
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// chrono layout for time filters (default: "%Y-%m-%d %H:%M:%S")
    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    /// Fixed value that takes precedence over the request; marks the filter populated
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self.populated = true;
        self
    }

    /// Replace the default parse step entirely
    pub fn parse_with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Filter, &dyn ParamSource) -> Result<()> + Send + Sync + 'static,
    {
        self.parse_fn = Some(Arc::new(hook));
        self
    }

    /// Replace the default bind step entirely
    pub fn bind_with<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Filter, SelectBuilder) -> SelectBuilder + Send + Sync + 'static,
    {
        self.bind_fn = Some(Arc::new(hook));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    /// Target columns: `fields`, else `field`, else the key
    pub fn fields(&self) -> &[String] {
        self.resolved_fields.get_or_init(|| {
            if !self.fields.is_empty() {
                self.fields.clone()
            } else if !self.field.is_empty() {
                vec![self.field.clone()]
            } else {
                vec![self.key.clone()]
            }
        })
    }

    /// Upper-cased operator, `=` for scalar kinds and `IN` for arrays by default
    pub fn symbol(&self) -> &str {
        self.resolved_symbol.get_or_init(|| {
            let symbol = self.symbol.trim();
            if symbol.is_empty() {
                self.kind.default_symbol().to_string()
            } else {
                symbol.to_uppercase()
            }
        })
    }

    pub fn separator(&self) -> &str {
        if self.separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }

    pub fn layout(&self) -> &str {
        if self.layout.is_empty() {
            DEFAULT_TIME_LAYOUT
        } else {
            &self.layout
        }
    }

    /// Value taken from the request, if parsing produced one
    pub fn parsed_value(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    /// Caller-supplied override
    pub fn override_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// The value bound to the predicate: override, else parsed value
    ///
    /// String filters with `LIKE` are wrapped as `%v%`, `LIKER` as `v%` and
    /// `LIKEL` as `%v`. Empty strings are never wrapped.
    pub fn effective_value(&self) -> Option<Value> {
        let text = match self.value.as_ref().or(self.parsed.as_ref())? {
            Value::Text(text) => text.clone(),
            other => return Some(other.clone()),
        };
        if self.kind != FilterKind::String || text.is_empty() {
            return Some(Value::Text(text));
        }
        let wrapped = match self.symbol() {
            "LIKE" => format!("%{}%", text),
            "LIKER" => format!("{}%", text),
            "LIKEL" => format!("%{}", text),
            _ => text,
        };
        Some(Value::Text(wrapped))
    }

    /// Operator written into the SQL; the anchored LIKE forms render as `LIKE`
    pub fn sql_operator(&self) -> &str {
        match self.symbol() {
            "LIKER" | "LIKEL" => "LIKE",
            other => other,
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Replace the parsed value and mark the filter populated
    pub fn set_value(&mut self, value: impl Into<Value>) {
        self.parsed = Some(value.into());
        self.populated = true;
    }

    /// Append to the parsed value and mark the filter populated
    ///
    /// Scalars are pushed onto a list value and lists extend it; the first
    /// element appended to an array filter starts a new list. On scalar
    /// filters this is the same as [`Filter::set_value`]. An item whose shape
    /// does not match an accumulated list is ignored.
    pub fn append(&mut self, item: impl Into<Value>) {
        let item = item.into();
        let merged = match (self.parsed.take(), item) {
            (Some(Value::IntList(mut items)), Value::Int(i)) => {
                items.push(i);
                Value::IntList(items)
            }
            (Some(Value::IntList(mut items)), Value::IntList(more)) => {
                items.extend(more);
                Value::IntList(items)
            }
            (Some(Value::TextList(mut items)), Value::Text(s)) => {
                items.push(s);
                Value::TextList(items)
            }
            (Some(Value::TextList(mut items)), Value::TextList(more)) => {
                items.extend(more);
                Value::TextList(items)
            }
            (None, Value::Int(i)) if self.kind == FilterKind::IntArray => Value::IntList(vec![i]),
            (None, Value::Text(s)) if self.kind == FilterKind::StringArray => {
                Value::TextList(vec![s])
            }
            (Some(list @ (Value::IntList(_) | Value::TextList(_))), item) => {
                tracing::debug!(key = %self.key, ?item, "Ignoring item that does not match the list");
                list
            }
            (_, item) => item,
        };
        self.parsed = Some(merged);
        self.populated = true;
    }

    /// Forget parse state so a cloned template can be parsed again
    pub fn reset(&mut self) {
        self.parsed = None;
        self.populated = self.value.is_some();
    }

    // =========================================================================
    // Parse / Bind
    // =========================================================================

    /// Read the trimmed raw parameter
    ///
    /// Returns `Ok(None)` for an absent or blank optional parameter. Custom parse hooks
    /// can call this to keep the key and required checks.
    pub fn raw_param(&self, params: &dyn ParamSource) -> Result<Option<String>> {
        if self.key.is_empty() {
            return Err(QueryError::EmptyKey);
        }
        let raw = params.param(&self.key);
        let raw = raw.trim();
        if raw.is_empty() {
            if self.required {
                return Err(QueryError::required(&self.key));
            }
            return Ok(None);
        }
        Ok(Some(raw.to_string()))
    }

    /// Populate the filter from the request
    pub fn parse(&mut self, params: &dyn ParamSource) -> Result<()> {
        if let Some(hook) = self.parse_fn.clone() {
            return hook(self, params);
        }
        let Some(raw) = self.raw_param(params)? else {
            return Ok(());
        };

        match self.kind {
            FilterKind::String => self.set_value(sanitize(&raw)),
            FilterKind::StringArray => {
                let cleaned = sanitize(&raw);
                let items: Vec<String> = cleaned
                    .split(self.separator())
                    .map(|s| s.trim().to_string())
                    .collect();
                self.set_value(items);
            }
            FilterKind::Int => {
                let parsed = parse_int(&raw).ok_or_else(|| self.conversion("int", &raw))?;
                self.set_value(parsed);
            }
            FilterKind::IntArray => {
                let items = raw
                    .split(self.separator())
                    .map(|piece| parse_int(piece).ok_or_else(|| self.conversion("int", piece)))
                    .collect::<Result<Vec<i64>>>()?;
                for item in items {
                    self.append(item);
                }
            }
            FilterKind::Bool => {
                let parsed = parse_bool(&raw).ok_or_else(|| self.conversion("bool", &raw))?;
                self.set_value(parsed);
            }
            FilterKind::Time => {
                let parsed = parse_time(&raw, self.layout())
                    .ok_or_else(|| self.conversion("time", &raw))?;
                self.set_value(parsed);
            }
        }
        Ok(())
    }

    /// Add this filter's predicate to `builder`; a no-op unless populated
    pub fn bind(&self, builder: SelectBuilder) -> SelectBuilder {
        if !self.populated {
            return builder;
        }
        if let Some(hook) = &self.bind_fn {
            return hook(self, builder);
        }
        let Some(value) = self.effective_value() else {
            return builder;
        };

        let operator = self.sql_operator();
        let fields = self.fields();
        let fragment = fields
            .iter()
            .map(|field| format!("{} {} ?", field, operator))
            .collect::<Vec<_>>()
            .join(" OR ");
        let values = vec![value; fields.len()];

        builder.where_clause(fragment, values)
    }

    fn conversion(&self, kind: &'static str, raw: &str) -> QueryError {
        QueryError::conversion(kind, &self.key, raw)
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}

/// Accepts 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False
fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse in the local timezone; date-only layouts resolve to midnight
fn parse_time(raw: &str, layout: &str) -> Option<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw, layout)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, layout)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;
    Local.from_local_datetime(&naive).single()
}
