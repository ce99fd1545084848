//! SQL Sanitization Utilities
//!
//! Filter values and sort tokens come straight from the request. Values are
//! always bound through placeholders, but they are still stripped of SQL
//! metacharacters; sort tokens are matched against a whitelist only after
//! stripping.

/// Characters removed from untrusted input by [`sanitize`]
pub const SQL_METACHARACTERS: &[char] = &['%', '#', '-', '\'', '"', '/', '*'];

/// Remove every SQL metacharacter from `input` and trim surrounding whitespace
///
/// `-` is on the list, so a sort direction prefix or a negative number must be
/// read before calling this.
///
/// # Example
/// ```
/// use webquery::sql::sanitize;
///
/// assert_eq!(sanitize(" name'; --"), "name;");
/// assert_eq!(sanitize("50%"), "50");
/// ```
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !SQL_METACHARACTERS.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Quote a SQL identifier to make it safe for use in queries
///
/// # Arguments
/// * `identifier` - The identifier to quote
///
/// # Returns
/// The identifier wrapped in double quotes with escaped internal quotes
///
/// # Example
/// ```
/// use webquery::sql::quote_identifier;
///
/// let quoted = quote_identifier("my_table");
/// assert_eq!(quoted, "\"my_table\"");
/// ```
pub fn quote_identifier(identifier: &str) -> String {
    // Escape any double quotes in the identifier by doubling them
    let escaped = identifier.replace('"', "\"\"");
    format!("\"{}\"", escaped)
}
