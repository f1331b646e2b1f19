//! SQL identifier utilities
//!
//! The ledger's schema and table names come from user configuration and end
//! up in dynamically built statements, so they are validated up front and
//! always quoted when interpolated.

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and escapes any embedded double quotes
/// by doubling them.
///
/// # Examples
/// ```
/// use gran_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a `schema.table` pair.
///
/// # Examples
/// ```
/// use gran_core::sql_utils::quote_pair;
/// assert_eq!(quote_pair("main", "__migration_history"), r#""main"."__migration_history""#);
/// ```
pub fn quote_pair(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

/// Whether `ident` is a plain identifier: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_valid_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
