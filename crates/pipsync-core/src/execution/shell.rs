//! POSIX shell quoting for commands composed as a single string.

/// Quotes `token` for a POSIX shell when it contains anything outside a
/// conservative safe set. Embedded single quotes become `'"'"'`.
pub fn quote(token: &str) -> String {
    if token.is_empty() {
        return "''".to_string();
    }
    if token.chars().all(is_safe) {
        return token.to_string();
    }
    format!("'{}'", token.replace('\'', r#"'"'"'"#))
}

/// Quotes every token and joins them with single spaces.
pub fn join<'a>(tokens: impl IntoIterator<Item = &'a str>) -> String {
    tokens.into_iter().map(quote).collect::<Vec<_>>().join(" ")
}

fn is_safe(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ':' | '=' | '+' | ',' | '@' | '%')
}
