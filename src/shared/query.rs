//! Helpers for optional list filters bound into SQL.

/// Trim a filter value, treating blank input as no filter
pub fn normalize_filter(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Substring pattern for `ILIKE`, escaping `%`, `_` and `\`
pub fn like_pattern(value: Option<&str>) -> Option<String> {
    normalize_filter(value).map(|v| {
        let escaped = v
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_filter() {
        assert_eq!(normalize_filter(Some("  Paint ")), Some("Paint".to_string()));
        assert_eq!(normalize_filter(Some("   ")), None);
        assert_eq!(normalize_filter(None), None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(Some("acet")), Some("%acet%".to_string()));
        assert_eq!(like_pattern(Some("50%_a")), Some("%50\\%\\_a%".to_string()));
        assert_eq!(like_pattern(Some("a\\b")), Some("%a\\\\b%".to_string()));
        assert_eq!(like_pattern(Some("")), None);
    }
}
