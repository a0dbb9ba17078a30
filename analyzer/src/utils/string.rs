//! String utilities for report rendering

/// Truncate text to `max_len` characters with ellipsis
pub fn truncate_preview(text: &str, max_len: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_len {
        format!("{}...", text.chars().take(max_len).collect::<String>())
    } else {
        text.to_string()
    }
}

/// First `shown` patterns joined by `, `, with a count of the rest
pub fn pattern_preview(patterns: &[String], shown: usize, max_len: usize) -> String {
    let mut preview = patterns
        .iter()
        .take(shown)
        .map(|p| truncate_preview(p, max_len))
        .collect::<Vec<_>>()
        .join(", ");
    if patterns.len() > shown {
        preview.push_str(&format!(" (+{} more)", patterns.len() - shown));
    }
    preview
}

/// Seconds rendered as milliseconds below one second
pub fn format_seconds(seconds: f64) -> String {
    if seconds.abs() < 1.0 {
        format!("{:.1}ms", seconds * 1000.0)
    } else {
        format!("{:.3}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("  /short  ", 10), "/short");
        assert_eq!(truncate_preview("/api/users/profile", 4), "/api...");
        assert_eq!(truncate_preview("/ü/ü/ü", 3), "/ü/...");
    }

    #[test]
    fn test_pattern_preview() {
        let patterns: Vec<String> = ["/u/1", "/u/2", "/u/3", "/u/4"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(pattern_preview(&patterns, 2, 60), "/u/1, /u/2 (+2 more)");
        assert_eq!(pattern_preview(&patterns[..1], 3, 60), "/u/1");
        assert_eq!(pattern_preview(&[], 3, 60), "");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0.1234), "123.4ms");
        assert_eq!(format_seconds(0.0), "0.0ms");
        assert_eq!(format_seconds(2.5), "2.500s");
    }
}
