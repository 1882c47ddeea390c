//! Table formatting utilities for CLI output.

/// Truncates a string to `max_len` characters, adding "..." if needed.
///
/// ```rust
/// use appcat_cli::presentation::truncate_string;
///
/// assert_eq!(truncate_string("comet", 10), "comet");
/// assert_eq!(truncate_string("comet.sdsc.edu", 8), "comet...");
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format an optional value for table display.
pub fn format_optional<T: std::fmt::Display>(value: Option<&T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_format_optional() {
        assert_eq!(format_optional(Some(&"2024.1"), "--"), "2024.1");
        assert_eq!(format_optional::<String>(None, "--"), "--");
    }
}
