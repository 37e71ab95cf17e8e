//! Pluralized counts for summary lines.

/// Format `count` with `noun`, adding an `s` unless the count is one.
///
/// - `plural_count(0, "image")` -> `"0 images"`
/// - `plural_count(1, "image")` -> `"1 image"`
#[inline]
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "image"), "0 images");
        assert_eq!(plural_count(1, "image"), "1 image");
        assert_eq!(plural_count(3, "error"), "3 errors");
        assert_eq!(plural_count(2, "code file"), "2 code files");
    }
}
