pub mod annotation;
pub mod book;
pub mod catalog;
pub mod id;

pub use annotation::{Annotation, AnnotationDraft, AnnotationKind, ValidAnnotation};
pub use book::{Book, BookDraft, ValidBook};
pub use catalog::Catalog;
pub use id::EntryId;

/// Read the leading integer of a form field.
///
/// Leading whitespace is skipped and digits are read up to the first
/// non-digit, so `"12 pages"` gives 12. Empty, negative or non-numeric
/// input gives `None`.
pub fn parse_number_prefix(input: &str) -> Option<u32> {
    let digits: String = input
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return None;
    }
    // saturate rather than fail on absurdly long input
    Some(digits.parse::<u64>().map_or(u32::MAX, |n| n.min(u64::from(u32::MAX)) as u32))
}

/// Positive page numbers from a JSON number; everything else is unset
pub(crate) fn clamp_page(raw: Option<f64>) -> Option<u32> {
    let value = raw?.trunc();
    if !value.is_finite() || value < 1.0 {
        return None;
    }
    Some(value.min(f64::from(u32::MAX)) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number_prefix() {
        assert_eq!(parse_number_prefix("42"), Some(42));
        assert_eq!(parse_number_prefix("  7 pages"), Some(7));
        assert_eq!(parse_number_prefix("+3"), Some(3));
        assert_eq!(parse_number_prefix(""), None);
        assert_eq!(parse_number_prefix("abc"), None);
        assert_eq!(parse_number_prefix("-5"), None);
        assert_eq!(parse_number_prefix("99999999999999999999999"), Some(u32::MAX));
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(None), None);
        assert_eq!(clamp_page(Some(0.0)), None);
        assert_eq!(clamp_page(Some(-3.0)), None);
        assert_eq!(clamp_page(Some(12.9)), Some(12));
    }
}
