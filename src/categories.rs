//! Category name → site filter codes.

/// Category names accepted by [`category_codes`], with their filter codes.
///
/// A category may carry zero, one, or several codes.
pub static SUPPORTED_CATEGORIES: [(&str, &[&str]); 7] = [
    ("all", &[]),
    ("movies", &["Movies"]),
    ("tv", &["TV"]),
    ("music", &["Music"]),
    ("games", &["Games"]),
    ("anime", &["Anime"]),
    ("software", &["65", "18", "19", "20"]),
];

/// Filter codes for a category name. Unknown names map to no filter.
#[must_use]
pub fn category_codes(category: &str) -> &'static [&'static str] {
    SUPPORTED_CATEGORIES
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, codes)| *codes)
        .unwrap_or_default()
}

/// Category names in display order.
pub fn supported_categories() -> impl Iterator<Item = &'static str> {
    SUPPORTED_CATEGORIES.iter().map(|(name, _)| *name)
}
