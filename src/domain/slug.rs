//! URL-safe slug derivation for titles and category names.

/// Derive a URL-safe slug from free text.
///
/// Lowercases the input, collapses every run of non-alphanumeric characters
/// into a single `-`, and strips separators from both ends. The function is
/// deterministic and idempotent; it does not guarantee global uniqueness,
/// which callers enforce with an existence check before insert.
///
/// # Examples
/// ```
/// use tastebook::domain::slugify;
///
/// assert_eq!(slugify("Tomato Soup!!"), "tomato-soup");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_separator = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else {
            pending_separator = true;
        }
    }
    slug
}
