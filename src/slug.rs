//! URL-safe slugs for client identifiers.

use unicode_normalization::UnicodeNormalization;

/// Convert a string into a slug.
///
/// Applies NFKD normalization and keeps only ASCII, so accented letters fold
/// to their base letter. The result is lowercased, stripped of anything that
/// is not a word character, whitespace or hyphen, runs of whitespace and
/// hyphens collapse into a single hyphen, and leading and trailing hyphens and
/// underscores are trimmed.
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_separator = false;

    let ascii = value.nfkd().filter(char::is_ascii);
    for ch in ascii.map(|c| c.to_ascii_lowercase()) {
        if ch == '-' || ch.is_whitespace() {
            pending_separator = true;
        } else if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_separator {
                slug.push('-');
                pending_separator = false;
            }
            slug.push(ch);
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}
