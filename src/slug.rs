//! URL slug generation.
//!
//! Slugs are the public path segment of a post (`/blog/<slug>`), so they are
//! restricted to lower-case ASCII letters, digits and single hyphens.

/// Normalize arbitrary text into a path segment.
///
/// Runs of characters that are neither letters nor digits (`_` included)
/// become one hyphen, letters are transliterated to ASCII, anything left outside
/// `[A-Za-z0-9_-]` is dropped, hyphens are trimmed and collapsed and the
/// result is lower-cased. Returns an empty string when the input has no
/// alphanumeric content.
pub fn slugify(text: &str) -> String {
    let mut ascii = String::with_capacity(text.len());
    let mut in_gap = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            in_gap = false;
            if c.is_ascii() {
                ascii.push(c);
            } else {
                ascii.push_str(deunicode::deunicode_char(c).unwrap_or(""));
            }
        } else if !in_gap {
            in_gap = true;
            ascii.push('-');
        }
    }

    let mut slug = String::with_capacity(ascii.len());
    for c in ascii
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
    {
        if c == '-' && (slug.is_empty() || slug.ends_with('-')) {
            continue;
        }
        slug.push(c.to_ascii_lowercase());
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Resolve a slug against the ones already in use by appending `-2`, `-3`,
/// ... until it is free.
pub fn unique_slug<F>(base: &str, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    if !is_taken(base) {
        return base.to_owned();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_owned())
}
