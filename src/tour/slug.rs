/// Lowercased, hyphen-joined, ASCII form of a tour name.
///
/// Non-ASCII letters are transliterated first (`é` to `e`, `ß` to `ss`); anything
/// still outside the URL unreserved set is dropped. The output is its own slug.
#[must_use]
pub fn derive_slug(name: &str) -> String {
    deunicode::deunicode(name)
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| c.to_ascii_lowercase())
                .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
                .collect::<String>()
        })
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
