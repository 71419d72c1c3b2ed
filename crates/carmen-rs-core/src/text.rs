//! Small string helpers used by response shaping.

/// Case-insensitive substring test.
pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Lowercase the first character so the text can follow a prefix,
/// leaving the pronoun "I" and its contractions alone.
pub(crate) fn decapitalize(text: &str) -> String {
    let first_word = text
        .split(|ch: char| ch.is_whitespace() || ch == '\'' || ch == '\u{2019}')
        .next()
        .unwrap_or_default()
        .trim_end_matches(|ch: char| ch.is_ascii_punctuation());
    if first_word == "I" {
        return text.to_string();
    }
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => first.to_lowercase().chain(chars).collect(),
        _ => text.to_string(),
    }
}

/// Keep at most the last `max` characters, cutting on a char boundary.
pub(crate) fn tail_chars(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    let skip = count - max;
    match text.char_indices().nth(skip) {
        Some((index, _)) => &text[index..],
        None => text,
    }
}
