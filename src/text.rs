//! Case- and punctuation-insensitive phrase matching shared by the query
//! parser and the store's name index.

/// Lowercases, drops apostrophes, and turns every other non-alphanumeric
/// run into a single space.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch == '\'' || ch == '\u{2019}' {
            continue;
        }
        if ch.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.extend(ch.to_lowercase());
        } else {
            pending_space = true;
        }
    }
    out
}

/// Byte offset of `phrase` in `haystack` on word boundaries.
///
/// Both arguments must already be normalized.
pub fn find_phrase(haystack: &str, phrase: &str) -> Option<usize> {
    if phrase.is_empty() {
        return None;
    }
    let mut from = 0;
    while let Some(pos) = haystack[from..].find(phrase) {
        let start = from + pos;
        let end = start + phrase.len();
        let starts_word = start == 0 || haystack.as_bytes()[start - 1] == b' ';
        let ends_word = end == haystack.len() || haystack.as_bytes()[end] == b' ';
        if starts_word && ends_word {
            return Some(start);
        }
        from = start + 1;
        while !haystack.is_char_boundary(from) {
            from += 1;
        }
    }
    None
}

pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    find_phrase(haystack, phrase).is_some()
}
