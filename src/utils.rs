use std::path::Path;

/// Get file extension from path (without the dot, lower-cased)
pub fn get_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// Keep at most `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Replace newlines with spaces so text fits on one line
pub fn flatten_newlines(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

/// Cheap binary-vs-text check: at least 30% of characters are alphanumeric
pub fn is_mostly_alphanumeric(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }
    let alnum = text.chars().filter(|c| c.is_alphanumeric()).count();
    alnum * 10 >= total * 3
}
