//! File name handling for uploads.

/// Reduce a client-supplied file name to a safe single path component.
///
/// Directory parts are dropped, characters outside `[A-Za-z0-9._-]` become
/// `_`, and leading dots are stripped so the result can never be `..` or a
/// hidden file. An empty result falls back to `upload`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Prefix a sanitised file name with a millisecond timestamp so repeated
/// uploads of `front.jpg` do not overwrite each other.
pub fn timestamped_name(unix_millis: i64, original: &str) -> String {
    format!("{unix_millis}-{}", sanitize_file_name(original))
}
