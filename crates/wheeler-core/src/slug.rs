//! # Slug Derivation
//!
//! Slugs are the stable lookup keys for brands and cars
//! (`GET /api/brand/{slug}`). Names are transliterated to ASCII first
//! (`Citroën` becomes `citroen`). A slug is lowercase ASCII, with every run
//! of non-alphanumeric characters collapsed into a single hyphen and no
//! leading or trailing hyphen.

use deunicode::deunicode;

use crate::error::CoreError;

/// Derive a URL-safe slug from a display name.
///
/// Returns [`CoreError::EmptySlug`] when nothing alphanumeric survives
/// transliteration.
pub fn slugify(name: &str) -> Result<String, CoreError> {
    let ascii = deunicode(name);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_hyphen = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.is_empty() {
        return Err(CoreError::EmptySlug(name.to_string()));
    }
    Ok(slug)
}

/// Like [`slugify`], but falls back to `fallback` (typically the record id)
/// when the name yields no slug.
pub fn slugify_or(name: &str, fallback: &str) -> String {
    slugify(name).unwrap_or_else(|_| fallback.to_string())
}
