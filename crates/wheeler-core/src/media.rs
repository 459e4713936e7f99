//! # Media URL Convention
//!
//! Images uploaded to the remote file store are recorded as share links of
//! the form `https://drive.google.com/file/d/<fileId>/view`. Share links are
//! not embeddable, so every reference handed to a client is rewritten into a
//! direct CDN URL:
//!
//! ```text
//! https://lh3.googleusercontent.com/d/<fileId>=w1000?authuser=0
//! ```
//!
//! References that carry no file id (local `/storage/...` paths) pass
//! through unchanged.

/// Host serving the public, embeddable image URLs.
pub const CDN_HOST: &str = "lh3.googleusercontent.com";

/// Extract the file id from a stored share link.
///
/// The id is the path segment directly after a `/d/` segment and must be
/// followed by another `/`. Id characters are ASCII letters, digits, `_`
/// and `-`.
pub fn extract_blob_id(url: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(offset) = url[search_from..].find("/d/") {
        let start = search_from + offset + 3;
        let rest = &url[start..];
        let id_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-')
            .count();
        if id_len > 0 && rest[id_len..].starts_with('/') {
            return Some(&rest[..id_len]);
        }
        search_from = start - 1;
    }
    None
}

/// Build the public CDN URL for a file id.
pub fn to_public_url(id: &str) -> String {
    format!("https://{CDN_HOST}/d/{id}=w1000?authuser=0")
}

/// Rewrite a stored reference into the URL a client should render.
pub fn rewrite_reference(reference: &str) -> String {
    match extract_blob_id(reference) {
        Some(id) => to_public_url(id),
        None => reference.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_share_link() {
        let url = "https://drive.google.com/file/d/1AbC_d-9/view";
        assert_eq!(extract_blob_id(url), Some("1AbC_d-9"));
    }

    #[test]
    fn requires_trailing_slash_after_id() {
        assert_eq!(extract_blob_id("https://drive.google.com/file/d/abc"), None);
    }

    #[test]
    fn skips_unterminated_match_and_finds_later_one() {
        let url = "https://host/d/?x/d/real-id/view";
        assert_eq!(extract_blob_id(url), Some("real-id"));
    }

    #[test]
    fn local_paths_have_no_id() {
        assert_eq!(extract_blob_id("/storage/brands/tata.png"), None);
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(extract_blob_id("https://host/d//view"), None);
    }

    #[test]
    fn public_url_template() {
        assert_eq!(
            to_public_url("xyz"),
            "https://lh3.googleusercontent.com/d/xyz=w1000?authuser=0"
        );
    }

    #[test]
    fn rewrite_share_link() {
        let rewritten = rewrite_reference("https://drive.google.com/file/d/F1/view");
        assert_eq!(rewritten, to_public_url("F1"));
    }

    #[test]
    fn rewrite_leaves_local_paths_alone() {
        assert_eq!(
            rewrite_reference("/storage/cars/1700000000000-front.jpg"),
            "/storage/cars/1700000000000-front.jpg"
        );
    }

    #[test]
    fn rewrite_is_stable_on_public_urls() {
        let public = to_public_url("F1");
        assert_eq!(rewrite_reference(&public), public);
    }
}
