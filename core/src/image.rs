/// Turn a post's `image_ref` into a URL a browser can load.
///
/// Absolute `http(s)` references and refs with no base pass through untouched.
/// Relative ones are joined onto `base`; when the base is a GitHub `/blob/`
/// page URL the joined result is rewritten to `/raw/` so it serves bytes.
pub fn resolve_image_url(base: Option<&str>, image_ref: &str) -> String {
    let image_ref = image_ref.trim();
    if is_absolute(image_ref) {
        return image_ref.to_string();
    }
    let Some(base) = base.map(str::trim).filter(|b| !b.is_empty()) else {
        return image_ref.to_string();
    };
    let url = format!("{}/{}", base.trim_end_matches('/'), image_ref.trim_start_matches('/'));
    if url.contains("://github.com/") {
        url.replacen("/blob/", "/raw/", 1)
    } else {
        url
    }
}

fn is_absolute(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_relative_refs_onto_github_raw() {
        let url = resolve_image_url(Some("https://github.com/acme/travel/blob/main/"), "/images/paris.jpg");
        assert_eq!(url, "https://github.com/acme/travel/raw/main/images/paris.jpg");
    }

    #[test]
    fn absolute_refs_pass_through() {
        assert_eq!(resolve_image_url(Some("https://cdn.test"), "https://img.test/a.jpg"), "https://img.test/a.jpg");
    }

    #[test]
    fn absolute_github_blob_ref_is_left_alone() {
        let blob = "https://github.com/a/b/blob/main/x.jpg";
        assert_eq!(resolve_image_url(None, blob), blob);
        assert_eq!(resolve_image_url(Some("https://github.com/a/b/blob/main"), blob), blob);
    }

    #[test]
    fn no_base_keeps_ref() {
        assert_eq!(resolve_image_url(None, "images/a.jpg"), "images/a.jpg");
        assert_eq!(resolve_image_url(Some("  "), "images/a.jpg"), "images/a.jpg");
    }
}
