use url::Url;

const SKIPPED_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "css", "js", "woff", "woff2", "ttf", "eot", "pdf", "zip", "mp4", "mp3"];

const SKIPPED_PATH_PREFIXES: &[&str] = &["/_next/", "/static/", "/assets/", "/__webpack_hmr", "/cdn-cgi/"];

/// Strips fragment and query string so links that only differ by those are
/// treated as the same page for visited-set deduplication purposes.
pub fn normalize_for_dedup(url: &Url) -> String {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized.set_query(None);
    normalized.as_str().trim_end_matches('/').to_string()
}

pub fn same_host(a: &Url, b: &Url) -> bool {
    a.host_str() == b.host_str()
}

pub fn is_crawlable(url: &Url) -> bool {
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let path = url.path().to_ascii_lowercase();
    if SKIPPED_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix)) {
        return false;
    }
    if let Some(ext) = path.rsplit('.').next() {
        if path.contains('.') && SKIPPED_EXTENSIONS.contains(&ext) {
            return false;
        }
    }
    true
}

/// Filters raw href strings against the seed origin, returning only the
/// ones worth enqueueing. Invalid URLs are silently dropped.
pub fn filter_links(seed: &Url, raw_links: &[String], same_origin_only: bool) -> Vec<Url> {
    raw_links
        .iter()
        .filter_map(|href| seed.join(href).ok())
        .filter(|url| !same_origin_only || same_host(seed, url))
        .filter(is_crawlable)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_fragment_and_query() {
        let url = Url::parse("https://x.com/page?x=1#section").unwrap();
        assert_eq!(normalize_for_dedup(&url), "https://x.com/page");
    }

    #[test]
    fn skips_static_assets() {
        let url = Url::parse("https://x.com/logo.png").unwrap();
        assert!(!is_crawlable(&url));
    }

    #[test]
    fn skips_framework_internal_paths() {
        let url = Url::parse("https://x.com/_next/static/chunk.js").unwrap();
        assert!(!is_crawlable(&url));
    }

    #[test]
    fn filter_links_drops_cross_origin_when_same_origin_only() {
        let seed = Url::parse("https://x.com/").unwrap();
        let links = vec!["https://other.com/page".to_string(), "/local".to_string()];
        let filtered = filter_links(&seed, &links, true);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].as_str(), "https://x.com/local");
    }

    #[test]
    fn filter_links_drops_unparseable_hrefs() {
        let seed = Url::parse("https://x.com/").unwrap();
        let links = vec!["javascript:void(0)".to_string()];
        let filtered = filter_links(&seed, &links, true);
        assert!(filtered.is_empty());
    }
}
