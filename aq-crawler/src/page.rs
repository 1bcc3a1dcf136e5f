use std::time::Duration;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Raw output of crawling one page, before any agent has looked at it.
/// Owns its screenshot buffer until the orchestrator hands it to an agent.
#[derive(Debug, Clone)]
pub struct CrawledPage {
    pub url: String,
    pub title: String,
    pub html: String,
    pub screenshot: Option<Vec<u8>>,
    pub dom_fingerprint: String,
    pub load_latency: Duration,
    pub depth: u32,
    pub discovered_at: DateTime<Utc>,
}

/// Hashes the serialized DOM so repeated crawls (or post-healing re-checks)
/// can tell whether a page's markup has actually changed.
pub fn fingerprint(html: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(html.as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_for_identical_html() {
        assert_eq!(fingerprint("<html></html>"), fingerprint("<html></html>"));
    }

    #[test]
    fn fingerprint_changes_with_content() {
        assert_ne!(fingerprint("<html>a</html>"), fingerprint("<html>b</html>"));
    }
}
