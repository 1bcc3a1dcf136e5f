use regex::RegexSet;

/// The kind of failure a test run reported, classified from its error
/// message alone so a repair request can be prioritized and explained
/// without re-running the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Selector,
    Timeout,
    Assertion,
    Navigation,
    Visual,
    Network,
    Unknown,
}

/// Patterns are matched in this order; the first set member to match wins,
/// so more specific patterns (e.g. "assertion" before the generic
/// "not found") must be listed first where they could otherwise collide.
fn patterns() -> &'static RegexSet {
    use std::sync::OnceLock;
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new([
            r"(?i)assert(ion)?\s+failed|expected .* but (got|found)",
            r"(?i)timed?\s*out|timeout",
            r"(?i)no\s+such\s+element|element\s+not\s+found|selector.*not\s+found|could\s+not\s+locate",
            r"(?i)navigation\s+failed|failed\s+to\s+navigate|page\s+crashed",
            r"(?i)screenshot\s+mismatch|visual\s+diff|pixel\s+difference",
            r"(?i)connection\s+(refused|reset)|dns|network\s+error|econnrefused|net::err",
        ])
        .expect("failure classification patterns are valid regexes")
    })
}

/// Classifies a failure's error message by pattern match. The order above
/// resolves ambiguous messages (e.g. an assertion message that also
/// mentions "not found" is still an assertion failure).
pub fn classify(error_message: &str) -> FailureKind {
    let matches = patterns().matches(error_message);
    if matches.matched(0) {
        FailureKind::Assertion
    } else if matches.matched(1) {
        FailureKind::Timeout
    } else if matches.matched(2) {
        FailureKind::Selector
    } else if matches.matched(3) {
        FailureKind::Navigation
    } else if matches.matched(4) {
        FailureKind::Visual
    } else if matches.matched(5) {
        FailureKind::Network
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_selector_not_found() {
        assert_eq!(classify("no such element: Unable to locate element: {\"method\":\"css selector\"}"), FailureKind::Selector);
    }

    #[test]
    fn classifies_timeout() {
        assert_eq!(classify("waiting for selector '#submit' timed out after 30000ms"), FailureKind::Timeout);
    }

    #[test]
    fn classifies_assertion_over_generic_not_found_wording() {
        assert_eq!(classify("assertion failed: expected text 'Welcome' but found 'Error'"), FailureKind::Assertion);
    }

    #[test]
    fn classifies_network_error() {
        assert_eq!(classify("net::ERR_CONNECTION_REFUSED at https://example.com"), FailureKind::Network);
    }

    #[test]
    fn unrecognized_message_is_unknown() {
        assert_eq!(classify("something unexpected happened"), FailureKind::Unknown);
    }
}
