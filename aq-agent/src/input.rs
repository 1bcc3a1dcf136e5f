use aq_core::CrawlContext;

/// Everything an agent needs about one page. Agents borrow this and the
/// crawl context; they hold no state of their own across calls.
pub struct AgentInput<'a> {
    pub url: String,
    pub title: String,
    pub html: String,
    pub screenshot: Option<Vec<u8>>,
    pub context: &'a CrawlContext,
}

impl<'a> AgentInput<'a> {
    pub fn new(url: impl Into<String>, title: impl Into<String>, html: impl Into<String>, context: &'a CrawlContext) -> Self {
        Self { url: url.into(), title: title.into(), html: html.into(), screenshot: None, context }
    }

    pub fn with_screenshot(mut self, bytes: Vec<u8>) -> Self {
        self.screenshot = Some(bytes);
        self
    }

    pub fn user_prompt(&self) -> String {
        format!("URL: {}\nTitle: {}\n\nHTML:\n{}", self.url, self.title, truncate(&self.html, 20_000))
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
