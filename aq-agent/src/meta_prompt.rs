use aq_core::CrawlContext;

const UNIVERSAL_RULES: &str = "\
You analyze a single web page (or, for business analysis, a summary of many) as part of an \
autonomous test-generation pipeline. Detect behavior, not keywords: judge an element's role by \
what it does, not by matching strings in its id or class. Elements expressed in any natural \
language are equivalent — a \"Connexion\" button is a login button. Custom elements in a \
single-page application (web components, framework-specific tags) count as first-class \
interactive elements just like native HTML.";

/// Builds the system prompt every agent sends: universal rules, then
/// crawl-wide context, then the agent's own output schema description.
pub struct MetaPromptBuilder<'a> {
    context: &'a CrawlContext,
}

impl<'a> MetaPromptBuilder<'a> {
    pub fn new(context: &'a CrawlContext) -> Self {
        Self { context }
    }

    pub fn build(&self, agent_schema: &str) -> String {
        let mut sections = vec![UNIVERSAL_RULES.to_string(), self.context_section()];
        sections.push(agent_schema.to_string());
        sections.join("\n\n")
    }

    fn context_section(&self) -> String {
        let mut lines = vec![format!("Base URL: {}", self.context.base_url)];
        if let Some(lang) = &self.context.detected_language {
            lines.push(format!("Detected site language: {lang}"));
        }
        if let Some(framework) = &self.context.detected_framework {
            lines.push(format!("Detected framework: {framework}"));
        }
        if !self.context.detected_patterns.is_empty() {
            let mut patterns: Vec<&str> = self.context.detected_patterns.iter().map(String::as_str).collect();
            patterns.sort_unstable();
            lines.push(format!("Previously detected patterns: {}", patterns.join(", ")));
        }
        if !self.context.domain_hints.is_empty() {
            lines.push(format!("Domain hints: {}", self.context.domain_hints.join(", ")));
        }
        lines.join("\n")
    }
}
