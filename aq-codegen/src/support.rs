/// Renders the single support file every generated spec imports: a driver
/// trait abstracting over whatever browser-automation backend the consumer
/// plugs in, plus the assertion helper specs call into.
pub fn render_support_file() -> (String, String) {
    let content = "\
//! Generated support types. Implement `TestDriver` against your browser
//! automation backend of choice; every generated spec is written against
//! this trait alone.

pub type StepResult = Result<(), String>;

pub trait TestDriver {
    fn navigate(&mut self, url: &str) -> StepResult;
    fn click(&mut self, selector: &str) -> StepResult;
    fn fill(&mut self, selector: &str, value: &str) -> StepResult;
    fn select(&mut self, selector: &str, value: &str) -> StepResult;
    fn check(&mut self, selector: &str) -> StepResult;
    fn wait(&mut self, selector: &str) -> StepResult;
    fn hover(&mut self, selector: &str) -> StepResult;
    fn scroll(&mut self, selector: &str) -> StepResult;
    fn screenshot(&mut self, label: &str) -> StepResult;
    fn assert_visible(&mut self, selector: &str) -> StepResult;
    fn assert_hidden(&mut self, selector: &str) -> StepResult;
    fn assert_text_equals(&mut self, selector: &str, expected: &str) -> StepResult;
    fn assert_text_contains(&mut self, selector: &str, expected: &str) -> StepResult;
    fn assert_url_contains(&mut self, fragment: &str) -> StepResult;
    fn assert_attribute_equals(&mut self, selector: &str, expected: &str) -> StepResult;
    fn assert_count(&mut self, selector: &str, expected: &str) -> StepResult;
    fn assert_enabled(&mut self, selector: &str) -> StepResult;
    fn assert_checked(&mut self, selector: &str) -> StepResult;
}
"
    .to_string();
    ("src/support.rs".to_string(), content)
}
