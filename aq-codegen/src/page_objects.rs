use std::collections::BTreeMap;

use aq_core::TestSuite;

use crate::strings::{escape, pascal_case, snake_case};

/// One rendered page-object source file per unique target page, keyed by
/// the file path it should be written to.
pub fn render_page_objects(suite: &TestSuite) -> Vec<(String, String)> {
    let mut by_url: BTreeMap<String, Vec<(String, String)>> = BTreeMap::new();

    for tc in suite.all_test_cases() {
        let fields = by_url.entry(tc.target_url.clone()).or_default();
        for step in &tc.steps {
            let Some(selector) = step.selector_candidates.first() else { continue };
            let field_name = snake_case(&step.target);
            if !fields.iter().any(|(name, _)| name == &field_name) {
                fields.push((field_name, selector.clone()));
            }
        }
    }

    by_url.into_iter().map(|(url, fields)| render_one(&url, &fields)).collect()
}

fn render_one(url: &str, fields: &[(String, String)]) -> (String, String) {
    let struct_name = format!("{}Page", pascal_case(url));
    let mut body = format!("//! Page object for `{url}`, generated from observed step selectors.\n\npub struct {struct_name};\n\nimpl {struct_name} {{\n");

    for (name, selector) in fields {
        let const_name = name.to_uppercase();
        body.push_str(&format!("    const {const_name}: &'static str = \"{}\";\n", escape(selector)));
    }
    body.push('\n');
    for (name, _) in fields {
        let const_name = name.to_uppercase();
        body.push_str(&format!("    pub fn {name}(&self) -> &'static str {{\n        Self::{const_name}\n    }}\n\n"));
    }
    body.push_str("}\n");

    (format!("src/pages/{}.rs", snake_case(url)), body)
}
