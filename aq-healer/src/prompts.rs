use aq_core::HealingRequest;

use crate::classify::FailureKind;

const SYSTEM: &str = "\
You repair a broken element selector in an automated browser test. Prefer selectors in this \
priority order: `data-testid` attributes, then `data-test`, then a stable `id`, then `aria-*` \
attributes, then `name`, then a single class, and only as a last resort a descendant \
combinator. Never propose a `:nth-child` or other positional selector. Respond with a JSON \
object: { \"repaired_selector\": str, \"alternative_selectors\": [str], \"explanation\": str, \
\"confidence\": number in [0,1], \"change_type\": one of \"id_changed\", \"class_changed\", \
\"structure_changed\", \"text_changed\", \"element_removed\", \"element_moved\", \"unknown\", \
\"root_cause\": str }.";

pub fn repair_system_prompt() -> String {
    SYSTEM.to_string()
}

pub fn repair_user_prompt(request: &HealingRequest, kind: FailureKind) -> String {
    let mut lines = vec![
        format!("Failure kind: {kind:?}"),
        format!("Failing selector: {}", request.failing_selector),
        format!("Error message: {}", request.error_message),
        "DOM snippet around the expected element:".to_string(),
        request.dom_snippet.clone(),
    ];
    if let Some(line) = request.failure_line {
        lines.push(format!("Test code failed at line {line}."));
    }
    lines.join("\n")
}

pub fn rewrite_system_prompt() -> String {
    "You rewrite a short snippet of generated test code to use a repaired selector in place of \
     the broken one, changing nothing else about the test's behavior. Respond with a JSON \
     object: { \"rewritten_code\": str }."
        .to_string()
}

pub fn rewrite_user_prompt(test_code: &str, old_selector: &str, new_selector: &str) -> String {
    format!("Original code:\n{test_code}\n\nReplace selector `{old_selector}` with `{new_selector}`.")
}
