/// Escapes a value for embedding inside a generated Rust string literal:
/// backslash and quote first (so later substitutions don't double-escape),
/// then the three whitespace control characters a selector or label could
/// plausibly contain.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'").replace('\n', "\\n").replace('\r', "\\r").replace('\t', "\\t")
}

/// Converts an arbitrary string (URL path, free-text name) into a
/// PascalCase Rust identifier fragment, dropping anything that isn't
/// alphanumeric.
pub fn pascal_case(input: &str) -> String {
    let mut out = String::new();
    let mut capitalize_next = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            if capitalize_next {
                out.extend(ch.to_uppercase());
                capitalize_next = false;
            } else {
                out.push(ch);
            }
        } else {
            capitalize_next = true;
        }
    }
    if out.is_empty() {
        out.push_str("Root");
    }
    out
}

/// Converts an arbitrary string into a snake_case Rust identifier fragment.
pub fn snake_case(input: &str) -> String {
    let mut out = String::new();
    let mut last_was_sep = true;
    for ch in input.chars() {
        if ch.is_alphanumeric() {
            out.extend(ch.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            out.push('_');
            last_was_sep = true;
        }
    }
    let trimmed = out.trim_matches('_').to_string();
    if trimmed.is_empty() {
        "root".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_handles_quotes_and_control_chars() {
        assert_eq!(escape("it's a\ttab\nline"), "it\\'s a\\ttab\\nline");
    }

    #[test]
    fn pascal_case_strips_non_alphanumeric() {
        assert_eq!(pascal_case("/login-page"), "LoginPage");
    }

    #[test]
    fn snake_case_collapses_separators() {
        assert_eq!(snake_case("Checkout / Step 1"), "checkout_step_1");
    }

    #[test]
    fn empty_input_falls_back_to_a_placeholder() {
        assert_eq!(pascal_case("///"), "Root");
        assert_eq!(snake_case("///"), "root");
    }
}
