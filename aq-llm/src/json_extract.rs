/// Extract a JSON object/array from free-form model text.
///
/// Tries, in order: the whole trimmed text as raw JSON, a fenced code block
/// (`` ```json `` or bare `` ``` ``), then the largest balanced `{}`/`[]`
/// span found anywhere in the text. The balanced-span scan tracks string
/// escapes and nesting depth so a brace inside a quoted string never closes
/// a span early.
pub fn extract_json(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if looks_like_json(trimmed) {
        return Some(trimmed);
    }
    if let Some(fenced) = extract_fenced(text) {
        if looks_like_json(fenced.trim()) {
            return Some(fenced.trim());
        }
    }
    largest_balanced_span(text)
}

fn looks_like_json(s: &str) -> bool {
    matches!(s.as_bytes().first(), Some(b'{') | Some(b'['))
}

fn extract_fenced(text: &str) -> Option<&str> {
    let start_marker_json = "```json";
    let start_marker_bare = "```";

    let (body_start, marker_len) = if let Some(pos) = text.find(start_marker_json) {
        (pos, start_marker_json.len())
    } else {
        text.find(start_marker_bare).map(|pos| (pos, start_marker_bare.len()))?
    };

    let after_marker = body_start + marker_len;
    let rest = &text[after_marker..];
    let end = rest.find("```")?;
    Some(&rest[..end])
}

/// Scan the whole text for every balanced `{...}`/`[...]` span and return
/// the longest one. Returns `None` if no balanced span exists.
fn largest_balanced_span(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut best: Option<(usize, usize)> = None;

    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == b'{' || c == b'[' {
            if let Some(end) = find_matching_close(bytes, i) {
                let len = end - i + 1;
                let better = match best {
                    Some((bs, be)) => len > (be - bs + 1),
                    None => true,
                };
                if better {
                    best = Some((i, end));
                }
            }
        }
        i += 1;
    }

    best.map(|(start, end)| &text[start..=end])
}

fn find_matching_close(bytes: &[u8], open_idx: usize) -> Option<usize> {
    let open = bytes[open_idx];
    let close = if open == b'{' { b'}' } else { b']' };
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    let mut i = open_idx;
    while i < bytes.len() {
        let c = bytes[i];
        if in_string {
            if escaped {
                escaped = false;
            } else if c == b'\\' {
                escaped = true;
            } else if c == b'"' {
                in_string = false;
            }
        } else {
            match c {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => {
                    depth -= 1;
                    if depth == 0 {
                        return if c == close { Some(i) } else { None };
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    None
}
