use serde_json::Value;

/// Lowercase, with whitespace, `_` and `-` stripped.
pub fn normalize_tool_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Shorten `text` to at most `max` characters by cutting out the middle.
///
/// Budgets of 8 or less are too small for an ellipsis and get a plain cut.
pub fn truncate_middle(text: &str, max: usize) -> String {
    let text = text.trim();
    let len = text.chars().count();
    if len <= max {
        return text.to_string();
    }
    if max <= 8 {
        return text.chars().take(max).collect();
    }

    let head = (max - 3).div_ceil(2);
    let tail = (max - 3) / 2;
    let mut out: String = text.chars().take(head).collect();
    out.push_str("...");
    out.extend(text.chars().skip(len - tail));
    out
}

/// First of `keys` holding a non-blank string, trimmed.
pub fn pick_first_str<'a>(input: &'a Value, keys: &[&str]) -> Option<&'a str> {
    let object = input.as_object()?;
    keys.iter().find_map(|key| {
        object
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}
