//! Name helpers shared by the loader, templates and routes.

/// Convert a kebab-case component name into its macro identifier.
///
/// Each hyphen-separated word is lowercased and capitalized, then the words are
/// joined and prefixed with `prefix`. Without a prefix the result is camelCase.
///
/// ```text
/// ("", "back-link")      -> "backLink"
/// ("govuk", "back-link") -> "govukBackLink"
/// ```
pub fn component_name_to_macro_name(prefix: &str, component: &str) -> String {
    let words: String = component
        .split('-')
        .filter(|word| !word.is_empty())
        .map(|word| capitalize(&word.to_lowercase()))
        .collect();

    if prefix.is_empty() {
        decapitalize(&words)
    } else {
        format!("{}{}", prefix, words)
    }
}

/// Human-readable title for a component name: every hyphen becomes a space,
/// not only the first one, and the first letter is uppercased.
pub fn titlecase(name: &str) -> String {
    capitalize(&name.replace('-', " "))
}

/// Whether `name` is safe to use as a single path segment for a component or
/// example.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Capitalize first letter of a string.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn decapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
