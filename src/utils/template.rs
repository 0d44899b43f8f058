//! String template rendering utilities.
//!
//! Templates use `{{name}}` placeholders. Rendering is plain substitution;
//! `unresolved` reports placeholders that no variable filled.

use regex::Regex;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

pub fn render(template: &str, variables: &[(&str, &str)]) -> String {
    let mut result = template.to_string();

    for (key, value) in variables {
        let placeholder = format!("{{{{{}}}}}", key);
        result = result.replace(&placeholder, value);
    }

    result
}

/// Names of placeholders still present in `rendered`, in order of first appearance.
pub fn unresolved(rendered: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(rendered) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_every_occurrence() {
        let out = render("{{a}} and {{a}} then {{b}}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and x then y");
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let out = render("{{a}} {{missing}}", &[("a", "x")]);
        assert_eq!(out, "x {{missing}}");
    }

    #[test]
    fn unresolved_lists_leftover_names_once() {
        let names = unresolved("{{one}} {{ two }} {{one}} struct{}");
        assert_eq!(names, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn go_braces_are_not_placeholders() {
        assert!(unresolved("map[int]*User{} func() {}").is_empty());
    }
}
