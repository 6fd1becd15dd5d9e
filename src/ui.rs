use colored::Colorize;
use declarative::{Object, Outcome};
use serde::Serialize;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a value as pretty JSON on stdout
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Pretty JSON of an object; empty objects render as nothing
fn pretty(object: &Object) -> String {
    if object.is_empty() {
        return String::new();
    }
    serde_json::to_string_pretty(object).map_or_else(|_| String::new(), |s| s + "\n")
}

/// Changed lines between two objects, `-`/`+` prefixed
pub fn diff_lines(before: &Object, after: &Object) -> Vec<String> {
    let before = pretty(before);
    let after = pretty(after);
    let diff = similar::TextDiff::from_lines(&before, &after);

    diff.iter_all_changes()
        .filter_map(|change| {
            let line = change.to_string_lossy();
            let line = line.trim_end_matches('\n');
            match change.tag() {
                similar::ChangeTag::Delete => Some(format!("- {line}")),
                similar::ChangeTag::Insert => Some(format!("+ {line}")),
                similar::ChangeTag::Equal => None,
            }
        })
        .collect()
}

/// Print the before/after diff of an outcome
pub fn print_diff(outcome: &Outcome) {
    let lines = diff_lines(&outcome.diff.before, &outcome.diff.after);
    if lines.is_empty() {
        dim("(no differences)");
        return;
    }
    for line in lines {
        if line.starts_with('-') {
            println!("    {}", line.red());
        } else {
            println!("    {}", line.green());
        }
    }
}

/// Print one task result
pub fn print_outcome(label: &str, outcome: &Outcome, check: bool) {
    let id = outcome.id.as_deref().unwrap_or("-");
    let line = format!("{label}: {} ({id})", outcome.msg);
    match (outcome.changed, check) {
        (true, true) => println!("{} {}", "~".yellow(), line),
        (true, false) => println!("{} {}", "✓".green(), line),
        (false, _) => println!("{} {}", "=".dimmed(), line.dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: serde_json::Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_diff_lines_changed_field() {
        let before = object(json!({"name": "v", "comment": "old"}));
        let after = object(json!({"name": "v", "comment": "new"}));
        let lines = diff_lines(&before, &after);
        assert_eq!(
            lines,
            vec![
                "-   \"comment\": \"old\"".to_string(),
                "+   \"comment\": \"new\"".to_string()
            ]
        );
    }

    #[test]
    fn test_diff_lines_identical() {
        let object = object(json!({"name": "v"}));
        assert!(diff_lines(&object, &object).is_empty());
    }

    #[test]
    fn test_diff_lines_delete() {
        let before = object(json!({"id": "dns/view/1"}));
        let lines = diff_lines(&before, &Object::new());
        assert!(lines.iter().all(|line| line.starts_with('-')));
        assert_eq!(lines.len(), 3);
    }
}
