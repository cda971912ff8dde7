//! Help text generated from command declarations.

use crate::command::Command;
use crate::registry::CommandRegistry;
use crate::schema::{ArgumentKind, ArgumentSpec};
use std::collections::BTreeMap;
use std::fmt::Write;

const UNCATEGORIZED: &str = "Other";

fn shown_required(spec: &ArgumentSpec) -> bool {
    spec.required
        .as_ref()
        .and_then(|r| r.constant())
        .copied()
        .unwrap_or(false)
}

fn type_label(spec: &ArgumentSpec) -> &str {
    spec.type_name.as_deref().unwrap_or("flag")
}

fn synopsis_part(spec: &ArgumentSpec) -> String {
    let required = shown_required(spec);
    let body = match spec.kind {
        ArgumentKind::Positional => spec.name.clone(),
        ArgumentKind::Option => format!("--{} <{}>", spec.name, type_label(spec)),
        ArgumentKind::Flag => match &spec.short {
            Some(short) => format!("-{}|--{}", short, spec.name),
            None => format!("--{}", spec.name),
        },
        ArgumentKind::Rest { .. } => format!("{}...", spec.name),
    };
    match (spec.kind, required) {
        (ArgumentKind::Option, true) => body,
        (_, true) => format!("<{}>", body),
        (_, false) => format!("[{}]", body),
    }
}

/// One-line invocation summary, e.g. `!roll <sides> [--times <number>] [-q|--quiet]`.
pub fn synopsis(command: &Command, prefix: &str) -> String {
    let mut line = format!("{}{}", prefix, command.path());
    for spec in command.args.iter() {
        line.push(' ');
        line.push_str(&synopsis_part(spec));
    }
    if !command.subs.is_empty() {
        let names: Vec<&str> = command.subs.iter().map(|s| s.name.as_str()).collect();
        line.push_str(&format!(" [{}]", names.join("|")));
    }
    line
}

fn describe_argument(spec: &ArgumentSpec) -> String {
    let mut keys = match spec.kind {
        ArgumentKind::Option | ArgumentKind::Flag => vec![format!("--{}", spec.name)],
        _ => vec![spec.name.clone()],
    };
    keys.extend(spec.aliases.iter().map(|a| format!("--{}", a)));
    if let Some(short) = &spec.short {
        keys.push(format!("-{}", short));
    }

    let mut details = vec![type_label(spec).to_string()];
    if shown_required(spec) {
        details.push("required".into());
    }
    if let Some(default) = spec.default.as_ref().and_then(|d| d.constant()) {
        details.push(format!("default: {}", default));
    }

    let mut line = format!("  {} ({})", keys.join(", "), details.join(", "));
    if let Some(description) = &spec.description {
        line.push_str(&format!(": {}", description));
    }
    line
}

/// Full help for one command.
pub fn usage(command: &Command, prefix: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {}", synopsis(command, prefix));

    if let Some(description) = &command.description {
        let _ = writeln!(out, "\n{}", description);
    }
    if let Some(long) = &command.long_description {
        let _ = writeln!(out, "\n{}", long);
    }
    if !command.aliases.is_empty() {
        let _ = writeln!(out, "\nAliases: {}", command.aliases.join(", "));
    }
    if !command.args.is_empty() {
        let _ = writeln!(out, "\nArguments:");
        for spec in command.args.iter() {
            let _ = writeln!(out, "{}", describe_argument(spec));
        }
    }
    if !command.subs.is_empty() {
        let _ = writeln!(out, "\nSub-commands:");
        for sub in &command.subs {
            let _ = match &sub.description {
                Some(description) => writeln!(out, "  {}: {}", sub.name, description),
                None => writeln!(out, "  {}", sub.name),
            };
        }
    }
    if !command.examples.is_empty() {
        let _ = writeln!(out, "\nExamples:");
        for example in &command.examples {
            let _ = writeln!(out, "  {}{}", prefix, example);
        }
    }

    out.trim_end().to_string()
}

/// Every registered command grouped by category.
pub fn command_list(registry: &CommandRegistry, prefix: &str) -> String {
    let mut groups: BTreeMap<&str, Vec<&Command>> = BTreeMap::new();
    for command in registry.iter() {
        let category = command.category.as_deref().unwrap_or(UNCATEGORIZED);
        groups.entry(category).or_default().push(command.as_ref());
    }

    let mut out = String::new();
    for (category, mut commands) in groups {
        commands.sort_by(|a, b| a.name.cmp(&b.name));
        let _ = writeln!(out, "{}:", category);
        for command in commands {
            let _ = match &command.description {
                Some(description) => writeln!(out, "  {}{}: {}", prefix, command.name, description),
                None => writeln!(out, "  {}{}", prefix, command.name),
            };
        }
    }
    out.trim_end().to_string()
}
