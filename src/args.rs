use tracing::debug;

use crate::context::Context;
use crate::settings::Settings;
use crate::typer;
use crate::value::Value;

/// Result of walking the raw argument tokens: the context built from the
/// variable flags, plus the positional template references in order.
#[derive(Debug, Default)]
pub struct ParsedArgs {
    pub context: Context,
    pub templates: Vec<String>,
}

/// Walk the ordered token list. Variable flags (`-name`, `--name`,
/// `--name=value`) write into the context; the capitalize toggle flips
/// parser-local state that affects only later tokens; everything else is
/// collected as a template file reference.
pub fn parse_tokens(tokens: &[String], settings: &Settings) -> ParsedArgs {
    let mut out = ParsedArgs::default();
    let mut capitalize = settings.capitalize;

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if token == "-c" || token == "-C" || token == "--capitalize" {
            capitalize = !capitalize;
            debug!(capitalize, "toggled segment capitalization");
            continue;
        }
        if !token.starts_with('-') {
            out.templates.push(token.clone());
            continue;
        }
        if let Some((path, value)) = parse_flag(token, capitalize, &settings.time_format) {
            debug!(path = ?path, value = ?value, "variable flag");
            out.context.set(&path, value);
        }
    }
    out
}

/// Split one flag token into a dotted path and a typed value. A flag with
/// no `=` is the boolean true; otherwise the value text goes through the
/// type inferencer.
fn parse_flag(token: &str, capitalize: bool, time_format: &str) -> Option<(Vec<String>, Value)> {
    let stripped = token.trim_start_matches('-');
    if stripped.is_empty() {
        return None;
    }
    let (name, raw_value) = match stripped.split_once('=') {
        Some((name, raw)) => (name, Some(raw)),
        None => (stripped, None),
    };
    if name.is_empty() {
        return None;
    }
    let path = name
        .split('.')
        .map(|segment| {
            if capitalize {
                title_case(segment)
            } else {
                segment.to_string()
            }
        })
        .collect();
    let value = match raw_value {
        Some(raw) => typer::infer(raw, time_format),
        None => Value::Bool(true),
    };
    Some((path, value))
}

// First letter uppercase, remainder lowercase, applied per segment.
fn title_case(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}
