pub mod args;
pub mod context;
pub mod errors;
pub mod merge;
pub mod render;
pub mod retyper;
pub mod settings;
pub mod typer;
pub mod value;

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use errors::Result;
use retyper::RetypeOptions;
use settings::Settings;
use value::Value;

/// Build the finalized context for one render invocation: parse the
/// variable tokens, retype with single-element collapsing, merge loaded
/// config defaults underneath, then inject the process environment.
/// Returns the context together with the positional template references.
pub fn build_context(
    settings: &Settings,
    tokens: &[String],
) -> Result<(BTreeMap<String, Value>, Vec<String>)> {
    let parsed = args::parse_tokens(tokens, settings);
    let mut ctx = retyper::retype_map(
        parsed.context.into_map(),
        RetypeOptions { collapse_single: true },
        &settings.time_format,
    );

    let defaults = settings.load_config()?;
    if ctx.is_empty() && defaults.is_empty() {
        warn!("no variables provided");
    }
    merge::merge_defaults(&mut ctx, defaults);

    // CLI and config keys win over the injected environment.
    if let Some((name, env)) = settings.environment_value() {
        ctx.entry(name).or_insert(env);
    }

    if settings.debugging {
        match serde_json::to_string_pretty(&ctx) {
            Ok(dump) => debug!("context: {dump}"),
            Err(_) => debug!(?ctx, "context"),
        }
    }

    Ok((ctx, parsed.templates))
}

/// Run a whole invocation and return the aggregate exit status. When no
/// template is named and stdin was not requested, a conventionally named
/// template in the working directory is used if one exists.
pub fn run(settings: &Settings, tokens: &[String]) -> Result<i32> {
    let (ctx, mut templates) = build_context(settings, tokens)?;

    if templates.is_empty() && !settings.stdin {
        if let Some(found) = render::find_template(Path::new("."), &discovery_bases()) {
            info!(template = %found, "using discovered template");
            templates.push(found);
        }
    }

    Ok(render::render_all(settings, &ctx, &templates))
}

// The working directory's own name, then the tool name.
fn discovery_bases() -> Vec<String> {
    let mut bases = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(name) = cwd.file_name().and_then(|n| n.to_str()) {
            bases.push(name.to_string());
        }
    }
    bases.push("tvr".to_string());
    bases
}
