use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use minijinja::{Environment, UndefinedBehavior};
use tracing::{debug, error};

use crate::settings::Settings;
use crate::value::Value;

/// Per-file outcome. Codes combine across files with bitwise OR into the
/// process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Ok,
    OpenFailed,
    ReadFailed,
    ParseFailed,
    ExecFailed,
    Faulted,
}

impl FileStatus {
    pub fn code(self) -> i32 {
        match self {
            FileStatus::Ok => 0,
            FileStatus::OpenFailed => 1,
            FileStatus::ReadFailed => 2,
            FileStatus::ParseFailed => 4,
            FileStatus::ExecFailed => 8,
            FileStatus::Faulted => 15,
        }
    }
}

// The policy string is pass-through configuration; this mapping is the
// only place the renderer consumes it.
fn undefined_behavior(policy: &str) -> UndefinedBehavior {
    match policy {
        "error" => UndefinedBehavior::Strict,
        "zero" => UndefinedBehavior::Lenient,
        _ => UndefinedBehavior::Chainable,
    }
}

/// Render every template file sequentially against one finalized context.
/// Faults are isolated per file; remaining files still render. Returns the
/// aggregate status.
pub fn render_all(
    settings: &Settings,
    context: &BTreeMap<String, Value>,
    templates: &[String],
) -> i32 {
    let engine_context = minijinja::Value::from_serialize(context);

    // No template references means the template arrives on stdin. Named
    // files always render, whether or not --stdin was passed.
    let files: Vec<String> = if templates.is_empty() {
        vec![String::new()]
    } else {
        templates.to_vec()
    };

    let mut status = 0;
    for file in &files {
        status |= render_one(settings, &engine_context, file).code();
    }
    status
}

/// Look in `dir` for a conventionally named template: `{base}.tmpl` or a
/// dotfile form, optionally with a content extension before the template
/// suffix (for example `svc.yaml.tmpl`). Bases are tried in order; the
/// first existing candidate wins.
pub fn find_template(dir: &Path, bases: &[String]) -> Option<String> {
    const CONTENT: [&str; 6] = ["", ".yaml", ".json", ".html", ".txt", ".xml"];
    const SUFFIX: [&str; 2] = [".tmpl", ".tpl"];

    for base in bases {
        for content in CONTENT {
            for suffix in SUFFIX {
                for name in [
                    format!("{base}{content}{suffix}"),
                    format!(".{base}{content}{suffix}"),
                ] {
                    let candidate = dir.join(&name);
                    if candidate.is_file() {
                        return Some(candidate.to_string_lossy().into_owned());
                    }
                }
            }
        }
    }
    None
}

fn render_one(settings: &Settings, context: &minijinja::Value, file: &str) -> FileStatus {
    let source = if file.is_empty() {
        debug!("source: stdin");
        let mut text = String::new();
        match io::stdin().read_to_string(&mut text) {
            Ok(_) => text,
            Err(err) => {
                error!(%err, "reading stdin");
                return FileStatus::ReadFailed;
            }
        }
    } else {
        let mut handle = match fs::File::open(file) {
            Ok(handle) => handle,
            Err(err) => {
                error!(file, %err, "opening template");
                return FileStatus::OpenFailed;
            }
        };
        let mut text = String::new();
        if let Err(err) = handle.read_to_string(&mut text) {
            error!(file, %err, "reading template");
            return FileStatus::ReadFailed;
        }
        text
    };

    match render_source(settings, context, file, &source) {
        Ok(rendered) => {
            if let Err(err) = write_output(settings.output.as_deref(), &rendered) {
                error!(%err, "writing output");
                return FileStatus::ExecFailed;
            }
            FileStatus::Ok
        }
        Err(status) => status,
    }
}

/// Parse and execute one template source against the serialized context.
/// A panic inside the engine is confined here and reported as a fault;
/// it never unwinds across file boundaries.
pub fn render_source(
    settings: &Settings,
    context: &minijinja::Value,
    name: &str,
    source: &str,
) -> Result<String, FileStatus> {
    let mut env = Environment::new();
    env.set_undefined_behavior(undefined_behavior(&settings.missing_key));

    let template = match env.template_from_str(source) {
        Ok(template) => template,
        Err(err) => {
            error!(name, %err, "parsing template");
            return Err(FileStatus::ParseFailed);
        }
    };

    match panic::catch_unwind(AssertUnwindSafe(|| template.render(context))) {
        Ok(Ok(rendered)) => Ok(rendered),
        Ok(Err(err)) => {
            error!(name, %err, "executing template");
            Err(FileStatus::ExecFailed)
        }
        Err(_) => {
            error!(name, "trapped fault while executing template");
            Err(FileStatus::Faulted)
        }
    }
}

// Rendered text goes out raw on both paths; the template controls any
// trailing newline.
fn write_output(output: Option<&Path>, rendered: &str) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, rendered),
        None => io::stdout().write_all(rendered.as_bytes()),
    }
}
