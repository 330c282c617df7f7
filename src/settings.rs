use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::{debug, error, warn};

use crate::errors::{RenderError, Result};
use crate::merge;
use crate::retyper::{self, RetypeOptions};
use crate::value::Value;

/// Timestamp format tried by the type inferencer unless overridden.
pub const DEFAULT_TIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// Config file tried when none is named on the command line. Missing is
/// fine in that case; a file named explicitly must exist.
pub const DEFAULT_CONFIG_FILE: &str = ".tvr.yaml";

/// Missing-key policies accepted for pass-through to the template engine.
pub const MISSING_KEY_POLICIES: [&str; 4] = ["default", "zero", "error", "invalid"];

/// Per-invocation configuration, carried explicitly through the pipeline.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Initial state of the segment-capitalization toggle.
    pub capitalize: bool,
    /// Missing-key policy handed to the engine, not interpreted here.
    pub missing_key: String,
    pub time_format: String,
    /// Context key for the injected process environment; empty disables.
    pub environment: String,
    pub config_files: Vec<PathBuf>,
    pub output: Option<PathBuf>,
    pub stdin: bool,
    pub verbose: bool,
    pub debugging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            capitalize: true,
            missing_key: "error".to_string(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            environment: "env".to_string(),
            config_files: Vec::new(),
            output: None,
            stdin: false,
            verbose: false,
            debugging: false,
        }
    }
}

impl Settings {
    /// Reset an unrecognized missing-key policy to "error".
    pub fn validate_missing_key(&mut self) {
        if !MISSING_KEY_POLICIES.contains(&self.missing_key.as_str()) {
            error!(policy = %self.missing_key, "resetting invalid missingkey policy");
            self.missing_key = "error".to_string();
        }
    }

    /// Load the configured YAML documents and combine them into one
    /// defaults map (earlier files win, same non-destructive rule as the
    /// context merge). Loaded documents are retyped without collapsing so
    /// their string leaves come back typed.
    pub fn load_config(&self) -> Result<BTreeMap<String, Value>> {
        let (files, defaulted) = if self.config_files.is_empty() {
            (vec![PathBuf::from(DEFAULT_CONFIG_FILE)], true)
        } else {
            (self.config_files.clone(), false)
        };

        let mut combined = BTreeMap::new();
        for path in files {
            let text = match fs::read_to_string(&path) {
                Ok(text) => text,
                Err(source) => {
                    if defaulted {
                        debug!(path = %path.display(), "no default config file");
                        continue;
                    }
                    return Err(RenderError::ConfigLoad { path, source });
                }
            };
            let doc: serde_yaml::Value = serde_yaml::from_str(&text).map_err(|source| {
                RenderError::ConfigParse {
                    path: path.clone(),
                    source,
                }
            })?;
            let loaded = match from_yaml(doc) {
                Value::Map(m) => m,
                other => {
                    warn!(path = %path.display(), kind = ?other.kind(), "ignoring non-mapping config document");
                    continue;
                }
            };
            debug!(path = %path.display(), "loaded config");
            let loaded = retyper::retype_map(loaded, RetypeOptions::default(), &self.time_format);
            merge::merge_defaults(&mut combined, loaded);
        }
        Ok(combined)
    }

    /// The flat process environment under the configured key name.
    /// Entries that are not valid Unicode are decoded lossily rather than
    /// aborting the run.
    pub fn environment_value(&self) -> Option<(String, Value)> {
        if self.environment.is_empty() {
            return None;
        }
        let map = std::env::vars_os()
            .map(|(k, v)| {
                (
                    k.to_string_lossy().into_owned(),
                    Value::Str(v.to_string_lossy().into_owned()),
                )
            })
            .collect();
        Some((self.environment.clone(), Value::Map(map)))
    }
}

/// Convert a decoded YAML document into a context value. Mapping keys are
/// stringified through their default textual form, numbers widen to i64
/// where they fit, and tagged values unwrap to their payload. String
/// leaves stay untyped here; the retyping pass infers them.
pub fn from_yaml(doc: serde_yaml::Value) -> Value {
    match doc {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float(f)
            } else {
                Value::Str(n.to_string())
            }
        }
        serde_yaml::Value::String(s) => Value::Str(s),
        serde_yaml::Value::Sequence(xs) => Value::List(xs.into_iter().map(from_yaml).collect()),
        serde_yaml::Value::Mapping(m) => Value::Map(
            m.into_iter()
                .map(|(key, value)| (yaml_key(key), from_yaml(value)))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Null => "null".to_string(),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invalid_missing_key_resets_to_error() {
        let mut settings = Settings {
            missing_key: "bogus".to_string(),
            ..Settings::default()
        };
        settings.validate_missing_key();
        assert_eq!(settings.missing_key, "error");

        let mut settings = Settings {
            missing_key: "zero".to_string(),
            ..Settings::default()
        };
        settings.validate_missing_key();
        assert_eq!(settings.missing_key, "zero");
    }

    #[test]
    fn yaml_keys_are_stringified() {
        let doc: serde_yaml::Value = serde_yaml::from_str("16.04: xenial\ntrue: yes\n").unwrap();
        let Value::Map(map) = from_yaml(doc) else {
            panic!("expected a map");
        };
        assert_eq!(map.get("16.04"), Some(&Value::Str("xenial".to_string())));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn yaml_scalars_arrive_typed_or_stringy() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str("a: 1\nb: 2.5\nc: hello\nd: null\n").unwrap();
        let Value::Map(map) = from_yaml(doc) else {
            panic!("expected a map");
        };
        assert_eq!(map.get("a"), Some(&Value::Int(1)));
        assert_eq!(map.get("b"), Some(&Value::Float(2.5)));
        assert_eq!(map.get("c"), Some(&Value::Str("hello".to_string())));
        assert_eq!(map.get("d"), Some(&Value::Null));
    }

    #[test]
    fn environment_injection_respects_the_empty_name() {
        let settings = Settings {
            environment: String::new(),
            ..Settings::default()
        };
        assert!(settings.environment_value().is_none());

        let settings = Settings::default();
        let (name, value) = settings.environment_value().unwrap();
        assert_eq!(name, "env");
        assert!(matches!(value, Value::Map(_)));
    }

    #[cfg(unix)]
    #[test]
    fn environment_injection_tolerates_non_unicode_entries() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        std::env::set_var("TVR_RAW_BYTES", OsStr::from_bytes(b"\xff\xfe"));
        let (_, value) = Settings::default().environment_value().unwrap();
        std::env::remove_var("TVR_RAW_BYTES");

        let Value::Map(map) = value else {
            panic!("expected the environment map");
        };
        let Some(Value::Str(raw)) = map.get("TVR_RAW_BYTES") else {
            panic!("expected the raw entry");
        };
        assert_eq!(raw, "\u{fffd}\u{fffd}");
    }
}
