//! Resolution of the configuration object for one command invocation.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::ui::{Prompt, PromptType, Prompter};

use super::loader::{find_rc_file, load_config_file, rc_file_name};
use super::merger::{deep_merge, get_path, set_path};

/// How the configuration should be obtained.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Configuration supplied by the caller; used verbatim when present.
    pub explicit: Option<Value>,
    /// Use the cached rc file without prompting.
    pub rc_only: bool,
    /// A revert phase never prompts.
    pub revert: bool,
}

/// Produces the configuration for a module/command.
///
/// Precedence: explicit config, then (for rc-only and revert runs) the
/// cached rc file alone, then interactive answers merged over the cache.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    module: String,
    command: String,
    start_dir: PathBuf,
}

impl ConfigResolver {
    /// Resolver searching for rc files upward from `start_dir`.
    pub fn new(module: &str, command: &str, start_dir: &Path) -> Self {
        Self {
            module: module.to_string(),
            command: command.to_string(),
            start_dir: start_dir.to_path_buf(),
        }
    }

    /// Path of the nearest cached rc file, if any.
    pub fn cache_path(&self) -> Option<PathBuf> {
        find_rc_file(&self.start_dir, &self.module, &self.command)
    }

    /// Load the nearest cached config.
    pub fn load_cache(&self) -> Result<Option<Value>> {
        match self.cache_path() {
            Some(path) => {
                debug!("Loading cached config from {}", path.display());
                load_config_file(&path).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Resolve the configuration, prompting through `prompter` when needed.
    pub fn resolve(
        &self,
        options: &ResolveOptions,
        schema: &[Prompt],
        prompter: &mut dyn Prompter,
    ) -> Result<Value> {
        if let Some(explicit) = &options.explicit {
            debug!("Using explicit config for {} {}", self.module, self.command);
            return Ok(explicit.clone());
        }

        let cached = self.load_cache()?;

        if options.rc_only || options.revert {
            return Ok(cached.unwrap_or_else(|| {
                warn!(
                    "No {} file found for {} {}; continuing with an empty config",
                    rc_file_name(&self.module, &self.command),
                    self.module,
                    self.command
                );
                Value::Object(Map::new())
            }));
        }

        let answers = self.ask(schema, cached.as_ref(), prompter)?;
        Ok(match cached {
            Some(cached) => deep_merge(&cached, &answers),
            None => answers,
        })
    }

    /// Write `config` as pretty JSON to `{dir}/.{module}-{command}rc`.
    pub fn save_cache(&self, config: &Value, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(rc_file_name(&self.module, &self.command));
        let mut content = serde_json::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
        content.push('\n');
        fs::write(&path, content)?;
        debug!("Saved config to {}", path.display());
        Ok(path)
    }

    fn ask(
        &self,
        schema: &[Prompt],
        cached: Option<&Value>,
        prompter: &mut dyn Prompter,
    ) -> Result<Value> {
        let mut answers = Value::Object(Map::new());

        for prompt in schema {
            let mut prompt = prompt.clone();
            if let Some(default) = cached
                .and_then(|c| get_path(c, &prompt.key))
                .and_then(default_from_value)
            {
                prompt.default = Some(default);
            }

            let answer = if prompter.is_interactive() {
                prompter.prompt(&prompt)?
            } else {
                let raw = prompt.default.clone().unwrap_or_default();
                prompt.prompt_type.parse_answer(&raw)
            };
            set_path(&mut answers, &prompt.key, answer.into_value());
        }

        Ok(answers)
    }
}

/// Render a cached value as a prompt default.
fn default_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Bool(b) => Some(b.to_string()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

/// Prompt for a dotted key with a free-form answer.
pub fn input_prompt(key: &str, question: &str, default: Option<&str>) -> Prompt {
    Prompt {
        key: key.to_string(),
        question: question.to_string(),
        prompt_type: PromptType::Input,
        default: default.map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockPrompter;
    use serde_json::json;
    use tempfile::TempDir;

    fn resolver(dir: &Path) -> ConfigResolver {
        ConfigResolver::new("tokens", "compile", dir)
    }

    #[test]
    fn explicit_config_is_used_verbatim() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tokens-compilerc"), r#"{"a": 1}"#).unwrap();
        let mut prompter = MockPrompter::new();

        let options = ResolveOptions {
            explicit: Some(json!({"b": 2})),
            ..Default::default()
        };
        let config = resolver(temp.path())
            .resolve(&options, &[input_prompt("a", "A?", None)], &mut prompter)
            .unwrap();

        assert_eq!(config, json!({"b": 2}));
        assert!(prompter.prompts_shown().is_empty());
    }

    #[test]
    fn rc_only_uses_cache_without_prompting() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".tokens-compilerc.yaml"),
            "token:\n  path: ./tokens\n",
        )
        .unwrap();
        let mut prompter = MockPrompter::new();

        let options = ResolveOptions {
            rc_only: true,
            ..Default::default()
        };
        let config = resolver(temp.path())
            .resolve(&options, &[input_prompt("token.path", "?", None)], &mut prompter)
            .unwrap();

        assert_eq!(config, json!({"token": {"path": "./tokens"}}));
        assert!(prompter.prompts_shown().is_empty());
    }

    #[test]
    fn revert_without_cache_yields_empty_config() {
        let temp = TempDir::new().unwrap();
        let mut prompter = MockPrompter::new();

        let options = ResolveOptions {
            revert: true,
            ..Default::default()
        };
        let config = resolver(temp.path())
            .resolve(&options, &[input_prompt("x", "?", None)], &mut prompter)
            .unwrap();

        assert_eq!(config, json!({}));
        assert!(prompter.prompts_shown().is_empty());
    }

    #[test]
    fn prompted_answers_merge_over_the_cache() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".tokens-compilerc"),
            r#"{"a": {"b": 1, "c": 2}, "keep": true}"#,
        )
        .unwrap();
        let mut prompter = MockPrompter::new();
        prompter.set_prompt_response("a.b", "9");

        let config = resolver(temp.path())
            .resolve(
                &ResolveOptions::default(),
                &[input_prompt("a.b", "B?", None)],
                &mut prompter,
            )
            .unwrap();

        assert_eq!(config, json!({"a": {"b": "9", "c": 2}, "keep": true}));
    }

    #[test]
    fn dotted_keys_become_nested_objects() {
        let temp = TempDir::new().unwrap();
        let mut prompter = MockPrompter::new();
        prompter.set_prompt_response("cms.schema.path", "./schema");

        let config = resolver(temp.path())
            .resolve(
                &ResolveOptions::default(),
                &[input_prompt("cms.schema.path", "Schema?", None)],
                &mut prompter,
            )
            .unwrap();

        assert_eq!(config, json!({"cms": {"schema": {"path": "./schema"}}}));
    }

    #[test]
    fn cached_values_become_prompt_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(".tokens-compilerc"),
            r#"{"branch": "develop", "components": ["button", "hero"]}"#,
        )
        .unwrap();
        let mut prompter = MockPrompter::new();

        let schema = vec![
            input_prompt("branch", "Branch?", Some("main")),
            Prompt {
                key: "components".into(),
                question: "Components?".into(),
                prompt_type: PromptType::MultiSelect { options: vec![] },
                default: None,
            },
        ];
        let config = resolver(temp.path())
            .resolve(&ResolveOptions::default(), &schema, &mut prompter)
            .unwrap();

        assert_eq!(
            config,
            json!({"branch": "develop", "components": ["button", "hero"]})
        );
    }

    #[test]
    fn non_interactive_prompter_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let mut prompter = MockPrompter::new();
        prompter.set_interactive(false);
        prompter.set_prompt_response("overwrite", "no");

        let schema = vec![
            input_prompt("branch", "Branch?", Some("main")),
            Prompt {
                key: "overwrite".into(),
                question: "Overwrite?".into(),
                prompt_type: PromptType::Confirm,
                default: Some("yes".into()),
            },
        ];
        let config = resolver(temp.path())
            .resolve(&ResolveOptions::default(), &schema, &mut prompter)
            .unwrap();

        assert_eq!(config, json!({"branch": "main", "overwrite": true}));
        assert!(prompter.prompts_shown().is_empty());
    }

    #[test]
    fn broken_cache_is_a_parse_error() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".tokens-compilerc.json"), "{nope").unwrap();
        let mut prompter = MockPrompter::new();

        let options = ResolveOptions {
            rc_only: true,
            ..Default::default()
        };
        let err = resolver(temp.path())
            .resolve(&options, &[], &mut prompter)
            .unwrap_err();
        assert!(matches!(
            err,
            crate::error::KickstartError::ConfigParseError { .. }
        ));
    }

    #[test]
    fn save_cache_round_trips_through_discovery() {
        let temp = TempDir::new().unwrap();
        let resolver = resolver(temp.path());
        let config = json!({"token": {"path": "./tokens"}});

        let path = resolver.save_cache(&config, temp.path()).unwrap();

        assert_eq!(path, temp.path().join(".tokens-compilerc"));
        assert_eq!(resolver.load_cache().unwrap(), Some(config));
    }
}
