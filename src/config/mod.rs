//! Configuration resolution for a command invocation.
//!
//! - Run-control file discovery and parsing in [`loader`]
//! - Deep merging and dotted paths in [`merger`]
//! - The precedence rules (explicit, cached, prompted) in [`resolver`]
//!
//! # Example
//!
//! ```
//! use kickstartds::config::{ConfigResolver, ResolveOptions};
//! use kickstartds::ui::MockPrompter;
//! use serde_json::json;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".tokens-compilerc"), r#"{"sdPath": "x"}"#).unwrap();
//!
//! let resolver = ConfigResolver::new("tokens", "compile", temp.path());
//! let options = ResolveOptions { rc_only: true, ..Default::default() };
//! let config = resolver.resolve(&options, &[], &mut MockPrompter::new()).unwrap();
//! assert_eq!(config, json!({"sdPath": "x"}));
//! ```

pub mod loader;
pub mod merger;
pub mod resolver;

pub use loader::{find_rc_file, load_config_file, parse_config, rc_file_name};
pub use merger::{deep_merge, get_path, set_path};
pub use resolver::{input_prompt, ConfigResolver, ResolveOptions};
