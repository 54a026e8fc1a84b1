// (c) 2024 Ross Younger
//! # Configuration management
//!
//! ec2ctl obtains run-time configuration from the following sources, in order:
//! 1. Command-line options (`--profile`, `--region`)
//! 2. The configuration file (typically `~/.ec2ctl/config.yaml`)
//! 3. Hard-wired defaults
//!
//! The owner tag is special: if it is still unset (or holds the placeholder
//! written by `ec2ctl config init`), it is filled in with the invoking user's login name.
//!
//! Instance presets live alongside the configuration file, in `presets/<name>.yaml`;
//! see [`crate::preset`].
//!
//! **Note** The root directory may be moved with `--root` or the `EC2CTL_HOME`
//! environment variable. Run `ec2ctl config files` to see what applies.
//!
//! ## File format
//!
//! Configuration and preset files use a small subset of YAML:
//! `key: value` pairs, with at most one level of nesting.
//! A line `name:` on its own opens a section; the indented lines after it belong to that section.
//! Any line at the left margin closes the section.
//!
//! Inside the program, nested keys are known by their _fully-qualified_ name,
//! which joins the section and key with an underscore: `region` in the `aws` section is `aws_region`.
//!
//! Values may be wrapped in single or double quotes. There are no escape sequences.
//! Lines starting with `#` are comments, as is anything after a `#` on a line without quotes.
//!
//! Lists, multi-line values, anchors and flow style are not supported;
//! lines the parser does not understand are skipped.
//!
//! ### Example
//!
//! ```text
//! aws:
//!   profile: work
//!   region: eu-west-1   # Ireland
//!
//! ssh:
//!   key_path: ~/.ssh/work.pem
//!
//! tags:
//!   project: "batch #7"
//! ```
//!
//! ## Configurable options
//!
//! The full list of supported fields is defined by [Configuration].
//!
//! On the command line:
//! * `ec2ctl config show` outputs a list of supported fields, their current values, and where each value came from.
//! * `ec2ctl config init` writes a commented file holding the defaults.
//!
//! ### Traps and tips
//! 1. If a key appears more than once, the _first_ occurrence is used.
//! 1. Some fields treat an empty value (`key: ""`) as a deliberate setting.
//!    Others (`aws_profile`, `aws_region`, `ssh_default_user`, `defaults_volume_type`) ignore it and use the default.
//! 1. A line that contains any quote character keeps its inline comment as part of the value.
//!    Put comments on their own line if the value is quoted.

mod lines;
pub use lines::normalize_value;

mod pairs;
pub use pairs::{Pair, Pairs};

mod parser;
pub use parser::{parse, Parser};

pub(crate) mod fields;
pub use fields::{Provenance, Source};

mod structure;
pub use structure::{Configuration, OWNER_PLACEHOLDER};

mod layout;
pub use layout::{Layout, ROOT_ENV_VAR};

mod manager;
pub use manager::{load_configuration, FileState, Manager, Overrides};

/// Name of the configuration file within the root directory
pub const CONFIG_FILENAME: &str = "config.yaml";
/// Name of the presets directory within the root directory
pub const PRESETS_DIRNAME: &str = "presets";
/// File extension of preset files
pub const PRESET_EXTENSION: &str = "yaml";
