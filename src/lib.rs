//! ec2ctl: an operator's tool for cloud compute instances
// (c) 2024 Ross Younger
//!
//! The heart of this crate is configuration and preset resolution:
//! a small parser for a restricted YAML-like format ([`config::parse`]),
//! and the overlays that turn parsed files, command-line overrides and
//! hard-wired defaults into a [`config::Configuration`] or a [`preset::Preset`].
//!
//! ```no_run
//! use ec2ctl::config::{load_configuration, Layout, Overrides};
//!
//! let layout = Layout::discover(None)?;
//! let config = load_configuration(&layout, &Overrides::default())?;
//! let preset = ec2ctl::load_preset(&layout, "web")?;
//! println!("{} in {} as {}", preset.instance_type, config.aws_region, config.tags_owner);
//! # Ok::<(), anyhow::Error>(())
//! ```

mod cli;
pub use cli::cli;

pub mod config;
pub use config::load_configuration;

mod error;
pub use error::Error;

/// OS abstraction layer
pub mod os;

pub mod preset;
pub use preset::{list_presets, load_preset};

pub mod provider;

/// Utilities
pub mod util;
