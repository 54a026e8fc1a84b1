//! Where ec2ctl keeps its files
// (c) 2024 Ross Younger

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use tracing::debug;

use super::{CONFIG_FILENAME, PRESETS_DIRNAME, PRESET_EXTENSION};
use crate::os::{AbstractPlatform as _, Platform};

/// Environment variable that relocates the root directory
pub const ROOT_ENV_VAR: &str = "EC2CTL_HOME";

/// The on-disk layout: a root directory holding `config.yaml` and a `presets/` directory.
///
/// This is resolved once, at the start of a command, and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    /// Uses an explicit root directory
    #[must_use]
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Determines the root directory.
    ///
    /// In order of preference: the given path (from `--root`), the `EC2CTL_HOME`
    /// environment variable, then `~/.ec2ctl`. A leading `~` is expanded.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        Self::discover_with(explicit, std::env::var_os(ROOT_ENV_VAR))
    }

    fn discover_with(explicit: Option<&Path>, env: Option<OsString>) -> Result<Self> {
        let root = if let Some(p) = explicit {
            expand(p)?
        } else if let Some(e) = env.filter(|e| !e.is_empty()) {
            expand(Path::new(&e))?
        } else {
            Platform::default_root().context("could not determine home directory")?
        };
        debug!("root directory is {}", root.display());
        Ok(Self { root })
    }

    /// The root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The default configuration file
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    /// The directory holding preset files
    #[must_use]
    pub fn presets_dir(&self) -> PathBuf {
        self.root.join(PRESETS_DIRNAME)
    }

    /// The file a named preset would be read from.
    /// This does not check the name; see [`crate::preset::load_preset`].
    #[must_use]
    pub fn preset_path(&self, name: &str) -> PathBuf {
        self.presets_dir()
            .join(format!("{name}.{PRESET_EXTENSION}"))
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    if path.starts_with("~") {
        expanduser::expanduser(path.to_string_lossy())
            .with_context(|| format!("expanding {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}
