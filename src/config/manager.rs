//! Configuration file wrangling
// (c) 2024 Ross Younger

use std::{
    fmt::Display,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use tracing::{debug, warn};

use super::{
    fields::{self, overlay, Provenance, Source},
    structure::FIELDS,
    Configuration, Layout, Pairs, Parser,
};
use crate::{
    os::{AbstractPlatform as _, Platform},
    Error,
};

/// Settings given at invocation time, which take precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Read this file instead of the one in the root directory
    pub config_path: Option<PathBuf>,
    /// Replaces `aws_profile`
    pub profile: Option<String>,
    /// Replaces `aws_region`
    pub region: Option<String>,
}

/// What we found when we went looking for the configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// There was no file; everything came from defaults and overrides
    Missing,
    /// The file was read
    Parsed,
}

/// Resolves the configuration for one invocation, remembering where every value came from.
#[derive(Debug, Clone)]
pub struct Manager {
    path: PathBuf,
    file: FileState,
    config: Configuration,
    provenance: Provenance,
}

impl Manager {
    /// Reads the configuration file (if there is one) and applies the overrides.
    ///
    /// # Errors
    /// [`Error::UnreadableConfig`] if the file exists but cannot be read.
    /// A file that does not exist is not an error.
    pub fn load(layout: &Layout, overrides: &Overrides) -> Result<Self> {
        Self::load_with(layout, overrides, Platform::current_user)
    }

    fn load_with<F>(layout: &Layout, overrides: &Overrides, current_user: F) -> Result<Self>
    where
        F: FnOnce() -> Option<String>,
    {
        let path = overrides
            .config_path
            .clone()
            .unwrap_or_else(|| layout.config_path());

        let (file, pairs) = match Parser::for_path(&path) {
            Ok(parser) => match parser.parse() {
                Ok(pairs) => (FileState::Parsed, pairs),
                Err(source) => return Err(Error::UnreadableConfig { path, source }.into()),
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if overrides.config_path.is_some() {
                    warn!("configuration file {} does not exist", path.display());
                } else {
                    debug!("configuration file {} not present", path.display());
                }
                (FileState::Missing, Pairs::default())
            }
            Err(source) => return Err(Error::UnreadableConfig { path, source }.into()),
        };
        debug!("read {} entries from {}", pairs.len(), path.display());
        let (mut config, mut provenance) = overlay(FIELDS, &pairs)?;

        if let Some(profile) = &overrides.profile {
            config.aws_profile.clone_from(profile);
            provenance.set("aws_profile", Source::CommandLine);
        }
        if let Some(region) = &overrides.region {
            config.aws_region.clone_from(region);
            provenance.set("aws_region", Source::CommandLine);
        }

        if config.owner_needs_identity() {
            if let Some(user) = current_user() {
                config.tags_owner = user;
                provenance.set("tags_owner", Source::CurrentUser);
            } else {
                warn!("could not determine the current user; set tags.owner in the config file");
            }
        }

        Ok(Self {
            path,
            file,
            config,
            provenance,
        })
    }

    /// The resolved configuration
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Consumes the manager, returning the resolved configuration
    #[must_use]
    pub fn into_config(self) -> Configuration {
        self.config
    }

    /// Where each field's value came from
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// The configuration file we looked for
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the configuration file was there
    #[must_use]
    pub fn file_state(&self) -> FileState {
        self.file
    }
}

/// Resolves the configuration for this invocation.
///
/// This is [`Manager::load`] without the provenance information.
pub fn load_configuration(layout: &Layout, overrides: &Overrides) -> Result<Configuration> {
    Manager::load(layout, overrides).map(Manager::into_config)
}

impl Display for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            fields::table(FIELDS, &self.config, &self.provenance)
        )
    }
}

#[cfg(test)]
mod test {
    use assertables::assert_contains;

    use super::{FileState, Manager, Overrides};
    use crate::config::{Configuration, Layout, Source};
    use crate::util::make_test_tempfile;
    use crate::Error;

    fn alice() -> Option<String> {
        Some("alice".into())
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        let mgr = Manager::load_with(&layout, &Overrides::default(), alice).unwrap();
        assert_eq!(mgr.file_state(), FileState::Missing);
        assert_eq!(
            *mgr.config(),
            Configuration {
                tags_owner: "alice".into(),
                ..Configuration::builtin()
            }
        );
        assert_eq!(
            mgr.provenance().get("tags_owner"),
            Some(&Source::CurrentUser)
        );
        assert_eq!(mgr.provenance().get("aws_region"), Some(&Source::Default));
    }

    #[test]
    fn missing_file_owner_is_real_user() {
        use crate::os::{AbstractPlatform as _, Platform};
        let layout = Layout::new("/nonexistent/ec2ctl-test");
        let config = super::load_configuration(&layout, &Overrides::default()).unwrap();
        assert_eq!(Some(config.tags_owner), Platform::current_user());
        assert_eq!(config.aws_profile, "default");
    }

    #[test]
    fn file_values_with_provenance() {
        let (path, _dir) = make_test_tempfile(
            "aws:\n  profile: default\n  region: eu-west-1\ntags:\n  owner: bob\n",
            "config.yaml",
        );
        let overrides = Overrides {
            config_path: Some(path.clone()),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        assert_eq!(mgr.file_state(), FileState::Parsed);
        let c = mgr.config();
        assert_eq!(c.aws_region, "eu-west-1");
        assert_eq!(c.tags_owner, "bob");
        assert_eq!(
            mgr.provenance().get("aws_region"),
            Some(&Source::File(format!("{} (line 3)", path.display())))
        );
    }

    #[test]
    fn override_beats_file() {
        let (path, _dir) =
            make_test_tempfile("aws:\n  profile: default\n  region: eu-west-1\n", "c.yaml");
        let overrides = Overrides {
            config_path: Some(path),
            profile: Some("work".into()),
            region: None,
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        assert_eq!(mgr.config().aws_profile, "work");
        assert_eq!(mgr.config().aws_region, "eu-west-1");
        assert_eq!(
            mgr.provenance().get("aws_profile"),
            Some(&Source::CommandLine)
        );
    }

    #[test]
    fn placeholder_owner_replaced() {
        let (path, _dir) = make_test_tempfile("tags:\n  owner: your-name\n", "c.yaml");
        let overrides = Overrides {
            config_path: Some(path),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        assert_eq!(mgr.config().tags_owner, "alice");

        // and if we can't find out who we are, the placeholder stays
        let overrides = Overrides {
            config_path: mgr.path().to_path_buf().into(),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, || None).unwrap();
        assert_eq!(mgr.config().tags_owner, "your-name");
    }

    #[test]
    fn unreadable_file_is_an_error() {
        // A directory opens fine but can't be read, even by root
        let dir = tempfile::tempdir().unwrap();
        let overrides = Overrides {
            config_path: Some(dir.path().to_path_buf()),
            ..Overrides::default()
        };
        let err = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnreadableConfig { .. })
        ));
    }

    #[test]
    fn stray_latin1_byte_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, b"# caf\xe9 settings\naws:\n  region: eu-west-1\n").unwrap();
        let overrides = Overrides {
            config_path: Some(path),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        assert_eq!(mgr.file_state(), FileState::Parsed);
        assert_eq!(mgr.config().aws_region, "eu-west-1");
    }

    #[test]
    fn bad_number_keeps_default() {
        let (path, _dir) = make_test_tempfile("defaults:\n  ttl_hours: soon\n", "c.yaml");
        let overrides = Overrides {
            config_path: Some(path),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        assert_eq!(mgr.config().defaults_ttl_hours, 8);
    }

    #[test]
    fn table_output() {
        let overrides = Overrides {
            config_path: Some("/nonexistent/c.yaml".into()),
            region: Some("ap-south-1".into()),
            ..Overrides::default()
        };
        let mgr = Manager::load_with(&Layout::new("/unused"), &overrides, alice).unwrap();
        let out = mgr.to_string();
        assert_contains!(out, "aws_region");
        assert_contains!(out, "ap-south-1");
        assert_contains!(out, "command line");
        assert_contains!(out, "current user");
    }
}
