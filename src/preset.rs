//! # Instance presets
// (c) 2024 Ross Younger
//!
//! A preset is a named template for launching an instance, kept in
//! `presets/<name>.yaml` under the root directory. The file format is the same as
//! for the configuration file (see [`crate::config`]).
//!
//! ```text
//! name: web
//! description: Small web server
//! instance_type: t3.small
//! ami:
//!   pattern: al2023-ami-*-x86_64
//!   owner: amazon
//! volume:
//!   size: 30
//! spot_friendly: yes
//! ```
//!
//! Every field has a default, so a preset file only needs to say what is different.
//! Unlike the configuration file, a preset that is asked for by name must exist.

use std::{fmt::Display, io::ErrorKind, path::Path};

use anyhow::{Context as _, Result};
use glob::{glob_with, MatchOptions, Pattern};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::{
    fields::{self, overlay, parse_bool, parse_u32, string_field, typed_field, Field},
    Layout, Pairs, Parser, Provenance, PRESET_EXTENSION,
};
use crate::Error;

/// A fully-resolved instance template
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Display name. Falls back to the name the preset was requested by.
    pub name: String,
    /// Free-text description
    pub description: String,
    /// Instance type to launch
    pub instance_type: String,
    /// Image name pattern used to find the latest matching image
    pub ami_pattern: String,
    /// Owner of the image (account id or alias)
    pub ami_owner: String,
    /// Specific image to use. Empty means look it up by pattern.
    pub ami_id: String,
    /// Root volume size, in gigabytes
    pub volume_size: u32,
    /// Root device name
    pub root_device: String,
    /// Login user on the instance
    pub ssh_user: String,
    /// Can this workload tolerate spot interruption?
    pub spot_friendly: bool,
    /// Approximate on-demand price, for display
    pub cost_per_hour: String,
    /// Shown to the operator once the instance is up
    pub post_launch_hint: String,
}

pub(crate) const FIELDS: &[Field<Preset>] = &[
    string_field!(None, "name", name, "", EmptyIsValue, "Display name"),
    string_field!(
        None,
        "description",
        description,
        "",
        EmptyIsValue,
        "What this preset is for"
    ),
    string_field!(
        None,
        "instance_type",
        instance_type,
        "t3.micro",
        EmptyIsAbsent,
        "Instance type to launch"
    ),
    string_field!(
        Some("ami"),
        "pattern",
        ami_pattern,
        "al2023-ami-*-x86_64",
        EmptyIsAbsent,
        "Image name pattern"
    ),
    string_field!(
        Some("ami"),
        "owner",
        ami_owner,
        "amazon",
        EmptyIsAbsent,
        "Image owner"
    ),
    string_field!(
        Some("ami"),
        "id",
        ami_id,
        "",
        EmptyIsValue,
        "Specific image id (empty: look up by pattern)"
    ),
    typed_field!(
        Some("volume"),
        "size",
        volume_size,
        "20",
        parse_u32,
        "Root volume size in GiB"
    ),
    string_field!(
        Some("volume"),
        "device",
        root_device,
        "/dev/xvda",
        EmptyIsAbsent,
        "Root device name"
    ),
    string_field!(
        Some("ssh"),
        "user",
        ssh_user,
        "ec2-user",
        EmptyIsAbsent,
        "Login user"
    ),
    typed_field!(
        None,
        "spot_friendly",
        spot_friendly,
        "false",
        parse_bool,
        "Tolerates spot interruption"
    ),
    string_field!(
        None,
        "cost_per_hour",
        cost_per_hour,
        "",
        EmptyIsValue,
        "Approximate hourly price"
    ),
    string_field!(
        None,
        "post_launch_hint",
        post_launch_hint,
        "",
        EmptyIsValue,
        "Shown once the instance is up"
    ),
];

/// The default for a preset field, by fully-qualified key
fn default_for(key: &str) -> &'static str {
    FIELDS
        .iter()
        .find(|f| f.key() == key)
        .map_or("", |f| f.default)
}

/// Rejects names that would escape the presets directory.
/// A leading dot covers `.` and `..` as well as hidden files, which are never listed.
fn check_name(name: &str) -> Result<(), Error> {
    if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
        return Err(Error::InvalidPresetName(name.to_owned()));
    }
    Ok(())
}

/// A preset together with where each of its values came from
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct LoadedPreset {
    preset: Preset,
    provenance: Provenance,
}

impl LoadedPreset {
    /// Reads a preset by name
    ///
    /// # Errors
    /// * [`Error::InvalidPresetName`] if the name cannot be a file name
    /// * [`Error::PresetNotFound`] if there is no such preset
    /// * [`Error::UnreadablePreset`] if the file exists but cannot be read
    pub fn load(layout: &Layout, name: &str) -> Result<Self> {
        check_name(name)?;
        let path = layout.preset_path(name);
        debug!("loading preset {name} from {}", path.display());

        let pairs = match Parser::for_path(&path) {
            Ok(parser) => parser.parse(),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::PresetNotFound {
                    name: name.to_owned(),
                    dir: layout.presets_dir(),
                }
                .into())
            }
            Err(e) => Err(e),
        }
        .map_err(|source| Error::UnreadablePreset { path, source })?;

        let (mut preset, provenance) = overlay(FIELDS, &pairs)?;
        if preset.name.is_empty() {
            name.clone_into(&mut preset.name);
        }
        Ok(Self { preset, provenance })
    }

    /// The resolved preset
    #[must_use]
    pub fn preset(&self) -> &Preset {
        &self.preset
    }

    /// Where each field's value came from
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }
}

impl From<LoadedPreset> for Preset {
    fn from(value: LoadedPreset) -> Self {
        value.preset
    }
}

impl Display for LoadedPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            fields::table(FIELDS, &self.preset, &self.provenance)
        )
    }
}

/// Reads a preset by name.
///
/// A preset that doesn't exist is an error ([`Error::PresetNotFound`]), naming the
/// preset and the directory that was searched.
#[allow(clippy::module_name_repetitions)]
pub fn load_preset(layout: &Layout, name: &str) -> Result<Preset> {
    LoadedPreset::load(layout, name).map(Preset::from)
}

///////////////////////////////////////////////////////////////////////////////////////

/// The few fields of a preset shown in a listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, tabled::Tabled)]
#[allow(clippy::module_name_repetitions)]
pub struct PresetSummary {
    /// File name without its extension; this is what [`load_preset`] expects
    pub file: String,
    /// Display name (falls back to the file name)
    pub name: String,
    /// Instance type
    pub instance_type: String,
    /// Description
    pub description: String,
}

impl PresetSummary {
    fn from_pairs(pairs: &Pairs, stem: &str) -> Self {
        Self {
            file: stem.to_owned(),
            name: pairs.lookup_nonempty("name", stem).to_owned(),
            instance_type: pairs
                .lookup_nonempty("instance_type", default_for("instance_type"))
                .to_owned(),
            description: pairs
                .lookup("description", default_for("description"))
                .to_owned(),
        }
    }
}

fn summarise(path: &Path) -> Result<PresetSummary> {
    let stem = path
        .file_stem()
        .and_then(std::ffi::OsStr::to_str)
        .with_context(|| format!("unusable file name {}", path.display()))?;
    let pairs = Parser::for_path(path)
        .and_then(Parser::parse)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(PresetSummary::from_pairs(&pairs, stem))
}

/// Lists the available presets, in file name order.
///
/// Only the name, instance type and description are read.
/// Files that can't be read are reported and skipped.
/// If the presets directory doesn't exist, there are no presets.
#[allow(clippy::module_name_repetitions)]
pub fn list_presets(layout: &Layout) -> Result<Vec<PresetSummary>> {
    let dir = layout.presets_dir();
    if !dir.is_dir() {
        debug!("presets directory {} not present", dir.display());
        return Ok(Vec::new());
    }

    let pattern = format!(
        "{}/*.{PRESET_EXTENSION}",
        Pattern::escape(&dir.to_string_lossy())
    );
    let options = MatchOptions {
        case_sensitive: true,
        require_literal_leading_dot: true,
        require_literal_separator: true,
    };

    let mut paths: Vec<_> = glob_with(&pattern, options)
        .with_context(|| format!("listing {}", dir.display()))?
        .filter_map(|entry| {
            entry
                .inspect_err(|e| warn!("skipping {}: {e}", e.path().display()))
                .ok()
        })
        .collect();
    paths.sort();

    Ok(paths
        .iter()
        .filter_map(|path| {
            summarise(path)
                .inspect_err(|e| warn!("skipping preset: {e:#}"))
                .ok()
        })
        .collect())
}

#[cfg(test)]
mod test {
    use std::fs;

    use assertables::assert_contains;

    use super::{list_presets, load_preset, LoadedPreset, Preset, PresetSummary, FIELDS};
    use crate::config::{Layout, Source};
    use crate::Error;

    /// Creates a root directory holding the given preset files
    fn layout_with(presets: &[(&str, &str)]) -> (Layout, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let layout = Layout::new(dir.path());
        fs::create_dir(layout.presets_dir()).unwrap();
        for (name, body) in presets {
            fs::write(layout.preset_path(name), body).unwrap();
        }
        (layout, dir)
    }

    #[test]
    fn defaults_are_valid() {
        let mut p = Preset::default();
        for f in FIELDS {
            (f.assign)(&mut p, f.default).unwrap();
        }
    }

    #[test]
    fn nonexistent_preset_is_an_error() {
        let (layout, _dir) = layout_with(&[]);
        let err = load_preset(&layout, "nonexistent-preset-xyz").unwrap_err();
        match err.downcast_ref::<Error>() {
            Some(Error::PresetNotFound { name, dir }) => {
                assert_eq!(name, "nonexistent-preset-xyz");
                assert_eq!(*dir, layout.presets_dir());
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert_contains!(err.to_string(), "nonexistent-preset-xyz");
        assert_contains!(err.to_string(), &layout.presets_dir().display().to_string());
    }

    #[test]
    fn missing_directory_is_not_found_too() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_preset(&Layout::new(dir.path()), "web").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::PresetNotFound { .. })
        ));
    }

    #[test]
    fn bad_names_rejected() {
        let (layout, _dir) = layout_with(&[]);
        for name in ["", ".", "..", "../config", "a/b", "a\\b", ".hidden"] {
            let err = load_preset(&layout, name).unwrap_err();
            assert!(
                matches!(
                    err.downcast_ref::<Error>(),
                    Some(Error::InvalidPresetName(_))
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn double_dot_inside_a_name_is_fine() {
        let (layout, _dir) = layout_with(&[("web..v2", "instance_type: t3.large\n")]);
        let p = load_preset(&layout, "web..v2").unwrap();
        assert_eq!(p.name, "web..v2");
        assert_eq!(p.instance_type, "t3.large");
    }

    #[test]
    fn full_preset() {
        let (layout, _dir) = layout_with(&[(
            "gpu",
            "name: GPU box
description: 'Training, with a # in it'
instance_type: g5.xlarge
ami:
  pattern: Deep Learning AMI*
  owner: \"amazon\"
  id: \"\"
volume:
  size: 200
  device: /dev/sda1
ssh:
  user: ubuntu
spot_friendly: yes
cost_per_hour: $1.006
post_launch_hint: run nvidia-smi
",
        )]);
        let p = load_preset(&layout, "gpu").unwrap();
        assert_eq!(
            p,
            Preset {
                name: "GPU box".into(),
                description: "Training, with a # in it".into(),
                instance_type: "g5.xlarge".into(),
                ami_pattern: "Deep Learning AMI*".into(),
                ami_owner: "amazon".into(),
                ami_id: String::new(),
                volume_size: 200,
                root_device: "/dev/sda1".into(),
                ssh_user: "ubuntu".into(),
                spot_friendly: true,
                cost_per_hour: "$1.006".into(),
                post_launch_hint: "run nvidia-smi".into(),
            }
        );
    }

    #[test]
    fn sparse_preset_takes_defaults() {
        let (layout, _dir) = layout_with(&[("tiny", "instance_type: t3.nano\n")]);
        let loaded = LoadedPreset::load(&layout, "tiny").unwrap();
        let p = loaded.preset();
        assert_eq!(p.name, "tiny");
        assert_eq!(p.instance_type, "t3.nano");
        assert_eq!(p.volume_size, 20);
        assert_eq!(p.root_device, "/dev/xvda");
        assert!(!p.spot_friendly);
        assert_eq!(
            loaded.provenance().get("volume_size"),
            Some(&Source::Default)
        );
        assert_contains!(loaded.to_string(), "t3.nano");
    }

    #[test]
    fn listing() {
        let (layout, _dir) = layout_with(&[
            ("web", "name: web\ninstance_type: t3.small\ndescription: Web server\n"),
            ("db", "instance_type: r6g.large\n"),
            ("blank", "name: \"\"\ninstance_type: \"\"\n"),
        ]);
        fs::write(layout.presets_dir().join("notes.txt"), "not a preset").unwrap();

        let list = list_presets(&layout).unwrap();
        assert_eq!(
            list,
            vec![
                PresetSummary {
                    file: "blank".into(),
                    name: "blank".into(),
                    instance_type: "t3.micro".into(),
                    description: String::new(),
                },
                PresetSummary {
                    file: "db".into(),
                    name: "db".into(),
                    instance_type: "r6g.large".into(),
                    description: String::new(),
                },
                PresetSummary {
                    file: "web".into(),
                    name: "web".into(),
                    instance_type: "t3.small".into(),
                    description: "Web server".into(),
                },
            ]
        );
    }

    #[test]
    fn listed_file_name_loads() {
        let (layout, _dir) = layout_with(&[("gpu", "name: GPU box\n")]);
        let list = list_presets(&layout).unwrap();
        assert_eq!(list[0].name, "GPU box");
        assert_eq!(list[0].file, "gpu");
        assert_eq!(load_preset(&layout, &list[0].file).unwrap().name, "GPU box");
    }

    #[test]
    fn unreadable_preset_skipped_in_listing() {
        let (layout, _dir) = layout_with(&[("ok", "instance_type: t3.small\n")]);
        // a directory with the right extension can't be read as a file
        fs::create_dir(layout.preset_path("broken")).unwrap();
        let list = list_presets(&layout).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "ok");

        let err = load_preset(&layout, "broken").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnreadablePreset { .. })
        ));
    }

    #[test]
    fn no_presets_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_presets(&Layout::new(dir.path())).unwrap().is_empty());
    }
}
