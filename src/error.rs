//! Named failures
// (c) 2024 Ross Younger

use std::path::PathBuf;

/// The failures that callers may want to tell apart.
///
/// These travel inside [`anyhow::Error`]; recover them with
/// [`downcast_ref`](anyhow::Error::downcast_ref).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No preset file exists for the requested name
    #[error("preset `{name}` not found (looked in {})", .dir.display())]
    PresetNotFound {
        /// The requested preset
        name: String,
        /// The directory that was searched
        dir: PathBuf,
    },

    /// The preset name cannot be used as a file name
    #[error("invalid preset name {0:?}")]
    InvalidPresetName(String),

    /// The preset file exists but could not be read
    #[error("could not read preset file {}", .path.display())]
    UnreadablePreset {
        /// The preset file
        path: PathBuf,
        /// What went wrong
        source: std::io::Error,
    },

    /// The configuration file exists but could not be read.
    ///
    /// (A configuration file that does not exist is not an error.)
    #[error("could not read configuration file {}", .path.display())]
    UnreadableConfig {
        /// The configuration file
        path: PathBuf,
        /// What went wrong
        source: std::io::Error,
    },
}
