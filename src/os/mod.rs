//! OS abstraction layer
// (c) 2024 Ross Younger

use std::path::PathBuf;

/// General platform abstraction trait.
/// The active implementation should be pulled into this crate
/// Implementations should be called `Platform`, e.g. [unix::Platform].
///
/// Usage:
/// ```
///    use ec2ctl::os::Platform;
///    use ec2ctl::os::AbstractPlatform as _;
///    println!("{:?}", Platform::default_root());
/// ```
pub trait AbstractPlatform {
    /// The current user's home directory, if it can be determined
    fn home_dir() -> Option<PathBuf>;

    /// The default root directory for ec2ctl's files.
    ///
    /// On Unix platforms this is `~/.ec2ctl`.
    /// # Note
    /// This is a _theoretical_ path construction; it does not guarantee that the path actually exists.
    fn default_root() -> Option<PathBuf>;

    /// The invoking user's login name.
    ///
    /// If somehow this could not be determined, returns None.
    fn current_user() -> Option<String>;
}

#[cfg(any(unix, doc))]
mod unix;

#[cfg(any(unix, doc))]
pub use unix::*;

static_assertions::assert_cfg!(unix, "This OS is not yet supported");
