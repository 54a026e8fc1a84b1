// OS abstraction layer for ec2ctl - Unix implementation
// (c) 2024 Ross Younger

use super::AbstractPlatform;
use nix::unistd::{Uid, User};
use std::path::PathBuf;
use tracing::debug;

/// Environment variables that conventionally carry the login name, in order of preference
const USER_ENV_VARS: &[&str] = &["USER", "LOGNAME"];

#[derive(Debug, Clone, Copy)]
/// OS abstraction layer for Unix-like platforms
pub struct Platform {}

impl AbstractPlatform for Platform {
    fn home_dir() -> Option<PathBuf> {
        dirs::home_dir()
    }

    fn default_root() -> Option<PathBuf> {
        let mut d = Self::home_dir()?;
        d.push(concat!(".", env!("CARGO_PKG_NAME")));
        Some(d)
    }

    fn current_user() -> Option<String> {
        for var in USER_ENV_VARS {
            if let Some(name) = std::env::var(var).ok().filter(|n| !n.is_empty()) {
                return Some(name);
            }
        }
        // Nothing in the environment (cron, containers); ask the password database
        match User::from_uid(Uid::current()) {
            Ok(Some(user)) => Some(user.name),
            Ok(None) => None,
            Err(e) => {
                debug!("password database lookup failed: {e}");
                None
            }
        }
    }
}
