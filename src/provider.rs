//! Invocation of the provider's command-line tool
// (c) 2024 Ross Younger

use std::{ffi::OsStr, process::Command};

use crate::config::Configuration;

/// The provider CLI program
pub const PROGRAM: &str = "aws";

/// Builds an invocation of the provider CLI.
///
/// The resolved profile and region are placed ahead of the caller's arguments,
/// so every command runs against the configured account.
#[must_use]
pub fn command<I, S>(config: &Configuration, args: I) -> Command
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = Command::new(PROGRAM);
    let _ = cmd.args([
        "--profile",
        config.aws_profile.as_str(),
        "--region",
        config.aws_region.as_str(),
    ]);
    let _ = cmd.args(args);
    cmd
}

/// Renders a command as a shell-like line, for display
#[must_use]
pub fn describe(cmd: &Command) -> String {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|a| {
            let a = a.to_string_lossy();
            if a.is_empty() || a.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
                format!("'{}'", a.replace('\'', r"'\''"))
            } else {
                a.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod test {
    use super::{command, describe, PROGRAM};
    use crate::config::Configuration;

    fn config() -> Configuration {
        Configuration {
            aws_profile: "work".into(),
            aws_region: "eu-west-1".into(),
            ..Configuration::builtin()
        }
    }

    #[test]
    fn profile_and_region_prepended() {
        let cmd = command(&config(), ["ec2", "describe-instances"]);
        assert_eq!(cmd.get_program(), PROGRAM);
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args[..4], ["--profile", "work", "--region", "eu-west-1"]);
        assert_eq!(args[4..], ["ec2", "describe-instances"]);
    }

    #[test]
    fn description_quotes_when_needed() {
        let cmd = command(&config(), ["ec2", "create-tags", "my box", "it's", ""]);
        assert_eq!(
            describe(&cmd),
            r"aws --profile work --region eu-west-1 ec2 create-tags 'my box' 'it'\''s' ''"
        );
    }
}
