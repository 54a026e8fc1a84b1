// ec2ctl top-level command-line arguments
// (c) 2024 Ross Younger

use std::{ffi::OsString, path::PathBuf};

use clap::{Parser, Subcommand};

use crate::config::Overrides;

#[derive(Debug, Parser, Clone)]
#[command(
    author,
    version(env!("EC2CTL_VERSION_STRING")),
    about,
    before_help = "e.g.   ec2ctl preset list",
    infer_long_args(true),
    infer_subcommands(true)
)]
#[command(help_template(
    "\
{name} version {version}
{about-with-newline}
{usage-heading} {usage}
{before-help}
{all-args}{after-help}
"
))]
#[command(styles=super::styles::CLAP_STYLES)]
pub(crate) struct CliArgs {
    // LOCATIONS ===========================================================================
    /// Root directory holding `config.yaml` and `presets/`
    ///
    /// Defaults to the `EC2CTL_HOME` environment variable, or `~/.ec2ctl` if that is not set.
    #[arg(long, global = true, value_name("DIR"), help_heading("Locations"))]
    pub root: Option<PathBuf>,

    /// Reads configuration from this file instead of `<root>/config.yaml`
    #[arg(
        short,
        long,
        global = true,
        value_name("FILE"),
        help_heading("Locations")
    )]
    pub config: Option<PathBuf>,

    // OVERRIDES ===========================================================================
    /// Uses this credentials profile, whatever the configuration file says
    #[arg(short, long, global = true, help_heading("Overrides"))]
    pub profile: Option<String>,

    /// Uses this region, whatever the configuration file says
    #[arg(short, long, global = true, help_heading("Overrides"))]
    pub region: Option<String>,

    // DEBUG ===============================================================================
    /// Quiet mode
    ///
    /// Reports only errors
    #[arg(
        short,
        long,
        global = true,
        action,
        conflicts_with("debug"),
        help_heading("Debug")
    )]
    pub quiet: bool,

    /// Enable detailed debug output
    ///
    /// This has the same effect as setting `RUST_LOG=ec2ctl=trace` in the environment.
    /// If present, `RUST_LOG` overrides this option.
    #[arg(short, long, global = true, action, help_heading("Debug"))]
    pub debug: bool,

    /// Log to a file
    ///
    /// By default the log receives everything printed to stderr.
    /// To override this behaviour, set the environment variable `RUST_LOG_FILE_DETAIL` (same semantics as `RUST_LOG`).
    #[arg(
        short('l'),
        long,
        global = true,
        action,
        value_name("FILE"),
        help_heading("Debug")
    )]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub(crate) enum Command {
    /// Inspects or creates the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Inspects instance presets
    #[command(subcommand)]
    Preset(PresetCommand),

    /// Runs the provider CLI with the configured profile and region
    ///
    /// Everything after `--` is passed through, e.g. `ec2ctl aws -- ec2 describe-instances`
    Aws {
        /// Prints the command instead of running it
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Arguments for the provider CLI
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<OsString>,
    },
}

#[derive(Debug, Subcommand, Clone)]
#[allow(variant_size_differences)]
pub(crate) enum ConfigCommand {
    /// Outputs every configuration field, its value, and where the value came from
    Show {
        /// Outputs the resolved configuration as JSON
        #[arg(long)]
        json: bool,
    },
    /// Outputs the value of one field, by fully-qualified key (e.g. `aws_region`)
    Get {
        /// The key to look up
        key: String,
    },
    /// Outputs the files and directories in use
    Files,
    /// Writes a configuration file holding the defaults, with comments
    Init {
        /// Replaces an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand, Clone)]
#[allow(variant_size_differences)]
pub(crate) enum PresetCommand {
    /// Lists the available presets
    List {
        /// Outputs JSON
        #[arg(long)]
        json: bool,
    },
    /// Outputs every field of a preset, and where the value came from
    Show {
        /// The preset to show
        name: String,
        /// Outputs the resolved preset as JSON
        #[arg(long)]
        json: bool,
    },
}

impl CliArgs {
    pub(crate) fn trace_level(&self) -> &'static str {
        if self.debug {
            "trace"
        } else if self.quiet {
            "error"
        } else {
            "info"
        }
    }

    pub(crate) fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            profile: self.profile.clone(),
            region: self.region.clone(),
        }
    }
}
