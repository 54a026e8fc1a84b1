// Main CLI entrypoint
// (c) 2024 Ross Younger

use std::{ffi::OsString, fs, process::ExitCode};

use anstream::{eprintln, println};
use anyhow::{Context as _, Result};
use clap::Parser as _;
use tabled::{settings::style::Style, Table};
use tracing::{debug, info};

use super::args::{CliArgs, Command, ConfigCommand, PresetCommand};
use super::styles::{label, ERROR, SUCCESS};
use crate::{
    config::{Configuration, FileState, Layout, Manager, Overrides},
    preset::{list_presets, LoadedPreset},
    provider,
    util::setup_tracing,
};

/// Main CLI entrypoint
pub fn cli() -> Result<ExitCode> {
    let args = CliArgs::parse();
    setup_tracing(args.trace_level(), args.log_file.as_deref())
        .inspect_err(|e| eprintln!("{e:?}"))?;

    run(&args).or_else(|e| {
        eprintln!("{} {e:#}", label("ERROR", ERROR));
        Ok(ExitCode::FAILURE)
    })
}

fn run(args: &CliArgs) -> Result<ExitCode> {
    let layout = Layout::discover(args.root.as_deref())?;
    let overrides = args.overrides();
    match &args.command {
        Command::Config(c) => config_command(c, &layout, &overrides),
        Command::Preset(p) => preset_command(p, &layout),
        Command::Aws {
            dry_run,
            args: passthrough,
        } => aws(&layout, &overrides, *dry_run, passthrough),
    }
}

fn config_command(cmd: &ConfigCommand, layout: &Layout, overrides: &Overrides) -> Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mgr = Manager::load(layout, overrides)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(mgr.config())?);
            } else {
                if mgr.file_state() == FileState::Missing {
                    info!(
                        "no configuration file at {}; using defaults",
                        mgr.path().display()
                    );
                }
                println!("{mgr}");
            }
        }
        ConfigCommand::Get { key } => {
            let mgr = Manager::load(layout, overrides)?;
            let Some(value) = mgr.config().value_of(key) else {
                anyhow::bail!(
                    "unknown configuration key `{key}` (known keys: {})",
                    Configuration::keys().collect::<Vec<_>>().join(", ")
                );
            };
            println!("{value}");
        }
        ConfigCommand::Files => {
            let config = overrides
                .config_path
                .clone()
                .unwrap_or_else(|| layout.config_path());
            let presence = |exists: bool| if exists { "" } else { " (not present)" };
            println!("root:    {}", layout.root().display());
            println!(
                "config:  {}{}",
                config.display(),
                presence(config.is_file())
            );
            let presets = layout.presets_dir();
            println!(
                "presets: {}{}",
                presets.display(),
                presence(presets.is_dir())
            );
        }
        ConfigCommand::Init { force } => {
            let path = overrides
                .config_path
                .clone()
                .unwrap_or_else(|| layout.config_path());
            anyhow::ensure!(
                *force || !path.exists(),
                "{} already exists (use --force to replace it)",
                path.display()
            );
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
            fs::create_dir_all(layout.presets_dir())
                .with_context(|| format!("creating {}", layout.presets_dir().display()))?;
            fs::write(&path, Configuration::template())
                .with_context(|| format!("writing {}", path.display()))?;
            println!("{} {}", label("Wrote", SUCCESS), path.display());
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn preset_command(cmd: &PresetCommand, layout: &Layout) -> Result<ExitCode> {
    match cmd {
        PresetCommand::List { json } => {
            let presets = list_presets(layout)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&presets)?);
            } else if presets.is_empty() {
                info!("no presets in {}", layout.presets_dir().display());
            } else {
                println!("{}", Table::new(presets).with(Style::sharp()));
            }
        }
        PresetCommand::Show { name, json } => {
            let loaded = LoadedPreset::load(layout, name)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(loaded.preset())?);
            } else {
                println!("{loaded}");
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn aws(
    layout: &Layout,
    overrides: &Overrides,
    dry_run: bool,
    args: &[OsString],
) -> Result<ExitCode> {
    let config = crate::config::load_configuration(layout, overrides)?;
    let mut cmd = provider::command(&config, args);
    let line = provider::describe(&cmd);
    if dry_run {
        println!("{line}");
        return Ok(ExitCode::SUCCESS);
    }
    debug!("running {line}");
    let status = cmd
        .status()
        .with_context(|| format!("could not run {}", provider::PROGRAM))?;
    debug!("{} exited with {status}", provider::PROGRAM);
    // A signal leaves no exit code
    Ok(status
        .code()
        .and_then(|c| u8::try_from(c).ok())
        .map_or(ExitCode::FAILURE, ExitCode::from))
}
