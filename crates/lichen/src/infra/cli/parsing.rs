// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use crate::core::models::CleanupScope;
use crate::infra::cli::parsing::MainCommands::Scan;
use crate::lichen::LichenTask;
use anyhow::bail;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(ValueEnum, Debug, Clone)]
enum ScanSubject {
    Packages,
    Path,
}

#[derive(Args, Debug)]
#[command(version, about, long_about = None)]
struct ScanArguments {
    /// Batch of package descriptors or a plain filesystem location
    #[arg(value_enum)]
    pub subject: ScanSubject,

    /// Path to a package descriptors file (json) or to the folder to scan
    pub input: String,
}

#[derive(Args, Debug)]
#[command(version, about, long_about = None)]
struct CleanupArguments {
    /// Define the scope of cached data to remove
    #[arg(value_enum)]
    pub mode: CleanupScope,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(propagate_version = false)]
struct CliParser {
    #[command(subcommand)]
    pub command: MainCommands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_colors: bool,
}

#[derive(Subcommand)]
enum MainCommands {
    /// Scan a batch of packages or a filesystem location for licenses
    Scan(ScanArguments),
    /// Clean up existing cached data used by this tool
    Cleanup(CleanupArguments),
}

pub fn parse_arguments() -> anyhow::Result<(LichenTask, bool)> {
    let cli = CliParser::parse();
    let turnoff_colors = cli.no_colors;

    let task = match cli.command {
        Scan(args) => {
            let input = PathBuf::from(args.input);
            if !input.exists() {
                bail!("lichen.cli : no such file or directory ({:?})", input)
            }

            match args.subject {
                ScanSubject::Packages => LichenTask::ScanPackages(input),
                ScanSubject::Path => LichenTask::ScanPath(input),
            }
        },
        MainCommands::Cleanup(args) => match args.mode {
            CleanupScope::Everything => LichenTask::CleanupEverything,
            CleanupScope::Results => LichenTask::CleanupResults,
            CleanupScope::Sources => LichenTask::CleanupSources,
            CleanupScope::Tools => LichenTask::CleanupTools,
        },
    };

    Ok((task, turnoff_colors))
}
