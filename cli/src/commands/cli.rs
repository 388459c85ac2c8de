use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ripkit", version, about = "Fetch and run an external asset extraction tool")]
pub struct Args {
    /// Configuration file to load instead of ~/.ripkit/config.toml or ./ripkit.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the extraction pipeline.
    Run(RunArgs),
    /// Make sure the extraction tool is installed.
    Install(InstallArgs),
    /// Forget the saved pipeline position.
    Reset,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct RunArgs {
    /// Game data directory handed to the tool.
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Directory the tool exports into. Cleared before every run.
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Path of the tool executable.
    #[arg(long)]
    pub tool_exe: Option<PathBuf>,

    /// Where the run configuration file is written.
    #[arg(long)]
    pub run_config: Option<PathBuf>,

    /// Disable the progress bar.
    #[arg(long)]
    pub quiet: bool,
}

#[derive(ClapArgs, Debug, Clone, Default)]
pub struct InstallArgs {
    /// Path of the tool executable.
    #[arg(long)]
    pub tool_exe: Option<PathBuf>,

    /// Only report whether the tool is installed; never download.
    #[arg(long)]
    pub check_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_overrides() {
        let args = Args::parse_from([
            "ripkit",
            "--config",
            "custom.toml",
            "run",
            "--input",
            "game/Data",
            "--output",
            "out",
            "--quiet",
        ]);

        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        match args.command {
            Commands::Run(run) => {
                assert_eq!(run.input, Some(PathBuf::from("game/Data")));
                assert_eq!(run.output, Some(PathBuf::from("out")));
                assert!(run.tool_exe.is_none());
                assert!(run.quiet);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_install_and_reset() {
        let args = Args::parse_from(["ripkit", "install", "--check-only"]);
        assert!(matches!(args.command, Commands::Install(InstallArgs { check_only: true, .. })));

        let args = Args::parse_from(["ripkit", "reset"]);
        assert!(matches!(args.command, Commands::Reset));
    }
}
