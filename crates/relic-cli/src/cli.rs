use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "relic",
    about = "Migrate FOXML object exports into OCFL storage",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Migrate every FOXML document under the source directory
    Migrate(MigrateArgs),
    /// Decode one FOXML document and show its reconstructed timeline
    Inspect(InspectArgs),
    /// Print the effective configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct MigrateArgs {
    /// Directory of FOXML documents
    #[arg(long)]
    pub source: Option<PathBuf>,
    /// OCFL storage root
    #[arg(long)]
    pub target: Option<PathBuf>,
    /// Legacy datastream store for managed content
    #[arg(long)]
    pub datastream_store: Option<PathBuf>,
    /// File listing the pids to migrate
    #[arg(long)]
    pub pid_list: Option<PathBuf>,
    /// Record failed objects and keep going
    #[arg(long)]
    pub continue_on_error: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Validate the configuration without printing it
    #[arg(long)]
    pub check: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_migrate() {
        let cli = Cli::try_parse_from(["relic", "migrate"]).unwrap();
        if let Command::Migrate(args) = cli.command {
            assert!(args.source.is_none());
            assert!(!args.continue_on_error);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_migrate_overrides() {
        let cli = Cli::try_parse_from([
            "relic", "migrate", "--source", "/in", "--target", "/out", "--continue-on-error",
        ])
        .unwrap();
        if let Command::Migrate(args) = cli.command {
            assert_eq!(args.source, Some(PathBuf::from("/in")));
            assert_eq!(args.target, Some(PathBuf::from("/out")));
            assert!(args.continue_on_error);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_inspect_with_global_flags() {
        let cli = Cli::try_parse_from([
            "relic", "inspect", "demo.xml", "--format", "json", "-v", "-c", "relic.toml",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.config, Some(PathBuf::from("relic.toml")));
        if let Command::Inspect(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("demo.xml"));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_config() {
        let cli = Cli::try_parse_from(["relic", "config", "--check"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigArgs { check: true })));
    }

    #[test]
    fn inspect_requires_file() {
        assert!(Cli::try_parse_from(["relic", "inspect"]).is_err());
    }
}
