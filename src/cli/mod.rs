use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use crate::common::SplitSize;
use crate::config::BackupConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Copy a source directory into <DESTINATION>/staging.
    #[command(alias = "c")]
    Copy {
        /// The directory to back up.
        #[arg(short, long)]
        source: PathBuf,

        #[command(flatten)]
        destination: DestinationArgs,

        /// Show a progress bar on stderr.
        #[arg(long)]
        progress: bool,
    },

    /// Pack <DESTINATION>/staging into backup_<N>.zip archives, then remove it.
    #[command(alias = "p")]
    Package {
        #[command(flatten)]
        destination: DestinationArgs,

        #[command(flatten)]
        packing: PackingArgs,

        /// Show a progress bar on stderr.
        #[arg(long)]
        progress: bool,

        /// Print the run report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Copy and then package in one go.
    #[command(alias = "b")]
    Backup {
        /// The directory to back up.
        #[arg(short, long)]
        source: PathBuf,

        #[command(flatten)]
        destination: DestinationArgs,

        #[command(flatten)]
        packing: PackingArgs,

        /// Show a progress bar on stderr.
        #[arg(long)]
        progress: bool,

        /// Print the run report as JSON on stdout.
        #[arg(long)]
        json: bool,
    },

    /// Print which step is allowed next for a destination.
    Status {
        #[command(flatten)]
        destination: DestinationArgs,
    },

    /// List the archives in a destination and the entries they hold.
    #[command(alias = "l")]
    List {
        #[command(flatten)]
        destination: DestinationArgs,
    },
}

#[derive(ClapArgs, Clone, Debug)]
pub struct DestinationArgs {
    /// Directory holding the staging area, the archives and backup.log.
    #[arg(short, long, env = "ZIPSTAGE_DEST")]
    pub destination: PathBuf,
}

#[derive(ClapArgs, Clone, Debug)]
pub struct PackingArgs {
    /// Maximum uncompressed bytes per archive: "100 MB", "200 MB", "500 MB" or a byte count.
    #[arg(long, default_value = "100 MB")]
    pub split_size: SplitSize,

    /// Index of the first archive written (backup_<N>.zip).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub start_index: u32,
}

impl Commands {
    /// Builds the engine configuration for this command.
    pub fn config(&self) -> BackupConfig {
        match self {
            Commands::Copy { source, destination, .. } => {
                BackupConfig::new(source, &destination.destination)
            }
            Commands::Package { destination, packing, .. } => {
                BackupConfig::new(PathBuf::new(), &destination.destination)
                    .with_split_size(packing.split_size)
                    .with_start_index(packing.start_index)
            }
            Commands::Backup { source, destination, packing, .. } => {
                BackupConfig::new(source, &destination.destination)
                    .with_split_size(packing.split_size)
                    .with_start_index(packing.start_index)
            }
            Commands::Status { destination } | Commands::List { destination } => {
                BackupConfig::new(PathBuf::new(), &destination.destination)
            }
        }
    }
}

/// Parses command-line arguments using `clap` and returns the command to execute.
pub fn run() -> Result<Commands, Box<dyn std::error::Error>> {
    let args = Args::parse();
    Ok(args.command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_package_with_split_size() {
        let args = Args::try_parse_from([
            "zipstage", "package", "-d", "/dest", "--split-size", "200 MB", "--start-index", "3",
        ])
        .unwrap();
        let cfg = args.command.config();
        assert_eq!(cfg.destination, PathBuf::from("/dest"));
        assert_eq!(cfg.split_size, SplitSize::MB_200);
        assert_eq!(cfg.start_index, 3);
    }

    #[test]
    fn default_split_size_is_100_mb() {
        let args = Args::try_parse_from(["zipstage", "backup", "-s", "/src", "-d", "/dest"]).unwrap();
        let cfg = args.command.config();
        assert_eq!(cfg.split_size, SplitSize::MB_100);
        assert_eq!(cfg.source, PathBuf::from("/src"));
    }

    #[test]
    fn rejects_bad_split_size_and_zero_index() {
        assert!(Args::try_parse_from(["zipstage", "package", "-d", "/d", "--split-size", "0"]).is_err());
        assert!(Args::try_parse_from(["zipstage", "package", "-d", "/d", "--start-index", "0"]).is_err());
    }
}
