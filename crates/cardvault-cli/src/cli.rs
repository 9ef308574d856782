//! Command-line interface definition

use cardvault_core::{Config, FileType};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "cardvault",
    version,
    about = "Archive media from a card directory into a dated backup tree"
)]
pub struct Cli {
    /// Directory to watch (overrides WATCH_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub watch_dir: Option<PathBuf>,

    /// Archive root (overrides BACKUP_DIR)
    #[arg(long, global = true, value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Index database URL (overrides DATABASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Apply command-line overrides on top of the environment config.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(dir) = &self.watch_dir {
            config.watch_dir = dir.clone();
        }
        if let Some(dir) = &self.backup_dir {
            config.backup_dir = dir.clone();
        }
        if let Some(url) = &self.database_url {
            config.database_url = url.clone();
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the card directory and ingest new files (default)
    Watch,
    /// List indexed files by creation date
    Files(FilesArgs),
    /// Show one indexed file and where its archive copy lives
    Show {
        /// Record id
        id: i64,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// Ingest specific files now, without waiting for the watcher
    Ingest {
        /// Files to ingest
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Single creation date (YYYY-MM-DD)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<NaiveDate>,

    /// Range start, inclusive (YYYY-MM-DD)
    #[arg(long, required_unless_present = "date", requires = "to")]
    pub from: Option<NaiveDate>,

    /// Range end, inclusive (YYYY-MM-DD)
    #[arg(long, required_unless_present = "date", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Restrict to these file types (repeatable): jpeg, jpg, avi, wav
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<FileType>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl FilesArgs {
    /// Inclusive date range selected by the flags.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.date, self.from, self.to) {
            (Some(date), _, _) => Some((date, date)),
            (None, Some(from), Some(to)) => Some((from, to)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_subcommand_means_watch() {
        let cli = Cli::try_parse_from(["cardvault"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_files_by_date_with_types() {
        let cli = Cli::try_parse_from([
            "cardvault", "files", "--date", "2024-03-05", "--type", "jpg", "--type", "WAV",
        ])
        .unwrap();
        let Some(Commands::Files(args)) = cli.command else {
            panic!("expected files command");
        };
        assert_eq!(args.range(), Some((date(2024, 3, 5), date(2024, 3, 5))));
        assert_eq!(args.types, vec![FileType::Jpg, FileType::Wav]);
        assert_eq!(args.format, OutputFormat::Table);
    }

    #[test]
    fn test_files_range() {
        let cli = Cli::try_parse_from([
            "cardvault", "files", "--from", "2024-03-01", "--to", "2024-03-31", "--format", "json",
        ])
        .unwrap();
        let Some(Commands::Files(args)) = cli.command else {
            panic!("expected files command");
        };
        assert_eq!(args.range(), Some((date(2024, 3, 1), date(2024, 3, 31))));
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_files_requires_a_date_selection() {
        assert!(Cli::try_parse_from(["cardvault", "files"]).is_err());
        assert!(Cli::try_parse_from(["cardvault", "files", "--from", "2024-03-01"]).is_err());
        assert!(Cli::try_parse_from([
            "cardvault", "files", "--date", "2024-03-01", "--from", "2024-03-01", "--to", "2024-03-02"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["cardvault", "files", "--date", "2024-3-1x"]).is_err());
        assert!(Cli::try_parse_from(["cardvault", "files", "--date", "2024-03-01", "--type", "png"]).is_err());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "cardvault",
            "show",
            "7",
            "--backup-dir",
            "/srv/archive",
            "--database-url",
            "sqlite:///srv/index.db",
        ])
        .unwrap();

        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.backup_dir, PathBuf::from("/srv/archive"));
        assert_eq!(config.database_url, "sqlite:///srv/index.db");
        assert_eq!(config.watch_dir, PathBuf::from("./sd_virtual"));
        assert!(matches!(cli.command, Some(Commands::Show { id: 7, .. })));
    }

    #[test]
    fn test_ingest_needs_paths() {
        assert!(Cli::try_parse_from(["cardvault", "ingest"]).is_err());
        let cli = Cli::try_parse_from(["cardvault", "ingest", "a.jpg", "b.wav"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Ingest { ref paths }) if paths.len() == 2));
    }
}
