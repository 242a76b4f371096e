// Command-line configuration.
// Every flag can also come from the environment so the data directory can
// be pinned once per shell.

use clap::{ArgAction, Parser};
use std::path::PathBuf;

pub const DATA_DIR_ENV: &str = "SCHOOL_RECORDS_DATA_DIR";
const APP_DIR: &str = "school-records";

#[derive(Parser, Debug)]
#[command(name = "school-records")]
#[command(about = "Manage students, courses and enrollments from the terminal")]
#[command(version)]
pub struct Cli {
    #[arg(long, env = DATA_DIR_ENV, help = "Directory holding the record files")]
    pub data_dir: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Directory of the record store: the flag, else the platform data dir.
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// `<data_local_dir>/school-records`, or `./data` when the platform has no
/// data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("data"))
}
