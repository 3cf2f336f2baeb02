/// Configuration for the CLI binary
use crate::error::{FiresideError, Result};
use std::path::PathBuf;

const DEFAULT_DATA_DIR: &str = ".fireside";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory for the local document store
    pub data_dir: PathBuf,

    /// Subcommand and its arguments, flags stripped
    pub command: Vec<String>,
}

impl Config {
    /// Parse command line arguments: `fireside [--data-dir <path>] <command> [args]`
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut data_dir: Option<PathBuf> = None;
        let mut command = Vec::new();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--data-dir" => {
                    let path = args.get(i + 1).ok_or_else(|| {
                        FiresideError::Config("--data-dir requires a path argument".to_string())
                    })?;
                    data_dir = Some(PathBuf::from(path));
                    i += 2;
                }
                other => {
                    command.push(other.to_string());
                    i += 1;
                }
            }
        }

        // Env override (nice for scripts)
        if data_dir.is_none() {
            if let Ok(dir) = std::env::var("FIRESIDE_DATA_DIR") {
                data_dir = Some(PathBuf::from(dir));
            }
        }

        Ok(Self {
            data_dir: data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            command,
        })
    }
}
