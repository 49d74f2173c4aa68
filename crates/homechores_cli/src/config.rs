use anyhow::{Context, Result};
use homechores_core::{default_log_level, LogSettings};
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;

/// Runtime configuration resolved from flags and environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// `None` disables file logging.
    pub log: Option<LogSettings>,
    pub json: bool,
}

impl AppConfig {
    pub fn from_args(args: &CliArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        Self::resolve(args, &cwd)
    }

    fn resolve(args: &CliArgs, cwd: &Path) -> Result<Self> {
        let log = match &args.log_dir {
            Some(dir) => {
                let level = args.log_level.as_deref().unwrap_or(default_log_level());
                let dir = absolutize(dir, cwd);
                Some(LogSettings::new(level, &dir).with_context(|| {
                    format!("invalid logging settings for `{}`", dir.display())
                })?)
            }
            None => None,
        };

        Ok(Self {
            db_path: args.db.clone(),
            log,
            json: args.json,
        })
    }
}

fn absolutize(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}
