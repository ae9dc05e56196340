use std::{
    fs::{self, File, OpenOptions},
    io::Write,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use serde_json::json;

pub const LOG_JSON_PATH_ENV: &str = "FATINJECT_LOG_JSON_PATH";

/// Console logger with an optional JSON-lines mirror.
pub struct Logger {
    json_file: Option<File>,
    debug: bool,
}

impl Logger {
    pub fn from_env(debug: bool) -> Result<Self> {
        let path = std::env::var(LOG_JSON_PATH_ENV).ok();
        Self::new(path.map(PathBuf::from), debug)
    }

    pub fn new(path: Option<PathBuf>, debug: bool) -> Result<Self> {
        let json_file = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open log file {}", path.display()))?;
                Some(file)
            }
            None => None,
        };
        Ok(Self { json_file, debug })
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn debug(&mut self, message: impl AsRef<str>) {
        if !self.debug {
            return;
        }
        println!("{}", message.as_ref());
        self.event("debug", message.as_ref());
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        println!("{}", message.as_ref());
        self.event("info", message.as_ref());
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
        self.event("warn", message.as_ref());
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        eprintln!("{}", message.as_ref());
        self.event("error", message.as_ref());
    }

    fn event(&mut self, level: &str, message: &str) {
        let Some(file) = &mut self.json_file else {
            return;
        };

        let ts_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let entry = json!({
            "ts_ms": ts_ms,
            "level": level,
            "msg": message,
        });

        let _ = writeln!(file, "{}", entry);
        let _ = file.flush();
    }
}
