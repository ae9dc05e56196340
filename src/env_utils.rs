use anyhow::{anyhow, Result};

pub const ASSUME_YES_ENV: &str = "FATINJECT_ASSUME_YES";

pub fn parse_env_bool01(name: &str, default: bool) -> Result<bool> {
    match std::env::var(name) {
        Ok(raw) => parse_bool01(name, raw.trim()),
        Err(std::env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(anyhow!("{name} invalid: {err}")),
    }
}

fn parse_bool01(name: &str, raw: &str) -> Result<bool> {
    match raw {
        "0" => Ok(false),
        "1" => Ok(true),
        _ => Err(anyhow!("{name} must be 0 or 1")),
    }
}

pub fn assume_yes_from_env() -> Result<bool> {
    parse_env_bool01(ASSUME_YES_ENV, false)
}
