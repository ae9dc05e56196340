pub mod cli;
pub mod config;
pub mod env_utils;
pub mod logging;
pub mod prompt;
pub mod workflow;
