use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

/// Yes/no gate the workflow asks before writing and before deleting output.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Answers yes to everything (`--yes` or `FATINJECT_ASSUME_YES=1`).
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _question: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Asks `[y/n]` until it gets one of the two. End of input counts as no.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl LinePrompt<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Confirm for LinePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question} [y/n] ")?;
            self.output.flush()?;

            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .context("failed to read confirmation")?;
            if read == 0 {
                return Ok(false);
            }
            match line.trim().to_ascii_uppercase().as_str() {
                "Y" => return Ok(true),
                "N" => return Ok(false),
                _ => continue,
            }
        }
    }
}
