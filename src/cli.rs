use std::path::PathBuf;

use clap::Parser;

use crate::workflow::RunOptions;

#[derive(Debug, Parser)]
#[command(name = "fatinject")]
#[command(about = "Add a file entry to a FAT12 disk image using caller-chosen clusters")]
pub struct Cli {
    /// Binary input image
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Output image; defaults to `<input>.<unix time>`
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Root-directory index (1-based); defaults to the next free slot
    #[arg(short = 'n', long = "index-number")]
    pub index_number: Option<u32>,
    /// Name of the file being added
    #[arg(short = 'f', long = "filename", default_value = "noname.ext")]
    pub filename: String,
    /// Quoted comma-delimited ranges, e.g. "33-143,1300-1704,2388-2779"
    #[arg(short = 'c', long = "clusters")]
    pub clusters: String,
    /// Keep the output image after a debug run without asking
    #[arg(short = 'r', long = "retain")]
    pub retain: bool,
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,
    /// Also dump every FAT entry update
    #[arg(short = 'e', long = "extra-debug")]
    pub extra_debug: bool,
    /// Skip the confirmation prompt
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Space-pad the name and extension to 8 and 3 bytes
    #[arg(long = "pad-names")]
    pub pad_names: bool,
}

impl Cli {
    pub fn debug_enabled(&self) -> bool {
        self.debug || self.extra_debug
    }

    pub fn into_run_options(self) -> RunOptions {
        RunOptions {
            input: self.input,
            output: self.output,
            index_number: self.index_number,
            filename: self.filename,
            clusters: self.clusters,
            retain: self.retain,
            extra_debug: self.extra_debug,
            pad_names: self.pad_names,
            config_path: self.config,
        }
    }
}
