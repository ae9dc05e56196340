use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use fat12::{
    directory,
    inject::{self, InjectOptions},
    table, DiskImage, Geometry,
};
use fs2::FileExt;
use tempfile::NamedTempFile;

use crate::{
    config::{self, FileConfig},
    logging::Logger,
    prompt::Confirm,
};

#[derive(Clone, Debug)]
pub struct RunOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub index_number: Option<u32>,
    pub filename: String,
    pub clusters: String,
    pub retain: bool,
    pub extra_debug: bool,
    pub pad_names: bool,
    pub config_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub slot_index: u16,
    pub start_cluster: u16,
    pub cluster_count: usize,
    pub size: u32,
    pub output_removed: bool,
}

/// `<input>.<unix seconds>` next to the input image.
pub fn default_output_path(input: &Path) -> PathBuf {
    let ts = Utc::now().timestamp();
    let mut raw = input.as_os_str().to_owned();
    raw.push(format!(".{ts}"));
    PathBuf::from(raw)
}

/// Resolves `path` through symlinks and `.`/`..`, allowing the file itself not to exist yet.
fn resolved_path(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return fs::canonicalize(path)
            .with_context(|| format!("failed to resolve {}", path.display()));
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .ok_or_else(|| anyhow!("output path {} has no file name", path.display()))?;
    match fs::canonicalize(parent) {
        Ok(parent) => Ok(parent.join(name)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

/// Reads the whole image under a shared lock, held until the caller drops the file.
fn read_image(path: &Path) -> Result<(File, Vec<u8>)> {
    let mut file = File::open(path)
        .with_context(|| format!("failed to open input image {}", path.display()))?;
    FileExt::lock_shared(&file)
        .with_context(|| format!("failed to lock input image {}", path.display()))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)
        .with_context(|| format!("failed to read input image {}", path.display()))?;
    Ok((file, bytes))
}

/// Writes `bytes` beside `path` and renames it into place, so a failed run never leaves a
/// half-written output.
fn commit_image(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut staged = NamedTempFile::new_in(&dir)
        .with_context(|| format!("failed to stage output in {}", dir.display()))?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    staged
        .persist(path)
        .map_err(|err| anyhow!("failed to write output image {}: {}", path.display(), err.error))?;
    Ok(())
}

fn inject_options(opts: &RunOptions, file_config: &FileConfig) -> InjectOptions {
    InjectOptions {
        slot: opts.index_number,
        mirror_fat2: file_config.inject.mirror_fat2,
        pad_names: opts.pad_names || file_config.inject.pad_names,
    }
}

fn verify(image: &DiskImage<'_>, geometry: &Geometry, report: &inject::InjectReport) -> Result<()> {
    let entry = directory::read_entry(image, geometry, report.slot)?;
    if entry.start_cluster != report.start_cluster || entry.size != report.size {
        bail!(
            "directory entry read back as start={} size={}, expected start={} size={}",
            entry.start_cluster,
            entry.size,
            report.start_cluster,
            report.size
        );
    }
    let walked = table::walk_chain_in_image(image, geometry, 0, report.start_cluster)?;
    if walked.len() != report.cluster_count {
        bail!(
            "FAT chain from cluster {} has {} clusters, expected {}",
            report.start_cluster,
            walked.len(),
            report.cluster_count
        );
    }
    Ok(())
}

pub fn run_inject(
    logger: &mut Logger,
    opts: RunOptions,
    confirm: &mut dyn Confirm,
) -> Result<RunOutcome> {
    let output_path = opts
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&opts.input));
    if resolved_path(&output_path)? == resolved_path(&opts.input)? {
        bail!("output path must differ from the input image");
    }

    let file_config = match &opts.config_path {
        Some(path) => config::load(path)?,
        None => FileConfig::default(),
    };

    let (input_file, mut bytes) = read_image(&opts.input)?;
    let (geometry, source) = config::resolve_geometry(logger, &file_config, &bytes)?;
    logger.debug(format!(
        "Geometry ({}): {} sectors x {} bytes, FAT1@{} FAT2@{} root@{} data clusters {}..={}",
        source.as_str(),
        geometry.max_sectors,
        geometry.sector_size,
        geometry.fat1_start_sector,
        geometry.fat2_start_sector,
        geometry.root_dir_start_sector,
        geometry.low_data_cluster(),
        geometry.high_data_cluster()
    ));

    let options = inject_options(&opts, &file_config);
    let mut image = DiskImage::new(&mut bytes, &geometry)?;
    let plan = inject::plan(&image, &geometry, &opts.filename, &opts.clusters, &options)?;

    if logger.debug_enabled() {
        logger.debug(format!(
            "{} [{:?} and {:?}] will be saved at index #{}",
            plan.name,
            plan.name.base(),
            plan.name.ext(),
            plan.slot.index()
        ));
        for range in &plan.ranges {
            logger.debug(format!(
                "Range {}-{} adds {} clusters",
                range.low,
                range.high,
                range.count()
            ));
        }
    } else {
        logger.info(format!(
            "Saving {} to directory index #{}",
            plan.name,
            plan.slot.index()
        ));
    }
    if !plan.slot_was_free {
        logger.warn(format!(
            "Directory index #{} is already in use and will be overwritten",
            plan.slot.index()
        ));
    }

    if !confirm.confirm("Would you like to continue?")? {
        bail!("not saving data");
    }

    let extra_debug = opts.extra_debug;
    let mut updates = Vec::new();
    let report = inject::apply(&mut image, &geometry, &plan, &options, |copy, update| {
        if extra_debug {
            updates.push(format!(
                "FAT{} cluster {} -> {:#05x} at group +{}: {:02x?} -> {:02x?}",
                copy + 1,
                update.cluster,
                update.next,
                update.group_offset,
                update.before,
                update.after
            ));
        }
    })
    .context("failed to write file entry into image")?;
    for line in updates {
        logger.debug(line);
    }

    verify(&image, &geometry, &report)?;
    logger.debug(format!(
        "Total size has been calculated as {} ({} clusters)",
        report.size, report.cluster_count
    ));

    commit_image(&output_path, &bytes)?;
    drop(input_file);
    logger.info(format!(
        "{} written to root directory index #{} in {}",
        report.name,
        report.slot.index(),
        output_path.display()
    ));

    let mut output_removed = false;
    if logger.debug_enabled() {
        if opts.retain {
            logger.info("-r passed in. Not removing output file.");
        } else if confirm.confirm("Would you like me to remove the output file?")? {
            fs::remove_file(&output_path)
                .with_context(|| format!("failed to remove {}", output_path.display()))?;
            logger.info("Removing output file");
            output_removed = true;
        } else {
            logger.info("Not removing output file");
        }
    }

    Ok(RunOutcome {
        output_path,
        slot_index: report.slot.index(),
        start_cluster: report.start_cluster,
        cluster_count: report.cluster_count,
        size: report.size,
        output_removed,
    })
}
