use std::{collections::VecDeque, fs, path::Path};

use anyhow::{anyhow, Result};
use fat12::{directory, table, DirectorySlot, DiskImage, Geometry, FAT12_EOC};
use fatinject::{
    logging::Logger,
    prompt::{AssumeYes, Confirm},
    workflow::{run_inject, RunOptions},
};
use tempfile::tempdir;

struct Scripted {
    answers: VecDeque<bool>,
    asked: Vec<String>,
}

impl Scripted {
    fn new(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for Scripted {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected question: {question}"))
    }
}

fn write_blank_image(path: &Path) -> Result<()> {
    fs::write(path, vec![0u8; Geometry::default().image_len()])?;
    Ok(())
}

fn options(input: &Path, output: &Path, clusters: &str) -> RunOptions {
    RunOptions {
        input: input.to_path_buf(),
        output: Some(output.to_path_buf()),
        index_number: None,
        filename: "report.txt".to_string(),
        clusters: clusters.to_string(),
        retain: false,
        extra_debug: false,
        pad_names: false,
        config_path: None,
    }
}

fn quiet_logger() -> Result<Logger> {
    Logger::new(None, false)
}

#[test]
fn two_ranges_produce_readable_entry_and_chain() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("floppy.out.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    let outcome = run_inject(
        &mut logger,
        options(&input, &output, "33-143,1300-1704"),
        &mut AssumeYes,
    )?;
    assert_eq!(outcome.slot_index, 1);
    assert_eq!(outcome.cluster_count, 516);
    assert_eq!(outcome.size, 264_192);
    assert!(!outcome.output_removed);

    let g = Geometry::default();
    let mut bytes = fs::read(&output)?;
    let image = DiskImage::new(&mut bytes, &g)?;
    let slot = DirectorySlot::new(1, &g)?;
    let entry = directory::read_entry(&image, &g, slot)?;
    assert_eq!(entry.size, 264_192);
    assert_eq!(entry.start_cluster, 33);
    assert_eq!(&entry.name[..6], b"report");
    assert_eq!(&entry.ext, b"txt");

    let chain = table::walk_chain_in_image(&image, &g, 0, 33)?;
    assert_eq!(chain.len(), 516);
    assert_eq!(chain.last().copied(), Some(1704));
    assert_eq!(table::walk_chain_in_image(&image, &g, 1, 33)?, chain);

    let input_bytes = fs::read(&input)?;
    assert!(input_bytes.iter().all(|&b| b == 0), "input must stay untouched");
    Ok(())
}

#[test]
fn next_free_slot_follows_existing_entries() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    write_blank_image(&input)?;

    let g = Geometry::default();
    let mut bytes = fs::read(&input)?;
    {
        let mut image = DiskImage::new(&mut bytes, &g)?;
        for index in 1..=2 {
            let slot = DirectorySlot::new(index, &g)?;
            directory::write_start_cluster(&mut image, &g, slot, 500 + index as u16)?;
        }
    }
    fs::write(&input, &bytes)?;

    let mut logger = quiet_logger()?;
    let outcome = run_inject(&mut logger, options(&input, &output, "40-41"), &mut AssumeYes)?;
    assert_eq!(outcome.slot_index, 3);
    Ok(())
}

#[test]
fn invalid_range_writes_no_output() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    let mut confirm = Scripted::new(&[]);
    let err = run_inject(
        &mut logger,
        options(&input, &output, "1-100"),
        &mut confirm,
    )
    .expect_err("range below the data area must fail");
    assert!(format!("{err:#}").contains("invalid cluster range `1-100`"));
    assert!(confirm.asked.is_empty(), "validation happens before the prompt");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn declining_the_prompt_writes_nothing() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    let mut confirm = Scripted::new(&[false]);
    let err = run_inject(&mut logger, options(&input, &output, "40-41"), &mut confirm)
        .expect_err("declined run must fail");
    assert_eq!(err.to_string(), "not saving data");
    assert!(!output.exists());
    Ok(())
}

#[test]
fn full_directory_is_reported() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    write_blank_image(&input)?;

    let g = Geometry::default();
    let mut bytes = fs::read(&input)?;
    {
        let mut image = DiskImage::new(&mut bytes, &g)?;
        for index in 1..=u32::from(g.root_entries) {
            let slot = DirectorySlot::new(index, &g)?;
            directory::write_start_cluster(&mut image, &g, slot, 2)?;
        }
    }
    fs::write(&input, &bytes)?;

    let mut logger = quiet_logger()?;
    let err = run_inject(&mut logger, options(&input, &output, "40-41"), &mut AssumeYes)
        .expect_err("full directory must fail");
    assert!(err.to_string().contains("root directory is full"));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn explicit_index_over_occupied_slot_and_padded_name() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let first = temp.path().join("first.img");
    let second = temp.path().join("second.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    run_inject(&mut logger, options(&input, &first, "40-41"), &mut AssumeYes)?;

    let mut opts = options(&first, &second, "60-62");
    opts.index_number = Some(1);
    opts.filename = "notes.md".to_string();
    opts.pad_names = true;
    let outcome = run_inject(&mut logger, opts, &mut AssumeYes)?;
    assert_eq!(outcome.slot_index, 1);

    let g = Geometry::default();
    let mut bytes = fs::read(&second)?;
    let image = DiskImage::new(&mut bytes, &g)?;
    let entry = directory::read_entry(&image, &g, DirectorySlot::new(1, &g)?)?;
    assert_eq!(&entry.name, b"notes   ");
    assert_eq!(&entry.ext, b"md ");
    assert_eq!(entry.start_cluster, 60);
    assert_eq!(entry.size, 3 * 512);
    Ok(())
}

#[test]
fn config_can_disable_fat2_mirror() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    let config = temp.path().join("fatinject.toml");
    write_blank_image(&input)?;
    fs::write(&config, "[inject]\nmirror_fat2 = false\n")?;

    let mut opts = options(&input, &output, "100-101");
    opts.config_path = Some(config);
    let mut logger = quiet_logger()?;
    run_inject(&mut logger, opts, &mut AssumeYes)?;

    let g = Geometry::default();
    let mut bytes = fs::read(&output)?;
    let image = DiskImage::new(&mut bytes, &g)?;
    assert_eq!(table::walk_chain_in_image(&image, &g, 0, 100)?, vec![100, 101]);
    let fat2 = image.read(g.fat_offset(1), g.fat_len())?;
    assert!(fat2.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn debug_run_can_remove_or_retain_output() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let removed = temp.path().join("removed.img");
    let kept = temp.path().join("kept.img");
    write_blank_image(&input)?;

    let mut logger = Logger::new(None, true)?;
    let mut confirm = Scripted::new(&[true, true]);
    let outcome = run_inject(&mut logger, options(&input, &removed, "40-41"), &mut confirm)?;
    assert!(outcome.output_removed);
    assert!(!removed.exists());
    assert_eq!(confirm.asked.len(), 2);

    let mut opts = options(&input, &kept, "40-41");
    opts.retain = true;
    opts.extra_debug = true;
    let mut confirm = Scripted::new(&[true]);
    let outcome = run_inject(&mut logger, opts, &mut confirm)?;
    assert!(!outcome.output_removed);
    assert!(kept.exists());
    Ok(())
}

#[test]
fn output_must_differ_from_input() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    let err = run_inject(&mut logger, options(&input, &input, "40-41"), &mut AssumeYes)
        .expect_err("in-place write must be refused");
    assert!(err.to_string().contains("must differ"));

    let aliased = temp.path().join(".").join("floppy.img");
    let err = run_inject(&mut logger, options(&input, &aliased, "40-41"), &mut AssumeYes)
        .expect_err("aliased in-place write must be refused");
    assert!(err.to_string().contains("must differ"));
    assert!(fs::read(&input)?.iter().all(|&b| b == 0));
    Ok(())
}

#[test]
fn single_cluster_at_upper_bound_ends_chain() -> Result<()> {
    let temp = tempdir()?;
    let input = temp.path().join("floppy.img");
    let output = temp.path().join("out.img");
    write_blank_image(&input)?;

    let mut logger = quiet_logger()?;
    run_inject(&mut logger, options(&input, &output, "2849-2849"), &mut AssumeYes)?;

    let g = Geometry::default();
    let bytes = fs::read(&output)?;
    let fat1 = &bytes[g.fat_offset(0)..g.fat_offset(0) + g.fat_len()];
    let group = table::group_offset(2849);
    let entry = table::decode_entry([fat1[group], fat1[group + 1], fat1[group + 2]], 2849);
    assert_eq!(entry, FAT12_EOC);
    Ok(())
}
