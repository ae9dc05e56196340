use alloc::{string::String, vec::Vec};

use crate::{
    clusters::{parse_ranges, ClusterChain, ClusterRange},
    directory::{self, DirectoryEntry, DirectorySlot},
    error::Fat12Error,
    geometry::Geometry,
    image::DiskImage,
    short_name::ShortName,
    table::{self, EntryUpdate},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InjectOptions {
    /// Use this 1-based root-directory index instead of the first free one.
    pub slot: Option<u32>,
    pub mirror_fat2: bool,
    pub pad_names: bool,
}

impl Default for InjectOptions {
    fn default() -> Self {
        Self {
            slot: None,
            mirror_fat2: true,
            pad_names: false,
        }
    }
}

/// Everything decided before the first byte is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectPlan {
    pub slot: DirectorySlot,
    pub slot_was_free: bool,
    pub name: ShortName,
    pub ranges: Vec<ClusterRange>,
    pub chain: ClusterChain,
    pub size: u32,
}

impl InjectPlan {
    pub fn start_cluster(&self) -> Result<u16, Fat12Error> {
        self.chain.first().ok_or(Fat12Error::InvalidClusterRange {
            range: String::new(),
            reason: "no clusters to link",
        })
    }

    /// The directory entry this plan writes into [`InjectPlan::slot`].
    pub fn entry(&self) -> Result<DirectoryEntry, Fat12Error> {
        Ok(DirectoryEntry {
            name: self.name.clone(),
            start_cluster: self.start_cluster()?,
            size: self.size,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectReport {
    pub slot: DirectorySlot,
    pub name: ShortName,
    pub start_cluster: u16,
    pub cluster_count: usize,
    pub size: u32,
}

/// Validates the ranges, picks the slot and encodes the name. Does not touch the image.
pub fn plan(
    image: &DiskImage<'_>,
    geometry: &Geometry,
    filename: &str,
    clusters: &str,
    options: &InjectOptions,
) -> Result<InjectPlan, Fat12Error> {
    let ranges = parse_ranges(clusters, geometry)?;

    let slot = match options.slot {
        Some(index) => DirectorySlot::new(index, geometry)?,
        None => directory::find_free_slot(image, geometry)?,
    };
    let slot_was_free = directory::slot_is_free(image, geometry, slot)?;

    let name = ShortName::encode(filename)?;
    let chain = ClusterChain::build(&ranges);
    let size = chain.size_bytes(geometry);

    Ok(InjectPlan {
        slot,
        slot_was_free,
        name,
        ranges,
        chain,
        size,
    })
}

/// Writes name, size, starting cluster and FAT chain in that order.
///
/// Stops at the first failing write. Earlier writes stay in the image.
pub fn apply(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    plan: &InjectPlan,
    options: &InjectOptions,
    observe: impl FnMut(u8, &EntryUpdate),
) -> Result<InjectReport, Fat12Error> {
    let entry = plan.entry()?;

    directory::write_entry(image, geometry, plan.slot, &entry, options.pad_names)?;
    table::write_chain_to_image(image, geometry, &plan.chain, options.mirror_fat2, observe)?;

    Ok(InjectReport {
        slot: plan.slot,
        name: entry.name,
        start_cluster: entry.start_cluster,
        cluster_count: plan.chain.len(),
        size: plan.size,
    })
}

pub fn inject(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    filename: &str,
    clusters: &str,
    options: &InjectOptions,
) -> Result<InjectReport, Fat12Error> {
    let plan = plan(image, geometry, filename, clusters, options)?;
    apply(image, geometry, &plan, options, |_, _| {})
}
