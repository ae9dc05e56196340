//! FAT12 entry codec.
//!
//! Two 12-bit entries share every 3-byte group of the table. Viewing the group as a
//! little-endian 24-bit integer, the even cluster of the pair owns the low 12 bits (all of
//! byte 0 plus the low nibble of byte 1) and the odd cluster owns the high 12 bits (the high
//! nibble of byte 1 plus all of byte 2). Updates are read-modify-write on the whole group so
//! the neighbouring entry keeps its bits.

use alloc::vec::Vec;

use crate::{
    clusters::ClusterChain,
    error::Fat12Error,
    geometry::Geometry,
    image::DiskImage,
};

pub const FAT12_EOC: u16 = 0xFFF;
pub const FAT12_ENTRY_MASK: u32 = 0xFFF;
const FAT12_EOC_MIN: u16 = 0xFF8;
const GROUP_LEN: usize = 3;

/// Offset of the 3-byte group holding `cluster`, relative to the start of the table.
pub fn group_offset(cluster: u32) -> usize {
    (cluster as usize / 2) * GROUP_LEN
}

fn unpack(group: [u8; GROUP_LEN]) -> u32 {
    u32::from_le_bytes([group[0], group[1], group[2], 0])
}

fn pack(value: u32) -> [u8; GROUP_LEN] {
    let bytes = value.to_le_bytes();
    [bytes[0], bytes[1], bytes[2]]
}

pub fn decode_entry(group: [u8; GROUP_LEN], cluster: u32) -> u16 {
    let packed = unpack(group);
    let value = if cluster % 2 == 0 {
        packed & FAT12_ENTRY_MASK
    } else {
        packed >> 12
    };
    value as u16
}

pub fn encode_entry(group: [u8; GROUP_LEN], cluster: u32, value: u16) -> [u8; GROUP_LEN] {
    let packed = unpack(group);
    let value = value as u32 & FAT12_ENTRY_MASK;
    let packed = if cluster % 2 == 0 {
        (packed & (FAT12_ENTRY_MASK << 12)) | value
    } else {
        (packed & FAT12_ENTRY_MASK) | (value << 12)
    };
    pack(packed)
}

/// One applied table write, reported to the observer of [`FatTable::write_chain_with`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryUpdate {
    pub cluster: u16,
    pub next: u16,
    pub group_offset: usize,
    pub before: [u8; GROUP_LEN],
    pub after: [u8; GROUP_LEN],
}

/// A single FAT copy.
pub struct FatTable<'a> {
    bytes: &'a mut [u8],
}

impl<'a> FatTable<'a> {
    pub fn new(bytes: &'a mut [u8]) -> Self {
        Self { bytes }
    }

    /// Number of entries whose whole 3-byte group lies inside the table.
    pub fn entry_count(&self) -> u32 {
        (self.bytes.len() / GROUP_LEN * 2) as u32
    }

    fn group(&self, cluster: u32) -> Result<(usize, [u8; GROUP_LEN]), Fat12Error> {
        if cluster >= self.entry_count() {
            return Err(Fat12Error::ClusterOutOfRange(cluster));
        }
        let offset = group_offset(cluster);
        let raw = &self.bytes[offset..offset + GROUP_LEN];
        Ok((offset, [raw[0], raw[1], raw[2]]))
    }

    pub fn get(&self, cluster: u32) -> Result<u16, Fat12Error> {
        let (_, group) = self.group(cluster)?;
        Ok(decode_entry(group, cluster))
    }

    pub fn set(&mut self, cluster: u32, value: u16) -> Result<(), Fat12Error> {
        self.update(cluster, value).map(|_| ())
    }

    fn update(&mut self, cluster: u32, value: u16) -> Result<(usize, [u8; 3], [u8; 3]), Fat12Error> {
        if value as u32 > FAT12_ENTRY_MASK {
            return Err(Fat12Error::EntryValueTooLarge(value));
        }
        let (offset, before) = self.group(cluster)?;
        let after = encode_entry(before, cluster, value);
        self.bytes[offset..offset + GROUP_LEN].copy_from_slice(&after);
        Ok((offset, before, after))
    }

    /// Stores each cluster's successor; the last cluster gets [`FAT12_EOC`]. The first
    /// cluster is not recorded here, it belongs to the directory entry.
    pub fn write_chain(&mut self, chain: &ClusterChain) -> Result<(), Fat12Error> {
        self.write_chain_with(chain, |_| {})
    }

    pub fn write_chain_with(
        &mut self,
        chain: &ClusterChain,
        mut observe: impl FnMut(&EntryUpdate),
    ) -> Result<(), Fat12Error> {
        for (cluster, next) in chain.links() {
            let (group_offset, before, after) = self.update(cluster as u32, next)?;
            observe(&EntryUpdate {
                cluster,
                next,
                group_offset,
                before,
                after,
            });
        }
        Ok(())
    }

    /// Follows the chain from `start` until an end-of-chain marker.
    ///
    /// Free, reserved or out-of-table links and chains longer than the table are reported
    /// as [`Fat12Error::BrokenChain`].
    pub fn walk_chain(&self, start: u16) -> Result<Vec<u16>, Fat12Error> {
        let limit = self.entry_count() as usize;
        let mut out = Vec::new();
        let mut cluster = start;
        loop {
            out.push(cluster);
            let value = self.get(cluster as u32)?;
            if value >= FAT12_EOC_MIN {
                return Ok(out);
            }
            let bad_link =
                value < Geometry::LOW_DATA_CLUSTER as u16 || value as u32 >= self.entry_count();
            if bad_link || out.len() >= limit {
                return Err(Fat12Error::BrokenChain { cluster, value });
            }
            cluster = value;
        }
    }
}

/// Writes `chain` into FAT1 and, when `mirror` is set and the layout has two copies, FAT2.
pub fn write_chain_to_image(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    chain: &ClusterChain,
    mirror: bool,
    mut observe: impl FnMut(u8, &EntryUpdate),
) -> Result<(), Fat12Error> {
    let copies = if mirror { geometry.fat_count } else { 1 };
    for copy in 0..copies {
        let region = image.region_mut(geometry.fat_offset(copy), geometry.fat_len())?;
        FatTable::new(region).write_chain_with(chain, |update| observe(copy, update))?;
    }
    Ok(())
}

/// Read-only counterpart of [`write_chain_to_image`] for one FAT copy.
pub fn walk_chain_in_image(
    image: &DiskImage<'_>,
    geometry: &Geometry,
    copy: u8,
    start: u16,
) -> Result<Vec<u16>, Fat12Error> {
    let mut region = Vec::from(image.read(geometry.fat_offset(copy), geometry.fat_len())?);
    FatTable::new(&mut region).walk_chain(start)
}
