use crate::{
    error::Fat12Error,
    geometry::Geometry,
    image::DiskImage,
    short_name::{ShortName, BASE_MAX, EXT_MAX},
};

/// 1-based index of a root-directory slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirectorySlot(u16);

impl DirectorySlot {
    pub fn new(index: u32, geometry: &Geometry) -> Result<Self, Fat12Error> {
        if index == 0 || index > geometry.root_entries as u32 {
            return Err(Fat12Error::InvalidDirectoryIndex(index));
        }
        Ok(Self(index as u16))
    }

    pub fn index(self) -> u16 {
        self.0
    }

    pub fn offset(self, geometry: &Geometry) -> usize {
        geometry.root_dir_offset() + (self.0 as usize - 1) * Geometry::DIR_ENTRY_SIZE
    }
}

/// What gets written into a slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: ShortName,
    pub start_cluster: u16,
    pub size: u32,
}

/// The fields of a slot as they sit in the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDirEntry {
    pub name: [u8; BASE_MAX],
    pub ext: [u8; EXT_MAX],
    pub start_cluster: u16,
    pub size: u32,
}

/// A slot is free when its starting-cluster field is zero.
pub fn slot_is_free(
    image: &DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
) -> Result<bool, Fat12Error> {
    let start = image.read_u16_le(slot.offset(geometry) + Geometry::START_CLUSTER_OFFSET)?;
    Ok(start == 0)
}

/// First free slot, scanning from index 1.
pub fn find_free_slot(image: &DiskImage<'_>, geometry: &Geometry) -> Result<DirectorySlot, Fat12Error> {
    for index in 1..=geometry.root_entries as u32 {
        let slot = DirectorySlot::new(index, geometry)?;
        if slot_is_free(image, geometry, slot)? {
            return Ok(slot);
        }
    }
    Err(Fat12Error::DirectoryFull)
}

/// Writes the name and extension. Unpadded names only touch as many bytes as they hold.
pub fn write_name(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
    name: &ShortName,
    pad: bool,
) -> Result<(), Fat12Error> {
    let base = slot.offset(geometry);
    if pad {
        return image.write(base + Geometry::NAME_OFFSET, &name.padded());
    }
    image.write(base + Geometry::NAME_OFFSET, name.base())?;
    image.write(base + Geometry::EXT_OFFSET, name.ext())
}

pub fn write_size(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
    size: u32,
) -> Result<(), Fat12Error> {
    image.write_u32_le(slot.offset(geometry) + Geometry::SIZE_OFFSET, size)
}

pub fn write_start_cluster(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
    cluster: u16,
) -> Result<(), Fat12Error> {
    image.write_u16_le(slot.offset(geometry) + Geometry::START_CLUSTER_OFFSET, cluster)
}

pub fn write_entry(
    image: &mut DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
    entry: &DirectoryEntry,
    pad: bool,
) -> Result<(), Fat12Error> {
    write_name(image, geometry, slot, &entry.name, pad)?;
    write_size(image, geometry, slot, entry.size)?;
    write_start_cluster(image, geometry, slot, entry.start_cluster)
}

pub fn read_entry(
    image: &DiskImage<'_>,
    geometry: &Geometry,
    slot: DirectorySlot,
) -> Result<RawDirEntry, Fat12Error> {
    let base = slot.offset(geometry);
    let mut name = [0u8; BASE_MAX];
    name.copy_from_slice(image.read(base + Geometry::NAME_OFFSET, BASE_MAX)?);
    let mut ext = [0u8; EXT_MAX];
    ext.copy_from_slice(image.read(base + Geometry::EXT_OFFSET, EXT_MAX)?);
    Ok(RawDirEntry {
        name,
        ext,
        start_cluster: image.read_u16_le(base + Geometry::START_CLUSTER_OFFSET)?,
        size: image.read_u32_le(base + Geometry::SIZE_OFFSET)?,
    })
}
