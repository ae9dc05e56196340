use crate::error::Fat12Error;

const BOOT_SIGNATURE_OFFSET: usize = 510;
const BOOT_SECTOR_MIN: usize = 512;

/// Layout of a FAT12 image where one cluster is one sector.
///
/// The default value describes a 1.44 MB floppy: 2880 sectors of 512 bytes, FAT1 at
/// sector 1, FAT2 at sector 10 and a 224-entry root directory at sector 19.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub sector_size: u16,
    pub max_sectors: u32,
    pub fat1_start_sector: u32,
    pub fat2_start_sector: u32,
    pub root_dir_start_sector: u32,
    pub root_entries: u16,
    pub fat_count: u8,
}

impl Geometry {
    pub const DIR_ENTRY_SIZE: usize = 32;
    pub const NAME_OFFSET: usize = 0;
    pub const EXT_OFFSET: usize = 8;
    pub const START_CLUSTER_OFFSET: usize = 26;
    pub const SIZE_OFFSET: usize = 28;
    pub const LOW_DATA_CLUSTER: u32 = 2;

    pub const FLOPPY_1440K: Self = Self {
        sector_size: 512,
        max_sectors: 2880,
        fat1_start_sector: 1,
        fat2_start_sector: 10,
        root_dir_start_sector: 19,
        root_entries: 224,
        fat_count: 2,
    };

    /// Reads the BIOS parameter block of `boot` (the first sector of the image).
    pub fn from_boot_sector(boot: &[u8]) -> Result<Self, Fat12Error> {
        if boot.len() < BOOT_SECTOR_MIN {
            return Err(Fat12Error::InvalidGeometry("boot sector is truncated"));
        }
        if boot[BOOT_SIGNATURE_OFFSET] != 0x55 || boot[BOOT_SIGNATURE_OFFSET + 1] != 0xAA {
            return Err(Fat12Error::InvalidGeometry("missing 0x55AA boot signature"));
        }

        let sector_size = u16::from_le_bytes([boot[11], boot[12]]);
        let sectors_per_cluster = boot[13];
        let reserved_sectors = u16::from_le_bytes([boot[14], boot[15]]) as u32;
        let fat_count = boot[16];
        let root_entries = u16::from_le_bytes([boot[17], boot[18]]);
        let total16 = u16::from_le_bytes([boot[19], boot[20]]) as u32;
        let fat_sectors = u16::from_le_bytes([boot[22], boot[23]]) as u32;
        let max_sectors = if total16 != 0 {
            total16
        } else {
            u32::from_le_bytes([boot[32], boot[33], boot[34], boot[35]])
        };

        if sectors_per_cluster != 1 {
            return Err(Fat12Error::InvalidGeometry("only one sector per cluster is supported"));
        }
        if reserved_sectors == 0 || fat_sectors == 0 {
            return Err(Fat12Error::InvalidGeometry("zero reserved or FAT sectors"));
        }
        if fat_count == 0 || fat_count > 2 {
            return Err(Fat12Error::InvalidGeometry("FAT count must be 1 or 2"));
        }

        let geometry = Self {
            sector_size,
            max_sectors,
            fat1_start_sector: reserved_sectors,
            fat2_start_sector: reserved_sectors + fat_sectors,
            root_dir_start_sector: reserved_sectors + fat_sectors * fat_count as u32,
            root_entries,
            fat_count,
        };
        geometry.validate()?;
        Ok(geometry)
    }

    pub fn validate(&self) -> Result<(), Fat12Error> {
        let sector_size = self.sector_size as usize;
        if sector_size == 0 || sector_size % Self::DIR_ENTRY_SIZE != 0 {
            return Err(Fat12Error::InvalidGeometry(
                "sector size must be a non-zero multiple of 32",
            ));
        }
        if self.root_entries == 0 {
            return Err(Fat12Error::InvalidGeometry("root directory has no entries"));
        }
        if self.fat_count == 0 || self.fat_count > 2 {
            return Err(Fat12Error::InvalidGeometry("FAT count must be 1 or 2"));
        }
        if self.fat1_start_sector == 0 || self.fat2_start_sector <= self.fat1_start_sector {
            return Err(Fat12Error::InvalidGeometry("FAT2 must start after FAT1"));
        }
        let fat_end = if self.fat_count == 2 {
            self.fat2_start_sector.checked_add(self.fat_sectors())
        } else {
            Some(self.fat2_start_sector)
        }
        .ok_or(Fat12Error::InvalidGeometry("FAT region overflows the sector range"))?;
        if self.root_dir_start_sector < fat_end {
            return Err(Fat12Error::InvalidGeometry("root directory overlaps the FAT"));
        }
        let data_start = self
            .root_dir_start_sector
            .checked_add(self.root_dir_sectors())
            .ok_or(Fat12Error::InvalidGeometry("root directory overflows the sector range"))?;
        if data_start >= self.max_sectors {
            return Err(Fat12Error::InvalidGeometry("no room for a data region"));
        }
        if self.high_data_cluster() >= 0xFF0 {
            return Err(Fat12Error::InvalidGeometry("too many clusters for FAT12"));
        }
        let needed = (self.high_data_cluster() as usize / 2) * 3 + 3;
        if needed > self.fat_len() {
            return Err(Fat12Error::InvalidGeometry("FAT is too small for the data region"));
        }
        Ok(())
    }

    pub fn image_len(&self) -> usize {
        (self.max_sectors as usize).saturating_mul(self.sector_size as usize)
    }

    pub fn fat_sectors(&self) -> u32 {
        self.fat2_start_sector.saturating_sub(self.fat1_start_sector)
    }

    pub fn fat_len(&self) -> usize {
        (self.fat_sectors() as usize).saturating_mul(self.sector_size as usize)
    }

    /// Byte offset of FAT copy `copy` (0 for FAT1, 1 for FAT2).
    pub fn fat_offset(&self, copy: u8) -> usize {
        let start = if copy == 0 {
            self.fat1_start_sector
        } else {
            self.fat2_start_sector
        };
        (start as usize).saturating_mul(self.sector_size as usize)
    }

    pub fn root_dir_offset(&self) -> usize {
        (self.root_dir_start_sector as usize).saturating_mul(self.sector_size as usize)
    }

    pub fn root_dir_sectors(&self) -> u32 {
        let bytes = self.root_entries as u32 * Self::DIR_ENTRY_SIZE as u32;
        bytes.div_ceil((self.sector_size as u32).max(1))
    }

    pub fn data_start_sector(&self) -> u32 {
        self.root_dir_start_sector
            .saturating_add(self.root_dir_sectors())
    }

    pub fn low_data_cluster(&self) -> u32 {
        Self::LOW_DATA_CLUSTER
    }

    /// Highest cluster a caller may hand in. Equals `max_sectors - 31` for the floppy layout.
    pub fn high_data_cluster(&self) -> u32 {
        self.max_sectors
            .saturating_add(Self::LOW_DATA_CLUSTER)
            .saturating_sub(self.data_start_sector())
    }

    pub fn cluster_size(&self) -> u32 {
        self.sector_size as u32
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::FLOPPY_1440K
    }
}
