use std::{fs, path::Path};

use anyhow::{Context, Result};
use fat12::Geometry;
use serde::Deserialize;

use crate::logging::Logger;

/// Optional TOML file given with `--config`.
///
/// ```toml
/// [geometry]
/// max_sectors = 1440
///
/// [inject]
/// mirror_fat2 = false
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub geometry: Option<GeometryOverrides>,
    #[serde(default)]
    pub inject: InjectSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GeometryOverrides {
    pub sector_size: Option<u16>,
    pub max_sectors: Option<u32>,
    pub fat1_start_sector: Option<u32>,
    pub fat2_start_sector: Option<u32>,
    pub root_dir_start_sector: Option<u32>,
    pub root_entries: Option<u16>,
    pub fat_count: Option<u8>,
}

impl GeometryOverrides {
    pub fn apply(&self, base: Geometry) -> Geometry {
        Geometry {
            sector_size: self.sector_size.unwrap_or(base.sector_size),
            max_sectors: self.max_sectors.unwrap_or(base.max_sectors),
            fat1_start_sector: self.fat1_start_sector.unwrap_or(base.fat1_start_sector),
            fat2_start_sector: self.fat2_start_sector.unwrap_or(base.fat2_start_sector),
            root_dir_start_sector: self
                .root_dir_start_sector
                .unwrap_or(base.root_dir_start_sector),
            root_entries: self.root_entries.unwrap_or(base.root_entries),
            fat_count: self.fat_count.unwrap_or(base.fat_count),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InjectSection {
    pub mirror_fat2: bool,
    pub pad_names: bool,
}

impl Default for InjectSection {
    fn default() -> Self {
        Self {
            mirror_fat2: true,
            pad_names: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometrySource {
    Config,
    BootSector,
    Default,
}

impl GeometrySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Config => "config file",
            Self::BootSector => "boot sector",
            Self::Default => "1.44 MB default",
        }
    }
}

pub fn from_toml_str(raw: &str) -> Result<FileConfig> {
    toml::from_str(raw).context("invalid fatinject config")
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    from_toml_str(&raw).with_context(|| format!("in {}", path.display()))
}

/// Config overrides win; otherwise a valid boot sector; otherwise the floppy default.
pub fn resolve_geometry(
    logger: &mut Logger,
    config: &FileConfig,
    image: &[u8],
) -> Result<(Geometry, GeometrySource)> {
    if let Some(overrides) = &config.geometry {
        let geometry = overrides.apply(Geometry::default());
        geometry
            .validate()
            .context("geometry from config file is inconsistent")?;
        return Ok((geometry, GeometrySource::Config));
    }

    match Geometry::from_boot_sector(image) {
        Ok(geometry) => Ok((geometry, GeometrySource::BootSector)),
        Err(err) => {
            logger.warn(format!(
                "Boot sector not usable ({err}); using the 1.44 MB floppy layout"
            ));
            Ok((Geometry::default(), GeometrySource::Default))
        }
    }
}
