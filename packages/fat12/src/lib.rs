#![no_std]

extern crate alloc;

pub mod clusters;
pub mod directory;
pub mod error;
pub mod geometry;
pub mod image;
pub mod inject;
pub mod short_name;
pub mod table;

pub use clusters::{ClusterChain, ClusterRange};
pub use directory::{DirectoryEntry, DirectorySlot};
pub use error::Fat12Error;
pub use geometry::Geometry;
pub use image::DiskImage;
pub use inject::{inject, InjectOptions, InjectPlan, InjectReport};
pub use short_name::ShortName;
pub use table::{EntryUpdate, FatTable, FAT12_EOC};
