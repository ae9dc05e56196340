use alloc::string::String;
use core::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fat12Error {
    InvalidClusterRange { range: String, reason: &'static str },
    InvalidFilename,
    DirectoryFull,
    InvalidDirectoryIndex(u32),
    ClusterOutOfRange(u32),
    EntryValueTooLarge(u16),
    BrokenChain { cluster: u16, value: u16 },
    ImageOutOfBounds { offset: usize, len: usize },
    ImageSizeMismatch { expected: usize, actual: usize },
    InvalidGeometry(&'static str),
}

impl fmt::Display for Fat12Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClusterRange { range, reason } => {
                write!(f, "invalid cluster range `{range}`: {reason}")
            }
            Self::InvalidFilename => {
                f.write_str("invalid filename: expected an ASCII name with a `.` extension separator")
            }
            Self::DirectoryFull => f.write_str("root directory is full"),
            Self::InvalidDirectoryIndex(index) => write!(f, "directory index {index} is out of range"),
            Self::ClusterOutOfRange(cluster) => {
                write!(f, "cluster {cluster} is outside the FAT12 table")
            }
            Self::EntryValueTooLarge(value) => {
                write!(f, "FAT12 entry value {value:#x} does not fit in 12 bits")
            }
            Self::BrokenChain { cluster, value } => {
                write!(f, "cluster chain broken at {cluster}: entry holds {value:#05x}")
            }
            Self::ImageOutOfBounds { offset, len } => {
                write!(f, "image access of {len} bytes at offset {offset} is out of bounds")
            }
            Self::ImageSizeMismatch { expected, actual } => {
                write!(f, "image is {actual} bytes, geometry expects {expected}")
            }
            Self::InvalidGeometry(reason) => write!(f, "invalid geometry: {reason}"),
        }
    }
}

impl core::error::Error for Fat12Error {}
