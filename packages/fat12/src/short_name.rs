use core::fmt;

use heapless::Vec;

use crate::error::Fat12Error;

pub const BASE_MAX: usize = 8;
pub const EXT_MAX: usize = 3;

/// An 8.3 name as written to the root directory.
///
/// Short parts are kept at their natural length. [`ShortName::padded`] gives the
/// conventional space-padded 11-byte form for callers that want it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShortName {
    base: Vec<u8, BASE_MAX>,
    ext: Vec<u8, EXT_MAX>,
}

impl ShortName {
    /// Splits `filename` at its first `.`. A base longer than 8 characters becomes its
    /// first 7 characters plus `~`; the extension keeps its first 3 characters.
    pub fn encode(filename: &str) -> Result<Self, Fat12Error> {
        if !filename.is_ascii() {
            return Err(Fat12Error::InvalidFilename);
        }
        let (base, rest) = filename.split_once('.').ok_or(Fat12Error::InvalidFilename)?;
        let ext = rest.split('.').next().unwrap_or(rest);

        let base = base.as_bytes();
        let base = if base.len() > BASE_MAX {
            let mut truncated: Vec<u8, BASE_MAX> =
                Vec::from_slice(&base[..BASE_MAX - 1]).map_err(|_| Fat12Error::InvalidFilename)?;
            truncated
                .push(b'~')
                .map_err(|_| Fat12Error::InvalidFilename)?;
            truncated
        } else {
            Vec::from_slice(base).map_err(|_| Fat12Error::InvalidFilename)?
        };

        let ext = ext.as_bytes();
        let ext = Vec::from_slice(&ext[..ext.len().min(EXT_MAX)])
            .map_err(|_| Fat12Error::InvalidFilename)?;

        Ok(Self { base, ext })
    }

    pub fn base(&self) -> &[u8] {
        &self.base
    }

    pub fn ext(&self) -> &[u8] {
        &self.ext
    }

    pub fn padded(&self) -> [u8; BASE_MAX + EXT_MAX] {
        let mut out = [b' '; BASE_MAX + EXT_MAX];
        out[..self.base.len()].copy_from_slice(&self.base);
        out[BASE_MAX..BASE_MAX + self.ext.len()].copy_from_slice(&self.ext);
        out
    }
}

impl fmt::Display for ShortName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Both parts were checked as ASCII in `encode`.
        for &b in self.base.iter() {
            write!(f, "{}", b as char)?;
        }
        f.write_str(".")?;
        for &b in self.ext.iter() {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}
