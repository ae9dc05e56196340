use crate::{error::Fat12Error, geometry::Geometry};

/// Byte-addressable view over a whole FAT12 image held in memory.
///
/// Every access is bounds checked; nothing here wraps or truncates.
pub struct DiskImage<'a> {
    bytes: &'a mut [u8],
}

impl<'a> DiskImage<'a> {
    pub fn new(bytes: &'a mut [u8], geometry: &Geometry) -> Result<Self, Fat12Error> {
        let expected = geometry.image_len();
        if bytes.len() != expected {
            return Err(Fat12Error::ImageSizeMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        Ok(Self { bytes })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn read(&self, offset: usize, len: usize) -> Result<&[u8], Fat12Error> {
        let end = checked_end(offset, len)?;
        self.bytes
            .get(offset..end)
            .ok_or(Fat12Error::ImageOutOfBounds { offset, len })
    }

    pub fn region_mut(&mut self, offset: usize, len: usize) -> Result<&mut [u8], Fat12Error> {
        let end = checked_end(offset, len)?;
        self.bytes
            .get_mut(offset..end)
            .ok_or(Fat12Error::ImageOutOfBounds { offset, len })
    }

    pub fn write(&mut self, offset: usize, data: &[u8]) -> Result<(), Fat12Error> {
        self.region_mut(offset, data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn read_u16_le(&self, offset: usize) -> Result<u16, Fat12Error> {
        let raw = self.read(offset, 2)?;
        Ok(u16::from_le_bytes([raw[0], raw[1]]))
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, Fat12Error> {
        let raw = self.read(offset, 4)?;
        Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
    }

    pub fn write_u16_le(&mut self, offset: usize, value: u16) -> Result<(), Fat12Error> {
        self.write(offset, &value.to_le_bytes())
    }

    pub fn write_u32_le(&mut self, offset: usize, value: u32) -> Result<(), Fat12Error> {
        self.write(offset, &value.to_le_bytes())
    }
}

fn checked_end(offset: usize, len: usize) -> Result<usize, Fat12Error> {
    offset
        .checked_add(len)
        .ok_or(Fat12Error::ImageOutOfBounds { offset, len })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn size_must_match_geometry() {
        let mut short = vec![0u8; 1024];
        assert_eq!(
            DiskImage::new(&mut short, &Geometry::default()).err(),
            Some(Fat12Error::ImageSizeMismatch {
                expected: 1_474_560,
                actual: 1024,
            })
        );
    }

    #[test]
    fn little_endian_fields_round_trip_and_bounds_hold() {
        let geometry = Geometry::default();
        let mut bytes = vec![0u8; geometry.image_len()];
        let mut image = DiskImage::new(&mut bytes, &geometry).unwrap();

        image.write_u32_le(100, 264_192).unwrap();
        assert_eq!(image.read(100, 4).unwrap(), &[0x00, 0x08, 0x04, 0x00]);
        assert_eq!(image.read_u32_le(100).unwrap(), 264_192);

        let last = image.len() - 1;
        assert!(image.write_u16_le(last, 1).is_err());
        assert!(image.read(usize::MAX, 2).is_err());
    }
}
