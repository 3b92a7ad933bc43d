//! Owned ROM image buffer
//!
//! The ROM is a single mutable byte buffer shared by every component in
//! this crate. [`RomImage`] owns it; codecs borrow slices of it per call.
//! Replacing the buffer (loading another ROM) invalidates any offsets
//! previously obtained from [`crate::locator`].

use std::path::Path;

use crate::{BANK_COUNT, BANK_SIZE, ROM_SIZE};

/// ROM image errors
#[derive(Debug, thiserror::Error)]
pub enum RomError {
    /// Buffer is not `BANK_COUNT * BANK_SIZE` bytes
    #[error("bad ROM size: {0:#x} bytes (expected {ROM_SIZE:#x})")]
    BadSize(usize),
    /// Bank index outside `0..BANK_COUNT`
    #[error("bank index {} out of range (max {})", .0, BANK_COUNT - 1)]
    BadBank(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A full cartridge ROM image
#[derive(Debug, Clone)]
pub struct RomImage {
    data: Vec<u8>,
}

impl RomImage {
    /// Wrap an existing buffer. Fails unless it is exactly [`ROM_SIZE`] bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, RomError> {
        if data.len() != ROM_SIZE {
            return Err(RomError::BadSize(data.len()));
        }
        Ok(Self { data })
    }

    /// Read a ROM image from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RomError> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Write the ROM image back to disk
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RomError> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Borrow one bank
    pub fn bank(&self, index: usize) -> Result<&[u8], RomError> {
        if index >= BANK_COUNT {
            return Err(RomError::BadBank(index));
        }
        Ok(&self.data[index * BANK_SIZE..(index + 1) * BANK_SIZE])
    }

    /// Mutably borrow one bank
    pub fn bank_mut(&mut self, index: usize) -> Result<&mut [u8], RomError> {
        if index >= BANK_COUNT {
            return Err(RomError::BadBank(index));
        }
        Ok(&mut self.data[index * BANK_SIZE..(index + 1) * BANK_SIZE])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_size() {
        assert!(matches!(
            RomImage::from_bytes(vec![0; 123]),
            Err(RomError::BadSize(123))
        ));
    }

    #[test]
    fn bank_slicing() {
        let mut data = vec![0u8; ROM_SIZE];
        data[2 * BANK_SIZE] = 0xab;
        let rom = RomImage::from_bytes(data).unwrap();
        assert_eq!(rom.bank(2).unwrap()[0], 0xab);
        assert_eq!(rom.bank(2).unwrap().len(), BANK_SIZE);
        assert!(matches!(rom.bank(BANK_COUNT), Err(RomError::BadBank(_))));
    }
}
