//! rflasher-dummy - In-memory flash emulator for testing
//!
//! This crate provides a dummy flash programmer that emulates a flash chip
//! in memory. It implements [`OpaqueMaster`], the same trait the Intel
//! chipset internal driver (`rflasher-internal`) implements, so it can stand
//! in for real hardware in tests and in the CLI's `dummy` programmer.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use rflasher_core::error::{Error, Result};
use rflasher_core::programmer::OpaqueMaster;

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// JEDEC manufacturer ID
    pub manufacturer_id: u8,
    /// JEDEC device ID
    pub device_id: u16,
    /// Flash size in bytes
    pub size: usize,
    /// Erase granularity in bytes
    pub erase_size: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            manufacturer_id: 0xEF, // Winbond
            device_id: 0x4018,     // W25Q128FV
            size: 16 * 1024 * 1024,
            erase_size: 4096,
        }
    }
}

/// Dummy flash programmer
///
/// Emulates a flash chip's byte array in memory. Programming follows the
/// real hardware's AND semantics (bits can only go 1 -> 0); erase resets a
/// block to all-0xFF.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create a new dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![0xFF; config.size];
        Self { config, data }
    }

    /// Create a new dummy flash with default configuration (W25Q128FV)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// JEDEC ID as the three bytes the hardware returns: {manufacturer,
    /// device_hi, device_lo}
    pub fn jedec_id(&self) -> (u8, u8, u8) {
        (
            self.config.manufacturer_id,
            (self.config.device_id >> 8) as u8,
            self.config.device_id as u8,
        )
    }
}

#[cfg(feature = "alloc")]
impl OpaqueMaster for DummyFlash {
    fn size(&self) -> usize {
        self.config.size
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<()> {
        let addr = addr as usize;
        if addr + buf.len() > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }
        buf.copy_from_slice(&self.data[addr..addr + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<()> {
        let addr = addr as usize;
        if addr + data.len() > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }
        // Flash programming: bits can only go 1 -> 0.
        for (i, &byte) in data.iter().enumerate() {
            self.data[addr + i] &= byte;
        }
        Ok(())
    }

    fn erase(&mut self, addr: u32, len: u32) -> Result<()> {
        let addr = addr as usize;
        let len = len as usize;
        if len == 0 || len % self.config.erase_size != 0 || addr % self.config.erase_size != 0 {
            return Err(Error::InvalidAlignment);
        }
        if addr + len > self.data.len() {
            return Err(Error::AddressOutOfBounds);
        }
        for byte in &mut self.data[addr..addr + len] {
            *byte = 0xFF;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_default_jedec_id() {
        let flash = DummyFlash::new_default();
        assert_eq!(flash.jedec_id(), (0xEF, 0x40, 0x18));
    }

    #[test]
    fn read_after_write_and_mask_semantics() {
        let mut flash = DummyFlash::new_default();
        flash.write(0x1000, &[0x12, 0x34, 0x56, 0x78]).unwrap();
        // Writing 0x00 on top only clears bits, never sets them.
        flash.write(0x1000, &[0xFF, 0x00, 0xFF, 0xFF]).unwrap();

        let mut buf = [0u8; 4];
        flash.read(0x1000, &mut buf).unwrap();
        assert_eq!(buf, [0x12, 0x00, 0x56, 0x78]);
    }

    #[test]
    fn erase_resets_block_to_0xff() {
        let mut flash = DummyFlash::new_default();
        flash.write(0, &[0x00; 256]).unwrap();
        flash.erase(0, 4096).unwrap();

        let mut buf = [0u8; 256];
        flash.read(0, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn erase_rejects_misaligned_address() {
        let mut flash = DummyFlash::new_default();
        assert_eq!(flash.erase(100, 4096), Err(Error::InvalidAlignment));
    }

    #[test]
    fn read_rejects_out_of_bounds() {
        let mut flash = DummyFlash::new(DummyConfig {
            size: 16,
            ..DummyConfig::default()
        });
        let mut buf = [0u8; 4];
        assert_eq!(flash.read(14, &mut buf), Err(Error::AddressOutOfBounds));
    }
}
