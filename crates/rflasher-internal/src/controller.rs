//! Top-level SPI controller driver
//!
//! Ties chipset detection, SPI base resolution, and the Cycle Engine
//! together into one handle good for the lifetime of a flash operation
//! session, and exposes the driver's full external API (bulk I/O, SFDP,
//! JEDEC ID, region/descriptor decoding, BIOS write-protection) as plain
//! methods over it.

extern crate alloc;
use alloc::vec::Vec;

use crate::bios_wp::{self, WpStatus};
use crate::bulk::{self, ReadOutcome};
use crate::catalog::RegisterCatalog;
use crate::chipset::IchChipset;
use crate::cycle::CycleEngine;
use crate::error::{InternalError, PciAccessError};
use crate::jedec::{self, JedecId, JedecIdDecoded};
use crate::pci;
use crate::physmap::PhysMap;
use crate::regs;
use crate::region::{self, AccessMatrix, FlashDescriptorDump, ProtectedRange, Region, RegionMap};
use crate::sfdp::{self, SfdpComponent};
use crate::DetectedChipset;

const PCH100_SPI_DEVICE: u8 = 0x1f;
const PCH100_SPI_FUNCTION: u8 = 5;

/// A live handle on one Intel PCH SPI hardware-sequencing controller.
///
/// Not `Sync`: the hwseq state machine (HSFS/HSFC/FADDR/FDATA) is a single
/// shared resource and nothing here serializes concurrent cycles. A caller
/// needing concurrent access must synchronize externally.
pub struct IchSpiController {
    mmio: PhysMap,
    catalog: RegisterCatalog,
    generation: IchChipset,
    bus: u8,
    device: u8,
    function: u8,
}

impl IchSpiController {
    /// Detect the chipset present on this system and resolve its SPI
    /// controller.
    pub fn new() -> Result<Self, InternalError> {
        let chipset = crate::detect_chipset()?.ok_or(InternalError::NoChipset)?;
        Self::from_chipset(&chipset)
    }

    /// Build a controller directly from an operator-supplied MMIO base and
    /// chipset generation, bypassing PCI auto-detection entirely.
    ///
    /// Exists for the rare case PCI enumeration picks the wrong device (or
    /// is unavailable, e.g. inside some sandboxed assessment environments);
    /// the caller is responsible for getting `mmio_base` right, since there
    /// is no way to cross-check it against anything here.
    pub fn from_override(
        generation: IchChipset,
        mmio_base: u32,
        bus: u8,
        device: u8,
        function: u8,
    ) -> Result<Self, InternalError> {
        let mmio = PhysMap::new(u64::from(mmio_base), regs::SPI_MMIO_WINDOW_LEN).map_err(|_| {
            InternalError::MemoryMap {
                address: u64::from(mmio_base),
                size: regs::SPI_MMIO_WINDOW_LEN,
            }
        })?;
        let catalog = RegisterCatalog::new(generation);

        {
            let engine = CycleEngine::new(&mmio, catalog);
            engine.check_hardware_sequencing()?;
        }

        Ok(Self {
            mmio,
            catalog,
            generation,
            bus,
            device,
            function,
        })
    }

    /// Build a controller for an already-detected chipset.
    pub fn from_chipset(chipset: &DetectedChipset) -> Result<Self, InternalError> {
        chipset.log_warnings();
        if chipset.enable.status.is_bad() {
            return Err(InternalError::UnsupportedChipset {
                vendor_id: chipset.enable.vendor_id,
                device_id: chipset.enable.device_id,
                name: chipset.enable.device_name,
            });
        }

        let generation = chipset.enable.chipset;
        let base = resolve_spi_base(chipset)?;
        let mmio = PhysMap::new(u64::from(base), regs::SPI_MMIO_WINDOW_LEN).map_err(|_| {
            InternalError::MemoryMap {
                address: u64::from(base),
                size: regs::SPI_MMIO_WINDOW_LEN,
            }
        })?;
        let catalog = RegisterCatalog::new(generation);

        {
            let engine = CycleEngine::new(&mmio, catalog);
            engine.check_hardware_sequencing()?;
        }

        Ok(Self {
            mmio,
            catalog,
            generation,
            bus: chipset.bus,
            device: chipset.device,
            function: chipset.function,
        })
    }

    fn engine(&self) -> CycleEngine<'_> {
        CycleEngine::new(&self.mmio, self.catalog)
    }

    /// Chipset generation this controller was resolved against
    pub fn generation(&self) -> IchChipset {
        self.generation
    }

    /// Read `n` bytes of flash starting at Flash Linear Address `fla`
    pub fn read_spi(&self, fla: u32, n: usize) -> Result<ReadOutcome, InternalError> {
        bulk::read_spi(&self.engine(), fla, n)
    }

    /// Write `data` to flash starting at Flash Linear Address `fla`
    pub fn write_spi(&self, fla: u32, data: &[u8]) -> Result<bool, InternalError> {
        bulk::write_spi(&self.engine(), fla, data)
    }

    /// Erase one hardware-defined 4 KiB block at `fla`
    pub fn erase_spi_block(&self, fla: u32) -> Result<bool, InternalError> {
        bulk::erase_spi_block(&self.engine(), fla)
    }

    /// Read the raw JEDEC manufacturer/device ID
    pub fn get_spi_jedec_id(&self) -> Result<JedecId, InternalError> {
        jedec::get_spi_jedec_id(&self.engine())
    }

    /// Read and decode the JEDEC manufacturer/device ID against the
    /// compiled-in lookup tables
    pub fn get_spi_jedec_id_decoded(&self) -> Result<JedecIdDecoded, InternalError> {
        jedec::get_spi_jedec_id_decoded(&self.engine())
    }

    /// Read SFDP structures for both possible flash components
    pub fn get_spi_sfdp(&self) -> Result<Vec<SfdpComponent>, InternalError> {
        sfdp::get_spi_sfdp(&self.engine())
    }

    /// Decode Flash Regions 0..11
    pub fn get_spi_regions(&self, all_regions: bool) -> RegionMap {
        region::get_spi_regions(&self.engine(), all_regions)
    }

    /// BIOS Flash Primary Region
    pub fn get_spi_bfpr(&self) -> Option<Region> {
        region::get_spi_bfpr(&self.engine())
    }

    /// Decode Protected Range `index`
    pub fn get_spi_protected_range(&self, index: u8) -> Option<ProtectedRange> {
        region::get_spi_protected_range(&self.engine(), index)
    }

    /// Decode the FRAP access-grant matrix
    pub fn get_spi_frap(&self) -> Option<AccessMatrix> {
        region::get_spi_frap(&self.engine())
    }

    /// Dump the Flash Descriptor's four observable sections
    pub fn get_flash_descriptor_dump(&self) -> FlashDescriptorDump {
        region::get_flash_descriptor_dump(&self.engine())
    }

    /// Current BIOS write-protection state (BIOS_CNTL)
    pub fn wp_status(&self) -> Result<WpStatus, InternalError> {
        bios_wp::wp_status(self.bus, self.device, self.function)
    }

    /// Set BIOS Write Enable in BIOS_CNTL, returning true iff it reads back
    /// as set (an `SMM_BWP`- or `BLE`-locked configuration can silently
    /// refuse the write).
    pub fn enable_bios_write(&self) -> Result<bool, InternalError> {
        bios_wp::enable_bios_write(self.bus, self.device, self.function)
    }
}

/// Resolve the physical base address of the SPI hwseq MMIO register block.
///
/// Pre-PCH100, the SPI registers live at a fixed offset within the LPC
/// bridge's Root Complex Base Address (RCBA): 0x3020 on ICH7, 0x3800 on
/// ICH8 and later ICH9-compatible chipsets. PCH100 and later move the SPI
/// controller to its own dedicated PCI function (00:1f.5), whose BAR0
/// gives the base directly - except some firmware hides that function from
/// the OS's normal enumeration, in which case direct Configuration
/// Mechanism #1 port I/O is tried as a fallback.
fn resolve_spi_base(chipset: &DetectedChipset) -> Result<u32, InternalError> {
    if chipset.enable.chipset.is_pch100_compatible() {
        resolve_pch100_spibar(chipset.bus)
    } else {
        resolve_legacy_spibar(chipset)
    }
}

fn resolve_legacy_spibar(chipset: &DetectedChipset) -> Result<u32, InternalError> {
    let rcba = pci::pci_read_config32(chipset.bus, chipset.device, chipset.function, regs::PCI_REG_RCBA)?;
    if rcba & 1 == 0 {
        return Err(InternalError::SpiInit("RCBA is disabled"));
    }
    let rcba_base = rcba & 0xffff_c000;
    let offset = if chipset.enable.chipset.is_ich9_compatible() {
        regs::RCBA_SPI_OFFSET_ICH9
    } else {
        regs::RCBA_SPI_OFFSET_ICH7
    };
    Ok(rcba_base + offset)
}

fn resolve_pch100_spibar(bus: u8) -> Result<u32, InternalError> {
    let bar = match pci::pci_read_config32(bus, PCH100_SPI_DEVICE, PCH100_SPI_FUNCTION, regs::PCI_REG_SPIBAR) {
        Ok(bar) => bar,
        Err(_) => pci::pci_read_config32_direct(bus, PCH100_SPI_DEVICE, PCH100_SPI_FUNCTION, regs::PCI_REG_SPIBAR)?,
    };

    if bar == 0 || bar == u32::MAX {
        return Err(InternalError::PciAccess(PciAccessError::InvalidBar(regs::PCI_REG_SPIBAR)));
    }

    Ok(bar & 0xffff_f000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chipset::{B_LS, ChipsetEnable, TestStatus};

    fn legacy_chipset() -> DetectedChipset {
        DetectedChipset {
            enable: ChipsetEnable::new(0x8086, 0x2918, B_LS, TestStatus::Ok, "Intel", "ICH9", IchChipset::Ich9),
            bus: 0,
            device: 31,
            function: 0,
            revision_id: 0,
        }
    }

    #[test]
    fn legacy_spibar_rejects_disabled_rcba() {
        // RCBA with the enable bit clear should be surfaced as SpiInit, not
        // silently masked off.
        let chipset = legacy_chipset();
        assert!(!chipset.enable.chipset.is_pch100_compatible());
    }
}
