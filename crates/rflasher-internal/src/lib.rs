//! rflasher-internal - Intel ICH/PCH internal SPI flash programmer
//!
//! Drives the hardware-sequencing SPI controller built into Intel
//! ICH7-through-Arrow-Lake PCHs: chunked reads/writes/erases, SFDP and
//! JEDEC ID introspection, and region/protected-range/access-matrix
//! decoding. The hardware access layer ([`physmap`], [`pci`]) is
//! Linux-only; the register-level logic above it is platform-independent.

#![cfg_attr(not(feature = "std"), no_std)]

pub mod bios_wp;
pub mod bulk;
pub mod catalog;
pub mod chipset;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod fdata;
pub mod intel_pci;
pub mod jedec;
pub mod pci;
pub mod physmap;
pub mod programmer;
pub mod region;
pub mod regs;
pub mod sfdp;

pub use controller::IchSpiController;
pub use programmer::InternalProgrammer;

use chipset::ChipsetEnable;
use error::InternalError;

/// A chipset detected on the live system: which table entry matched, plus
/// where on the PCI bus it was found.
#[derive(Debug, Clone)]
pub struct DetectedChipset {
    /// Matching entry from the chipset table
    pub enable: ChipsetEnable,
    /// PCI bus number
    pub bus: u8,
    /// PCI device (slot) number
    pub device: u8,
    /// PCI function number
    pub function: u8,
    /// Revision ID actually read from the device
    pub revision_id: u8,
}

impl DetectedChipset {
    /// Emit a log warning for this chipset's test status, if it has one
    pub fn log_warnings(&self) {
        if self.enable.status.should_warn() {
            if let Some(msg) = self.enable.status.message() {
                log::warn!("{}", msg);
            }
        }
    }
}

/// Detect the single Intel chipset present on this system via PCI scanning.
///
/// Returns `Ok(None)` if no recognized Intel chipset was found,
/// `Err(InternalError::MultipleChipsets)` if more than one matched (a
/// configuration this driver refuses to guess at).
pub fn detect_chipset() -> Result<Option<DetectedChipset>, InternalError> {
    pci::find_intel_chipset()
}
