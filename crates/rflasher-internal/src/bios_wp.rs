//! BIOS Write-Protection Control
//!
//! Reads and clears the LPC bridge's BIOS_CNTL register (PCI config offset
//! 0xDC), independent of the hwseq MMIO block - this is plain PCI config
//! space access, not a flash cycle.

use crate::error::InternalError;
use crate::pci;
use crate::regs;

/// Decoded BIOS_CNTL bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WpStatus {
    /// BIOS Lock Enable - once set, clearing BIOSWE triggers an SMI instead
    /// of taking effect directly
    pub ble: bool,
    /// BIOS Write Enable - must be set for BIOS-region writes to succeed
    pub bioswe: bool,
    /// SMM BIOS Write Protection - restricts BIOS-region writes to SMM
    pub smm_bwp: bool,
}

/// Read current BIOS write-protection state from the LPC bridge's BIOS_CNTL
pub fn wp_status(bus: u8, device: u8, function: u8) -> Result<WpStatus, InternalError> {
    let cntl = pci::pci_read_config8(bus, device, function, regs::PCI_REG_BIOS_CNTL)?;
    Ok(WpStatus {
        ble: cntl & regs::BIOS_CNTL_BLE != 0,
        bioswe: cntl & regs::BIOS_CNTL_BWE != 0,
        smm_bwp: cntl & regs::BIOS_CNTL_SMM_BWP != 0,
    })
}

/// Set BIOSWE (BIOS Write Enable) unconditionally so the BIOS flash region
/// becomes writable through hwseq, then re-read BIOS_CNTL to confirm. If BLE
/// (BIOS Lock Enable) is set, this typically only sticks for one write cycle
/// before firmware-installed SMI handling clears it again - this function
/// does not attempt to work around BLE; it only reports whether the bit took.
pub fn enable_bios_write(bus: u8, device: u8, function: u8) -> Result<bool, InternalError> {
    let cntl = pci::pci_read_config8(bus, device, function, regs::PCI_REG_BIOS_CNTL)?;
    pci::pci_write_config8(
        bus,
        device,
        function,
        regs::PCI_REG_BIOS_CNTL,
        cntl | regs::BIOS_CNTL_BWE,
    )?;
    let cntl = pci::pci_read_config8(bus, device, function, regs::PCI_REG_BIOS_CNTL)?;
    Ok(cntl & regs::BIOS_CNTL_BWE != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wp_status_decodes_all_bits() {
        let cntl = regs::BIOS_CNTL_BLE | regs::BIOS_CNTL_SMM_BWP;
        let status = WpStatus {
            ble: cntl & regs::BIOS_CNTL_BLE != 0,
            bioswe: cntl & regs::BIOS_CNTL_BWE != 0,
            smm_bwp: cntl & regs::BIOS_CNTL_SMM_BWP != 0,
        };
        assert!(status.ble);
        assert!(!status.bioswe);
        assert!(status.smm_bwp);
    }
}
