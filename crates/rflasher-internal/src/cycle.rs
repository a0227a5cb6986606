//! Cycle Engine
//!
//! Drives the hardware-sequencing state machine one cycle at a time: commit
//! an address and command, wait for completion, clear sticky status.

use crate::catalog::{Field, RegisterCatalog, RegisterId};
use crate::error::InternalError;
use crate::physmap::PhysMap;
use crate::regs::{self, HwSeqCycle};

/// Number of busy-polls attempted before falling back to a single sleep
const POLL_ATTEMPTS: u32 = 1000;
/// Fallback stall when the controller is still busy after `POLL_ATTEMPTS`
/// spins. A heuristic, not a protocol requirement - flash devices can take
/// tens of milliseconds to complete an erase.
const BUSY_FALLBACK_SLEEP_MS: u64 = 100;

/// Drives HSFS/HSFC/FADDR for one SPI controller instance.
pub struct CycleEngine<'a> {
    mmio: &'a PhysMap,
    catalog: RegisterCatalog,
}

impl<'a> CycleEngine<'a> {
    /// Build a cycle engine over an already-mapped SPI register block
    pub fn new(mmio: &'a PhysMap, catalog: RegisterCatalog) -> Self {
        Self { mmio, catalog }
    }

    fn offset(&self, id: RegisterId) -> usize {
        self.catalog
            .offset(id)
            .expect("hwseq core registers are always defined")
    }

    /// HSFS.FDV - hardware sequencing must be enabled before any cycle
    pub fn check_hardware_sequencing(&self) -> Result<(), InternalError> {
        let hsfs = self.mmio.read16(self.offset(RegisterId::Hsfs));
        if self.catalog.get_register_field(hsfs as u32, Field::Fdv) == 0 {
            return Err(InternalError::SpiInit(
                "hardware sequencing is disabled (HSFS.FDV = 0)",
            ));
        }
        Ok(())
    }

    /// Mirrors the chipsec HAL's guard before JEDEC/SFDP cycles: some very
    /// old software-sequencing-only controllers don't even have an
    /// HSFC.FCYCLE field wide enough to select those cycle kinds.
    pub fn check_hwseq_available(&self) -> bool {
        self.catalog
            .register_has_field(RegisterId::Hsfc, Field::FCycle)
    }

    /// Poll HSFS until the controller reports idle, then clear sticky status
    /// bits. Spins up to 1000 times with no explicit delay; if still busy,
    /// sleeps 100ms once and polls one more time before giving up.
    pub fn wait_cycle_done(&self) -> Result<(), InternalError> {
        let hsfs_off = self.offset(RegisterId::Hsfs);

        let mut idle = false;
        for _ in 0..POLL_ATTEMPTS {
            let hsfs = self.mmio.read16(hsfs_off);
            if self.catalog.get_register_field(hsfs as u32, Field::Scip) == 0 {
                idle = true;
                break;
            }
        }

        if !idle {
            #[cfg(feature = "std")]
            std::thread::sleep(std::time::Duration::from_millis(BUSY_FALLBACK_SLEEP_MS));

            let hsfs = self.mmio.read16(hsfs_off);
            idle = self.catalog.get_register_field(hsfs as u32, Field::Scip) == 0;
        }

        if !idle {
            return Err(InternalError::CycleFailed { kind: "wait" });
        }

        // Write-1-to-clear FDONE|FCERR|AEL, then verify they actually cleared.
        let hsfs = self.mmio.read16(hsfs_off);
        self.mmio
            .write16(hsfs_off, hsfs | regs::HSFS_STATUS_CLEAR_MASK);
        let hsfs = self.mmio.read16(hsfs_off);

        let ael = self.catalog.get_register_field(hsfs as u32, Field::Ael);
        let fcerr = self.catalog.get_register_field(hsfs as u32, Field::FCErr);
        if ael != 0 || fcerr != 0 {
            return Err(InternalError::CycleFailed { kind: "completion" });
        }
        Ok(())
    }

    /// Issue one hardware cycle and wait for it to finish.
    ///
    /// FADDR is always written first, then (for non-erase cycles) the data
    /// byte count, then the command byte that commits FGO.
    pub fn send_cycle(&self, kind: HwSeqCycle, dbc_minus_one: u8, fla: u32) -> Result<(), InternalError> {
        let faddr_off = self.offset(RegisterId::Faddr);
        let hsfc_off = self.offset(RegisterId::Hsfc);

        self.mmio.write32(faddr_off, fla & self.catalog.faddr_mask());

        if !matches!(kind, HwSeqCycle::Erase) {
            self.mmio.write8(hsfc_off + 1, dbc_minus_one);
        }

        let fcycle = kind as u8;
        let command = (fcycle << 1) | regs::HSFC_FGO as u8;
        self.mmio.write8(hsfc_off, command);

        self.wait_cycle_done()
    }

    /// Byte offset of FDATA register `i`
    pub fn fdata_offset(&self, i: usize) -> usize {
        self.offset(RegisterId::Fdata(i as u8))
    }

    /// Read a raw dword register by id
    pub fn read32(&self, id: RegisterId) -> Option<u32> {
        self.catalog.offset(id).map(|off| self.mmio.read32(off))
    }

    /// Write a raw dword register by id
    pub fn write32(&self, id: RegisterId, value: u32) -> bool {
        match self.catalog.offset(id) {
            Some(off) => {
                self.mmio.write32(off, value);
                true
            }
            None => false,
        }
    }

    /// Access to the underlying register catalog
    pub fn catalog(&self) -> RegisterCatalog {
        self.catalog
    }

    /// Access to the underlying MMIO mapping (for modules that need raw
    /// access, e.g. FDATA marshalling)
    pub fn mmio(&self) -> &PhysMap {
        self.mmio
    }
}
