//! Internal programmer wrapper implementing OpaqueMaster
//!
//! Adapts [`IchSpiController`]'s named operations onto the `OpaqueMaster`
//! trait other programmer backends (e.g. rflasher-dummy) also implement, so
//! a caller can drive either through the same interface.

use crate::bulk;
use crate::controller::IchSpiController;
use crate::error::InternalError;

use rflasher_core::error::{Error as CoreError, Result as CoreResult};
use rflasher_core::programmer::{OpaqueMaster, ProgrammerInfo};

/// Internal programmer for Intel ICH/PCH chipsets
#[cfg(all(feature = "std", target_os = "linux"))]
pub struct InternalProgrammer {
    controller: IchSpiController,
    flash_size: usize,
    writes_enabled: bool,
}

#[cfg(all(feature = "std", target_os = "linux"))]
impl InternalProgrammer {
    /// Detect a chipset, resolve its SPI controller, and attempt to enable
    /// BIOS writes.
    pub fn new() -> Result<Self, InternalError> {
        let controller = IchSpiController::new()?;
        Self::from_controller(controller)
    }

    /// Wrap an already-resolved controller
    pub fn from_controller(controller: IchSpiController) -> Result<Self, InternalError> {
        let writes_enabled = match controller.enable_bios_write() {
            Ok(enabled) => enabled,
            Err(e) => {
                log::warn!("could not enable BIOS writes: {}", e);
                false
            }
        };

        let flash_size = controller
            .get_spi_bfpr()
            .map(|region| region.size() as usize)
            .unwrap_or(0);

        Ok(Self {
            controller,
            flash_size,
            writes_enabled,
        })
    }

    /// Override the detected flash size (e.g. after a JEDEC ID lookup finds
    /// a part larger than the BIOS region alone)
    pub fn set_flash_size(&mut self, size: usize) {
        self.flash_size = size;
    }

    /// Whether BIOS writes are currently enabled
    pub fn writes_enabled(&self) -> bool {
        self.writes_enabled
    }

    /// Access the underlying controller for operations outside the
    /// `OpaqueMaster` surface (SFDP, JEDEC ID, region dumps, ...)
    pub fn controller(&self) -> &IchSpiController {
        &self.controller
    }

    fn map_error(e: InternalError) -> CoreError {
        match e {
            InternalError::NoChipset | InternalError::UnsupportedChipset { .. } | InternalError::MultipleChipsets => {
                CoreError::ProgrammerNotReady
            }
            InternalError::PciAccess(_) | InternalError::MemoryMap { .. } => CoreError::ProgrammerError,
            InternalError::AccessDenied { .. } => CoreError::RegionProtected,
            InternalError::Io(_) => CoreError::IoError,
            InternalError::ChipsetEnable(_) | InternalError::SpiInit(_) => CoreError::ProgrammerError,
            InternalError::InvalidDescriptor => CoreError::ProgrammerError,
            InternalError::NotSupported(_) => CoreError::OpcodeNotSupported,
            InternalError::CycleFailed { .. } => CoreError::ProgrammerError,
            InternalError::RegisterNotDefined(_) => CoreError::ProgrammerError,
            InternalError::ParseFailed(_) => CoreError::ProgrammerError,
        }
    }
}

#[cfg(all(feature = "std", target_os = "linux"))]
impl OpaqueMaster for InternalProgrammer {
    fn size(&self) -> usize {
        self.flash_size
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> CoreResult<()> {
        let outcome = self.controller.read_spi(addr, buf.len()).map_err(Self::map_error)?;
        buf[..outcome.bytes.len()].copy_from_slice(&outcome.bytes);
        if outcome.first_failed.is_some() {
            return Err(CoreError::ReadError);
        }
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> CoreResult<()> {
        if !self.writes_enabled {
            return Err(CoreError::WriteProtected);
        }
        let ok = self.controller.write_spi(addr, data).map_err(Self::map_error)?;
        if !ok {
            return Err(CoreError::WriteError);
        }
        Ok(())
    }

    fn erase(&mut self, addr: u32, len: u32) -> CoreResult<()> {
        if !self.writes_enabled {
            return Err(CoreError::WriteProtected);
        }
        let block_len = bulk::erase_block_len();
        if len % block_len != 0 || addr % block_len != 0 {
            return Err(CoreError::InvalidAlignment);
        }

        let blocks = len / block_len;
        for i in 0..blocks {
            let block_addr = addr + i * block_len;
            let ok = self.controller.erase_spi_block(block_addr).map_err(Self::map_error)?;
            if !ok {
                return Err(CoreError::EraseError);
            }
        }
        Ok(())
    }
}

/// Programmer information
pub fn programmer_info() -> ProgrammerInfo {
    ProgrammerInfo {
        name: "internal",
        description: "Intel ICH/PCH internal flash programmer",
        requires_root: true,
    }
}

// Non-Linux stub
#[cfg(not(all(feature = "std", target_os = "linux")))]
pub struct InternalProgrammer {
    _private: (),
}

#[cfg(not(all(feature = "std", target_os = "linux")))]
impl InternalProgrammer {
    /// Always fails off Linux - there is no `/dev/mem`/sysfs backend here
    pub fn new() -> Result<Self, InternalError> {
        Err(InternalError::NotSupported("internal programmer only supported on Linux"))
    }

    /// Always fails off Linux, for the same reason as [`Self::new`]
    pub fn from_controller(_controller: IchSpiController) -> Result<Self, InternalError> {
        Err(InternalError::NotSupported("internal programmer only supported on Linux"))
    }
}

#[cfg(not(all(feature = "std", target_os = "linux")))]
impl OpaqueMaster for InternalProgrammer {
    fn size(&self) -> usize {
        0
    }

    fn read(&mut self, _addr: u32, _buf: &mut [u8]) -> CoreResult<()> {
        Err(CoreError::ProgrammerNotReady)
    }

    fn write(&mut self, _addr: u32, _data: &[u8]) -> CoreResult<()> {
        Err(CoreError::ProgrammerNotReady)
    }

    fn erase(&mut self, _addr: u32, _len: u32) -> CoreResult<()> {
        Err(CoreError::ProgrammerNotReady)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_programmer_info() {
        let info = programmer_info();
        assert_eq!(info.name, "internal");
        assert!(info.requires_root);
    }
}
