//! Intel ICH/PCH SPI controller register definitions
//!
//! Offsets and bit definitions for the hardware-sequencing SPI controller
//! block, ported from flashprog's `ichspi.c` and cross-checked against
//! chipsec's `spi.py`. Only the hardware-sequencing (hwseq) register set is
//! covered here; the legacy software-sequencing opcode-menu registers
//! (PREOP/OPTYPE/OPMENU/SSFS/SSFC) are out of this driver's scope.

// ============================================================================
// Hardware Sequencing registers (ICH9 and later)
// ============================================================================

/// Hardware Sequencing Flash Status (16 bits)
pub const REG_HSFS: usize = 0x04;
/// Hardware Sequencing Flash Control (16 bits)
pub const REG_HSFC: usize = 0x06;
/// Flash Address register (32 bits)
pub const REG_FADDR: usize = 0x08;
/// Flash Data registers (64 bytes starting here, FDATA0..FDATA15)
pub const REG_FDATA0: usize = 0x10;
/// Flash Region Access Permissions (32 bits)
pub const REG_FRAP: usize = 0x50;
/// Flash Region 0 (32 bits each, up to 12 regions depending on generation)
pub const REG_FREG0: usize = 0x54;
/// Protected Range 0 (32 bits each, 5 ranges)
pub const REG_PR0: usize = 0x74;
/// BIOS Base Address Configuration (32 bits), pre-PCH100 only
pub const REG_BBAR: usize = 0xA0;
/// Flash Descriptor Observability Control (32 bits)
pub const REG_FDOC: usize = 0xB0;
/// Flash Descriptor Observability Data (32 bits)
pub const REG_FDOD: usize = 0xB4;
/// BIOS Flash Primary Region (32 bits)
pub const REG_BFPR: usize = 0x00;

/// Component/stratum index register for SFDP reads
pub const REG_BIOS_PTINX: usize = 0xC8;
/// Data register paired with BIOS_PTINX
pub const REG_BIOS_PTDATA: usize = 0xCC;

/// Apollo Lake: Flash Region 12
pub const APL_REG_FREG12: usize = 0xE0;

// HSFS bits
/// Flash Cycle Done (write-1-to-clear)
pub const HSFS_FDONE_OFF: u16 = 0;
pub const HSFS_FDONE: u16 = 1 << HSFS_FDONE_OFF;
/// Flash Cycle Error (write-1-to-clear)
pub const HSFS_FCERR_OFF: u16 = 1;
pub const HSFS_FCERR: u16 = 1 << HSFS_FCERR_OFF;
/// Access Error Log (write-1-to-clear)
pub const HSFS_AEL_OFF: u16 = 2;
pub const HSFS_AEL: u16 = 1 << HSFS_AEL_OFF;
/// SPI Cycle In Progress
pub const HSFS_SCIP_OFF: u16 = 5;
pub const HSFS_SCIP: u16 = 1 << HSFS_SCIP_OFF;
/// Flash Descriptor Override Pin-Strap Status
pub const HSFS_FDOPSS_OFF: u16 = 13;
pub const HSFS_FDOPSS: u16 = 1 << HSFS_FDOPSS_OFF;
/// Flash Descriptor Valid
pub const HSFS_FDV_OFF: u16 = 14;
pub const HSFS_FDV: u16 = 1 << HSFS_FDV_OFF;
/// Flash Configuration Lock-Down
pub const HSFS_FLOCKDN_OFF: u16 = 15;
pub const HSFS_FLOCKDN: u16 = 1 << HSFS_FLOCKDN_OFF;

/// Mask of sticky status bits cleared by a write-1-to-clear
pub const HSFS_STATUS_CLEAR_MASK: u16 = HSFS_FDONE | HSFS_FCERR | HSFS_AEL;

// HSFC bits
/// Flash Cycle Go (commit bit)
pub const HSFC_FGO_OFF: u16 = 0;
pub const HSFC_FGO: u16 = 1 << HSFC_FGO_OFF;
/// Flash Cycle select (2 bits on ICH9-class hardware)
pub const HSFC_FCYCLE_OFF: u16 = 1;
pub const HSFC_FCYCLE: u16 = 0x3 << HSFC_FCYCLE_OFF;
/// Flash Data Byte Count (encoded as count - 1)
pub const HSFC_FDBC_OFF: u16 = 8;
pub const HSFC_FDBC: u16 = 0x3f << HSFC_FDBC_OFF;
/// SPI SMI# Enable
pub const HSFC_SME_OFF: u16 = 15;
pub const HSFC_SME: u16 = 1 << HSFC_SME_OFF;

/// FADDR mask (ICH9-class, 25-bit FLA field)
pub const FADDR_MASK: u32 = 0x01ff_ffff;
/// FADDR mask (PCH100+, 27-bit FLA field)
pub const PCH100_FADDR_MASK: u32 = 0x07ff_ffff;

// Protected Range bits
/// Write protection enable bit offset
pub const PR_WP_OFF: u32 = 31;
/// Read protection enable bit offset
pub const PR_RP_OFF: u32 = 15;

// ============================================================================
// PCH100 (Sunrise Point and later)
// ============================================================================

/// Discrete Lock Bits (32 bits)
pub const PCH100_REG_DLOCK: usize = 0x0C;
/// Protected Range 0 on PCH100+ (6 ranges)
pub const PCH100_REG_FPR0: usize = 0x84;

/// PR0 Lock-Down bit in DLOCK
pub const DLOCK_PR0_LOCKDN_OFF: u32 = 8;
pub const DLOCK_PR0_LOCKDN: u32 = 1 << DLOCK_PR0_LOCKDN_OFF;

// C740 (Emmitsburg) and later - new access permission registers
/// BIOS Master Write Access Permissions
pub const BIOS_BM_WAP: usize = 0x11C;
/// BIOS Master Read Access Permissions
pub const BIOS_BM_RAP: usize = 0x118;

// ============================================================================
// PCI configuration space (LPC bridge, bus 0 device 31 function 0)
// ============================================================================

/// PCI config offset for RCBA (Root Complex Base Address), ICH7-ICH10
pub const PCI_REG_RCBA: u8 = 0xF0;
/// Offset to SPI registers within RCBA (ICH7)
pub const RCBA_SPI_OFFSET_ICH7: u32 = 0x3020;
/// Offset to SPI registers within RCBA (ICH8+)
pub const RCBA_SPI_OFFSET_ICH9: u32 = 0x3800;

/// SPIBAR register (BAR0) in the dedicated SPI PCI function (PCH100+, 00:1f.5)
pub const PCI_REG_SPIBAR: u8 = 0x10;

/// BIOS Control Register offset, LPC bridge config space
pub const PCI_REG_BIOS_CNTL: u8 = 0xDC;

/// BIOS Write Enable
pub const BIOS_CNTL_BWE: u8 = 1 << 0;
/// BIOS Lock Enable
pub const BIOS_CNTL_BLE: u8 = 1 << 1;
/// SMM BIOS Write Protection
pub const BIOS_CNTL_SMM_BWP: u8 = 1 << 5;

// ============================================================================
// Flash Region / Protected Range encoding
// ============================================================================

/// Extract base address from a FREG/PR register value
#[inline]
pub const fn freg_base(freg: u32) -> u32 {
    (freg & 0x7fff) << 12
}

/// Extract limit address from a FREG/PR register value
#[inline]
pub const fn freg_limit(freg: u32) -> u32 {
    ((freg >> 16) & 0x7fff) << 12 | 0xfff
}

/// Access protection status derived from a region's FRAP lane bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessProtection {
    /// No protection - read and write allowed
    None,
    /// Read protected
    ReadProtected,
    /// Write protected
    WriteProtected,
    /// Both read and write protected
    Locked,
}

impl AccessProtection {
    /// Create from read/write permission bits
    pub fn from_permissions(can_read: bool, can_write: bool) -> Self {
        match (can_read, can_write) {
            (true, true) => Self::None,
            (true, false) => Self::WriteProtected,
            (false, true) => Self::ReadProtected,
            (false, false) => Self::Locked,
        }
    }

    /// Check if writes are allowed
    pub fn can_write(self) -> bool {
        matches!(self, Self::None | Self::ReadProtected)
    }

    /// Check if reads are allowed
    pub fn can_read(self) -> bool {
        matches!(self, Self::None | Self::WriteProtected)
    }
}

// ============================================================================
// Hardware sequencing cycle kinds
// ============================================================================

/// Hardware sequencing cycle type, written into HSFC.FCYCLE
///
/// The ICH9-class 2-bit FCYCLE field natively distinguishes only
/// READ/WRITE/ERASE. JEDEC and SFDP cycles reuse the same field on later
/// hardware (widened or not, depending on generation); the numeric values
/// below follow the Intel PCH EDS and match flashrom/coreboot's encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum HwSeqCycle {
    /// Read cycle
    Read = 0,
    /// Write cycle
    Write = 2,
    /// Erase cycle (block granularity, DBC ignored)
    Erase = 3,
    /// SFDP read cycle
    Sfdp = 5,
    /// JEDEC ID read cycle
    Jedec = 6,
}

/// Byte offset of FDATA register `i` (0..15) within the hwseq block
#[inline]
pub const fn fdata_offset(i: usize) -> usize {
    REG_FDATA0 + i * 4
}

/// SFDP header signature, little-endian dword: ASCII "SFDP"
pub const SFDP_SIGNATURE: u32 = 0x5044_4653;

// BIOS_PTINX layout
/// Component select bit (0 or 1)
pub const PTINX_COMPONENT_OFF: u32 = 14;
pub const PTINX_COMPONENT: u32 = 1 << PTINX_COMPONENT_OFF;
/// Stratum select field
pub const PTINX_STRATUM_OFF: u32 = 12;
pub const PTINX_STRATUM_HEADER: u32 = 0x0 << PTINX_STRATUM_OFF;
pub const PTINX_STRATUM_PARAM_HEADER: u32 = 0x1 << PTINX_STRATUM_OFF;
pub const PTINX_STRATUM_PARAM_TABLE: u32 = 0x2 << PTINX_STRATUM_OFF;
/// Offset field (dword-aligned, low 12 bits)
pub const PTINX_OFFSET_MASK: u32 = 0x0fff;

/// Size of the hwseq MMIO window mapped at SPIBAR. Generous relative to the
/// highest defined offset (BIOS_BM_WAP at 0x11C) to leave headroom for
/// generations that define registers past it.
pub const SPI_MMIO_WINDOW_LEN: usize = 0x200;
