//! Register catalog
//!
//! A small stand-in for the chipset register-definition database a real
//! security-assessment toolkit loads from an XML file: given a chipset
//! generation, resolves a named register to its byte offset within the
//! hwseq MMIO block, reports whether a register/field is defined at all on
//! that generation, and extracts named bit-fields from a raw register value.
//!
//! Names are resolved once, at construction, into `RegisterId` - a `Copy`
//! enum - so callers never do string lookups on the hot path.

use crate::chipset::IchChipset;
use crate::regs;

/// A named hwseq register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterId {
    /// Hardware Sequencing Flash Status
    Hsfs,
    /// Hardware Sequencing Flash Control
    Hsfc,
    /// Flash Address
    Faddr,
    /// Flash Data register `i` (0..15)
    Fdata(u8),
    /// Flash Region Access Permissions
    Frap,
    /// Flash Region `i`
    Freg(u8),
    /// Protected Range `i`
    Pr(u8),
    /// BIOS Flash Primary Region
    Bfpr,
    /// Flash Descriptor Observability Control
    Fdoc,
    /// Flash Descriptor Observability Data
    Fdod,
    /// SFDP component/stratum index register
    PtInx,
    /// SFDP data register
    PtData,
}

/// A bit-field within a register value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// HSFC.FGO - cycle go/commit bit
    FGo,
    /// HSFC.FCYCLE - cycle kind selector
    FCycle,
    /// HSFC.FDBC - data byte count (encoded n-1)
    Dbc,
    /// HSFS.FDONE
    FDone,
    /// HSFS.FCERR
    FCErr,
    /// HSFS.AEL
    Ael,
    /// HSFS.SCIP
    Scip,
    /// HSFS.FDV
    Fdv,
    /// HSFS.FLOCKDN
    Flockdn,
    /// Region/range base (bits 14:0, unshifted)
    Rb,
    /// Region/range limit (bits 30:16, unshifted)
    Rl,
    /// Protected range write-protect-enable
    Wpe,
    /// Protected range read-protect-enable
    Rpe,
}

/// Resolves named registers against one detected chipset generation.
#[derive(Debug, Clone, Copy)]
pub struct RegisterCatalog {
    generation: IchChipset,
}

impl RegisterCatalog {
    /// Build a catalog for the given chipset generation
    pub fn new(generation: IchChipset) -> Self {
        Self { generation }
    }

    /// Number of Flash Regions defined on this generation
    ///
    /// ICH9-class hardware exposes 5 (FREG0..FREG4); later generations
    /// extend this up to 10 contiguous regions at the same base, plus a
    /// 12th region (Apollo Lake/EC) at a separate fixed offset.
    pub fn region_count(&self) -> u8 {
        if self.generation.has_new_component_density() {
            10
        } else {
            5
        }
    }

    /// Number of Protected Ranges defined on this generation
    pub fn protected_range_count(&self) -> u8 {
        if self.generation.is_pch100_compatible() {
            6
        } else {
            5
        }
    }

    /// Whether `id` is defined at all on this chipset generation
    pub fn is_register_defined(&self, id: RegisterId) -> bool {
        match id {
            RegisterId::Freg(i) => i < self.region_count() || i == 12,
            RegisterId::Pr(i) => i < self.protected_range_count(),
            RegisterId::Fdata(i) => i < 16,
            _ => true,
        }
    }

    /// Whether hwseq's FCYCLE field is present - i.e. whether hardware
    /// sequencing is available on this generation at all
    pub fn register_has_field(&self, id: RegisterId, field: Field) -> bool {
        matches!(
            (id, field),
            (RegisterId::Hsfc, Field::FCycle) | (RegisterId::Hsfc, Field::FGo) | (RegisterId::Hsfc, Field::Dbc)
        ) && self.generation.supports_hwseq()
    }

    /// Resolve a register to its byte offset within the hwseq MMIO block
    pub fn offset(&self, id: RegisterId) -> Option<usize> {
        if !self.is_register_defined(id) {
            return None;
        }
        Some(match id {
            RegisterId::Hsfs => regs::REG_HSFS,
            RegisterId::Hsfc => regs::REG_HSFC,
            RegisterId::Faddr => regs::REG_FADDR,
            RegisterId::Fdata(i) => regs::fdata_offset(i as usize),
            RegisterId::Frap => regs::REG_FRAP,
            RegisterId::Freg(12) => regs::APL_REG_FREG12,
            RegisterId::Freg(i) => regs::REG_FREG0 + 4 * i as usize,
            RegisterId::Pr(i) if self.generation.is_pch100_compatible() => {
                regs::PCH100_REG_FPR0 + 4 * i as usize
            }
            RegisterId::Pr(i) => regs::REG_PR0 + 4 * i as usize,
            RegisterId::Bfpr => regs::REG_BFPR,
            RegisterId::Fdoc => regs::REG_FDOC,
            RegisterId::Fdod => regs::REG_FDOD,
            RegisterId::PtInx => regs::REG_BIOS_PTINX,
            RegisterId::PtData => regs::REG_BIOS_PTDATA,
        })
    }

    /// Extract a named field from a raw register value
    pub fn get_register_field(&self, raw: u32, field: Field) -> u32 {
        match field {
            Field::FGo => raw & u32::from(regs::HSFC_FGO),
            Field::FCycle => (raw & u32::from(regs::HSFC_FCYCLE)) >> regs::HSFC_FCYCLE_OFF,
            Field::Dbc => (raw & u32::from(regs::HSFC_FDBC)) >> regs::HSFC_FDBC_OFF,
            Field::FDone => raw & u32::from(regs::HSFS_FDONE),
            Field::FCErr => raw & u32::from(regs::HSFS_FCERR),
            Field::Ael => raw & u32::from(regs::HSFS_AEL),
            Field::Scip => raw & u32::from(regs::HSFS_SCIP),
            Field::Fdv => raw & u32::from(regs::HSFS_FDV),
            Field::Flockdn => raw & u32::from(regs::HSFS_FLOCKDN),
            Field::Rb => raw & 0x7fff,
            Field::Rl => (raw >> 16) & 0x7fff,
            Field::Wpe => (raw >> regs::PR_WP_OFF) & 1,
            Field::Rpe => (raw >> regs::PR_RP_OFF) & 1,
        }
    }

    /// The FADDR mask appropriate for this generation
    pub fn faddr_mask(&self) -> u32 {
        if self.generation.is_pch100_compatible() {
            regs::PCH100_FADDR_MASK
        } else {
            regs::FADDR_MASK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ich9_has_five_regions_and_ranges() {
        let cat = RegisterCatalog::new(IchChipset::Ich9);
        assert_eq!(cat.region_count(), 5);
        assert_eq!(cat.protected_range_count(), 5);
        assert!(cat.is_register_defined(RegisterId::Freg(4)));
        assert!(!cat.is_register_defined(RegisterId::Freg(5)));
    }

    #[test]
    fn pch100_extends_regions_and_ranges() {
        let cat = RegisterCatalog::new(IchChipset::Series100SunrisePoint);
        assert_eq!(cat.region_count(), 10);
        assert_eq!(cat.protected_range_count(), 6);
        assert_eq!(cat.offset(RegisterId::Pr(0)), Some(regs::PCH100_REG_FPR0));
    }

    #[test]
    fn pre_hwseq_chipset_lacks_fcycle_field() {
        let cat = RegisterCatalog::new(IchChipset::Ich7);
        assert!(!cat.register_has_field(RegisterId::Hsfc, Field::FCycle));
    }

    #[test]
    fn freg_field_extraction_matches_region_encoding() {
        let cat = RegisterCatalog::new(IchChipset::Ich9);
        // base = 0x1000 (page 1), limit = 0x1FFF (page 1)
        let raw = 0x0001_0001u32;
        let base = cat.get_register_field(raw, Field::Rb) << 12;
        let limit = (cat.get_register_field(raw, Field::Rl) << 12) | 0xfff;
        assert_eq!(base, 0x1000);
        assert_eq!(limit, 0x1fff);
    }
}
