//! Region & Descriptor Decoder
//!
//! Reads Flash Regions, Protected Ranges, the BIOS Primary Region, and the
//! FRAP access-grant matrix purely from already-latched register state - none
//! of these operations issue a hardware cycle.

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::fmt;

use crate::catalog::{Field, RegisterId};
use crate::cycle::CycleEngine;

/// Symbolic names for regions 0..11, ported from chipsec's `SPI_REGION_NAMES`
fn region_name(id: u8) -> &'static str {
    match id {
        0 => "Flash Descriptor",
        1 => "BIOS",
        2 => "Intel ME",
        3 => "GBe",
        4 => "Platform Data",
        5 => "Flash Region 5",
        6 => "Flash Region 6",
        7 => "Flash Region 7",
        8 => "Embedded Controller",
        9 => "Flash Region 9",
        10 => "Flash Region 10",
        11 => "Flash Region 11",
        _ => "Unknown Region",
    }
}

/// One decoded Flash Region (or the BIOS Primary Region, which shares the
/// same base/limit encoding)
#[derive(Debug, Clone, Copy)]
pub struct Region {
    /// Region id (0..11)
    pub id: u8,
    /// Symbolic name
    pub name: &'static str,
    /// Flash Linear Address of the first byte
    pub base: u32,
    /// Flash Linear Address of the last byte (inclusive)
    pub limit: u32,
    /// Raw register value
    pub raw: u32,
}

impl Region {
    /// Size in bytes. Only meaningful when `limit >= base`.
    pub fn size(&self) -> u32 {
        self.limit.wrapping_sub(self.base).wrapping_add(1)
    }

    /// Whether this region is available (limit >= base)
    pub fn is_available(&self) -> bool {
        self.limit >= self.base
    }
}

/// A mapping of region id to decoded [`Region`]
#[derive(Debug, Clone, Default)]
pub struct RegionMap(pub BTreeMap<u8, Region>);

impl fmt::Display for RegionMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "------------------------------------------------------------")?;
        writeln!(f, "Flash Region             | FREGx Reg | Base     | Limit     ")?;
        writeln!(f, "------------------------------------------------------------")?;
        for region in self.0.values() {
            writeln!(
                f,
                "{} {:<22} | {:08X}  | {:08X} | {:08X}",
                region.id, region.name, region.raw, region.base, region.limit
            )?;
        }
        Ok(())
    }
}

/// Decode Flash Regions 0..11. With `all_regions = false`, entries where
/// `limit < base` (unavailable regions) are dropped.
pub fn get_spi_regions(engine: &CycleEngine<'_>, all_regions: bool) -> RegionMap {
    let catalog = engine.catalog();
    let mut map = BTreeMap::new();

    for id in 0..=11u8 {
        let reg_id = RegisterId::Freg(id);
        if !catalog.is_register_defined(reg_id) {
            continue;
        }
        let raw = match engine.read32(reg_id) {
            Some(v) => v,
            None => continue,
        };
        let base = catalog.get_register_field(raw, Field::Rb) << 12;
        let limit = (catalog.get_register_field(raw, Field::Rl) << 12) | 0xfff;
        let region = Region {
            id,
            name: region_name(id),
            base,
            limit,
            raw,
        };
        if all_regions || region.is_available() {
            map.insert(id, region);
        }
    }

    RegionMap(map)
}

/// BIOS Flash Primary Region (BFPR) - shares the FREGx base/limit encoding
pub fn get_spi_bfpr(engine: &CycleEngine<'_>) -> Option<Region> {
    let catalog = engine.catalog();
    let raw = engine.read32(RegisterId::Bfpr)?;
    let base = catalog.get_register_field(raw, Field::Rb) << 12;
    let limit = (catalog.get_register_field(raw, Field::Rl) << 12) | 0xfff;
    Some(Region {
        id: 1,
        name: "BIOS",
        base,
        limit,
        raw,
    })
}

/// One decoded Protected Range (PR0..PR4, or PR0..PR5 on PCH100+)
#[derive(Debug, Clone, Copy)]
pub struct ProtectedRange {
    /// Range index
    pub index: u8,
    /// Flash Linear Address of the first protected byte
    pub base: u32,
    /// Flash Linear Address of the last protected byte (inclusive)
    pub limit: u32,
    /// Write-protect-enable
    pub wpe: bool,
    /// Read-protect-enable
    pub rpe: bool,
    /// Raw register value
    pub raw: u32,
}

impl ProtectedRange {
    /// A range is active iff either protection bit is set
    pub fn is_active(&self) -> bool {
        self.wpe || self.rpe
    }
}

impl fmt::Display for ProtectedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PR{} | {:08X} | {:08X} | {:08X} | {}   | {}",
            self.index, self.raw, self.base, self.limit, self.wpe as u8, self.rpe as u8
        )
    }
}

/// Decode Protected Range `index`. Only when WPE or RPE is set is the limit
/// canonicalized with the low-12 page mask - an inactive range's raw limit
/// bits are returned unchanged.
pub fn get_spi_protected_range(engine: &CycleEngine<'_>, index: u8) -> Option<ProtectedRange> {
    let catalog = engine.catalog();
    let reg_id = RegisterId::Pr(index);
    if !catalog.is_register_defined(reg_id) {
        return None;
    }
    let raw = engine.read32(reg_id)?;
    let base = catalog.get_register_field(raw, Field::Rb) << 12;
    let mut limit = catalog.get_register_field(raw, Field::Rl) << 12;
    let wpe = catalog.get_register_field(raw, Field::Wpe) != 0;
    let rpe = catalog.get_register_field(raw, Field::Rpe) != 0;
    if wpe || rpe {
        limit |= 0xfff;
    }
    Some(ProtectedRange {
        index,
        base,
        limit,
        wpe,
        rpe,
        raw,
    })
}

/// The FRAP access-grant matrix: four 8-bit lanes, one bit per region
#[derive(Debug, Clone, Copy)]
pub struct AccessMatrix {
    /// BIOS Region Read Access (current master)
    pub brra: u8,
    /// BIOS Region Write Access (current master)
    pub brwa: u8,
    /// BIOS Region Read Access Grant (per-master)
    pub bmrag: u8,
    /// BIOS Region Write Access Grant (per-master)
    pub bmwag: u8,
    /// Raw FRAP value
    pub raw: u32,
}

impl AccessMatrix {
    /// Whether the current master may read region `id`
    pub fn can_read(&self, id: u8) -> bool {
        self.brra & (1 << id) != 0
    }

    /// Whether the current master may write region `id`
    pub fn can_write(&self, id: u8) -> bool {
        self.brwa & (1 << id) != 0
    }
}

impl fmt::Display for AccessMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FRAP = {:08X}", self.raw)?;
        writeln!(f, "BIOS Region Write Access Grant ({:02X}):", self.bmwag)?;
        writeln!(f, "BIOS Region Read Access Grant ({:02X}):", self.bmrag)?;
        writeln!(f, "BIOS Region Write Access ({:02X}):", self.brwa)?;
        write!(f, "BIOS Region Read Access ({:02X}):", self.brra)
    }
}

/// Decode the FRAP register into its four 8-bit lanes
pub fn get_spi_frap(engine: &CycleEngine<'_>) -> Option<AccessMatrix> {
    let raw = engine.read32(RegisterId::Frap)?;
    Some(AccessMatrix {
        brra: raw as u8,
        brwa: (raw >> 8) as u8,
        bmrag: (raw >> 16) as u8,
        bmwag: (raw >> 24) as u8,
        raw,
    })
}

// Flash Descriptor Observability Control (FDOC) section selectors
const FDOC_FDSS_OFF: u32 = 12;
const FDSS_FSDM: u32 = 0 << FDOC_FDSS_OFF;
const FDSS_COMP: u32 = 1 << FDOC_FDSS_OFF;
const FDSS_REGN: u32 = 2 << FDOC_FDSS_OFF;
const FDSS_MSTR: u32 = 3 << FDOC_FDSS_OFF;

/// A dump of the Flash Descriptor's four observable sections, read a dword
/// at a time through FDOC/FDOD
#[derive(Debug, Clone, Default)]
pub struct FlashDescriptorDump {
    /// Signature and Descriptor Map section (5 dwords)
    pub signature_map: Vec<u32>,
    /// Components section (3 dwords)
    pub components: Vec<u32>,
    /// Regions section (5 dwords)
    pub regions: Vec<u32>,
    /// Masters section (3 dwords)
    pub masters: Vec<u32>,
}

impl fmt::Display for FlashDescriptorDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Flash Signature and Descriptor Map:")?;
        for dword in &self.signature_map {
            writeln!(f, "{:08X}", dword)?;
        }
        writeln!(f, "Components:")?;
        for dword in &self.components {
            writeln!(f, "{:08X}", dword)?;
        }
        writeln!(f, "Regions:")?;
        for dword in &self.regions {
            writeln!(f, "{:08X}", dword)?;
        }
        writeln!(f, "Masters:")?;
        for (i, dword) in self.masters.iter().enumerate() {
            if i + 1 == self.masters.len() {
                write!(f, "{:08X}", dword)?;
            } else {
                writeln!(f, "{:08X}", dword)?;
            }
        }
        Ok(())
    }
}

fn read_fdoc_section(engine: &CycleEngine<'_>, fdss: u32, count: usize) -> Vec<u32> {
    let mut out = Vec::with_capacity(count);
    for j in 0..count {
        let offset = fdss | ((j as u32) << 2);
        engine.write32(RegisterId::Fdoc, offset);
        out.push(engine.read32(RegisterId::Fdod).unwrap_or(0));
    }
    out
}

/// Read all four Flash Descriptor observability sections
pub fn get_flash_descriptor_dump(engine: &CycleEngine<'_>) -> FlashDescriptorDump {
    FlashDescriptorDump {
        signature_map: read_fdoc_section(engine, FDSS_FSDM, 5),
        components: read_fdoc_section(engine, FDSS_COMP, 3),
        regions: read_fdoc_section(engine, FDSS_REGN, 5),
        masters: read_fdoc_section(engine, FDSS_MSTR, 3),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_size_and_availability() {
        let region = Region {
            id: 1,
            name: "BIOS",
            base: 0x1000,
            limit: 0x1FFF,
            raw: 0,
        };
        assert_eq!(region.size(), 0x1000);
        assert!(region.is_available());

        let empty = Region {
            id: 5,
            name: "Flash Region 5",
            base: 0x2000,
            limit: 0x1000,
            raw: 0,
        };
        assert!(!empty.is_available());
    }

    #[test]
    fn protected_range_active_only_when_flagged() {
        let inactive = ProtectedRange {
            index: 0,
            base: 0,
            limit: 0x123,
            wpe: false,
            rpe: false,
            raw: 0,
        };
        assert!(!inactive.is_active());

        let active = ProtectedRange {
            index: 1,
            base: 0,
            limit: 0xFFF,
            wpe: true,
            rpe: false,
            raw: 0,
        };
        assert!(active.is_active());
    }

    #[test]
    fn access_matrix_bit_per_region() {
        let matrix = AccessMatrix {
            brra: 0b0000_0011,
            brwa: 0b0000_0001,
            bmrag: 0,
            bmwag: 0,
            raw: 0,
        };
        assert!(matrix.can_read(0));
        assert!(matrix.can_read(1));
        assert!(!matrix.can_read(2));
        assert!(matrix.can_write(0));
        assert!(!matrix.can_write(1));
    }
}
