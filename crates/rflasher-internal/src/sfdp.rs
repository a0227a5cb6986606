//! SFDP Reader
//!
//! Walks the JESD216 Serial Flash Discoverable Parameters structure through
//! the BIOS_PTINX/BIOS_PTDATA indirection window: a signature dword, a
//! header dword carrying the parameter header count, the first ("JEDEC
//! Basic Flash Parameter") header read straight through PTINX, any
//! additional headers read from FDATA through a dedicated SFDP hwseq cycle,
//! and the JEDEC Basic Flash Parameter Table body itself.

extern crate alloc;
use alloc::vec::Vec;

use crate::catalog::RegisterId;
use crate::cycle::CycleEngine;
use crate::error::InternalError;
use crate::regs::{self, HwSeqCycle, PTINX_COMPONENT_OFF, PTINX_OFFSET_MASK, PTINX_STRATUM_HEADER, PTINX_STRATUM_PARAM_HEADER, PTINX_STRATUM_PARAM_TABLE};

/// One named field within the JEDEC Basic Flash Parameter Table, by dword
/// index and bit range. A representative subset of JESD216, not exhaustive.
#[derive(Debug, Clone, Copy)]
pub struct BfptField {
    /// Field name
    pub name: &'static str,
    /// Dword index within the Basic Table (0-based)
    pub dword: usize,
    /// Bit offset of the field's low bit
    pub bit_offset: u32,
    /// Field width in bits
    pub bit_width: u32,
}

/// Compiled-in subset of the Basic Flash Parameter Table layout
pub const BFPT_FIELDS: &[BfptField] = &[
    BfptField { name: "Block/Sector Erase Size", dword: 0, bit_offset: 2, bit_width: 2 },
    BfptField { name: "Write Granularity", dword: 0, bit_offset: 4, bit_width: 1 },
    BfptField { name: "Write Enable Required for Write Status", dword: 0, bit_offset: 5, bit_width: 1 },
    BfptField { name: "Flash Memory Density", dword: 1, bit_offset: 0, bit_width: 31 },
    BfptField { name: "4KB Erase Opcode", dword: 3, bit_offset: 16, bit_width: 8 },
    BfptField { name: "Erase Type 1 Size", dword: 7, bit_offset: 0, bit_width: 8 },
    BfptField { name: "Erase Type 1 Opcode", dword: 7, bit_offset: 8, bit_width: 8 },
];

/// The first ("JEDEC Basic Flash Parameter") header, read straight through
/// PTINX at stratum 0x1000 - unlike every other header, it carries no
/// manufacturer ID and its table pointer is implicitly 0 (the Basic Table
/// body starts right at stratum 0x2000 offset 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicHeader {
    /// Parameter table minor revision
    pub minor_rev: u8,
    /// Parameter table major revision
    pub major_rev: u8,
    /// Parameter table length, in dwords
    pub length_dwords: u8,
}

/// One additional JESD216 parameter header (index 1..num_param_headers-1).
/// These are never read through PTINX: they're read from FDATA2..FDATA15
/// after issuing a dedicated SFDP hwseq cycle.
#[derive(Debug, Clone, Copy)]
pub struct ParamHeader {
    /// 1-based position of this header within the component's full header
    /// list (the basic header is position 1, so this starts at 2)
    pub header_number: u8,
    /// Manufacturer-ish ID folded out of the header's two FDATA dwords via
    /// an asymmetric mask: high byte of the second dword at bits 15:8
    /// instead of 7:0. Kept bit-for-bit as real hardware reports it rather
    /// than "corrected" against the JEDEC Basic Flash Parameter layout.
    pub id_manuf: u32,
    /// Parameter table minor revision
    pub minor_rev: u8,
    /// Parameter table major revision
    pub major_rev: u8,
    /// Parameter table length, in dwords
    pub length_dwords: u8,
    /// Byte address of this header's own parameter table body (not read by
    /// this driver - only the first/Basic table is walked)
    pub table_pointer: u32,
}

/// Everything read back for one SFDP component (component 0 or 1)
#[derive(Debug, Clone, Default)]
pub struct SfdpComponent {
    /// Component select (0 or 1)
    pub component: u8,
    /// SFDP signature dword, expected to equal [`regs::SFDP_SIGNATURE`]
    pub signature: u32,
    /// SFDP structure minor revision
    pub minor_rev: u8,
    /// SFDP structure major revision
    pub major_rev: u8,
    /// NPH field as read (number of parameter headers minus one)
    pub num_param_headers: u8,
    /// The first parameter header (JEDEC Basic Flash Parameter)
    pub basic_header: BasicHeader,
    /// Additional parameter headers (position 2.., read via the SFDP hwseq
    /// cycle), present only when more than one header was reported
    pub headers: Vec<ParamHeader>,
    /// Raw dwords of the JEDEC Basic Flash Parameter Table body, empty if
    /// it couldn't be read
    pub basic_table: Vec<u32>,
}

fn ptinx_header_base(component: u32) -> u32 {
    (component << PTINX_COMPONENT_OFF) | PTINX_STRATUM_HEADER
}

fn read_ptdata(engine: &CycleEngine<'_>, ptinx: u32) -> u32 {
    engine.write32(RegisterId::PtInx, ptinx);
    engine.read32(RegisterId::PtData).unwrap_or(0)
}

/// Read the additional parameter headers (position 2..num_headers) for one
/// component: zero FDATA12..FDATA15, issue an SFDP cycle, then read each
/// header's pair of dwords from FDATA(2+2i)/FDATA(2+2i+1).
fn read_additional_headers(engine: &CycleEngine<'_>, num_headers: u32) -> Result<Vec<ParamHeader>, InternalError> {
    engine.check_hardware_sequencing()?;

    for i in 12..=15usize {
        engine.mmio().write32(engine.fdata_offset(i), 0);
    }

    if engine.send_cycle(HwSeqCycle::Sfdp, 0x3F, 0).is_err() {
        log::error!("SPI SFDP signature cycle failed");
        return Ok(Vec::new());
    }

    let mut headers = Vec::with_capacity((num_headers - 1) as usize);
    for i in 1..num_headers {
        let d1 = engine.mmio().read32(engine.fdata_offset((2 + 2 * i) as usize));
        let d2 = engine.mmio().read32(engine.fdata_offset((2 + 2 * i + 1) as usize));
        let id_manuf = ((d2 & 0xFF00_0000) >> 16) | (d1 & 0xFF);
        headers.push(ParamHeader {
            header_number: (i + 1) as u8,
            id_manuf,
            minor_rev: ((d1 >> 8) & 0xff) as u8,
            major_rev: ((d1 >> 16) & 0xff) as u8,
            length_dwords: ((d1 >> 24) & 0xff) as u8,
            table_pointer: d2 & 0x00ff_ffff,
        });
    }
    Ok(headers)
}

/// Read SFDP structures for both possible components. Components with no
/// valid "SFDP" signature are skipped entirely (not an error - absence of a
/// second component is normal on single-chip boards).
pub fn get_spi_sfdp(engine: &CycleEngine<'_>) -> Result<Vec<SfdpComponent>, InternalError> {
    if !engine.check_hwseq_available() {
        return Err(InternalError::NotSupported("SFDP read requires a wide HSFC.FCYCLE field"));
    }

    let mut components = Vec::new();

    for component in 0..2u32 {
        let header_base = ptinx_header_base(component);

        let signature = read_ptdata(engine, header_base);
        if signature != regs::SFDP_SIGNATURE {
            continue;
        }

        let version_dword = read_ptdata(engine, header_base | 4);
        let minor_rev = (version_dword & 0xff) as u8;
        let major_rev = ((version_dword >> 8) & 0xff) as u8;
        let nph = ((version_dword >> 16) & 0xff) as u8;

        let param1_base = (component << PTINX_COMPONENT_OFF) | PTINX_STRATUM_PARAM_HEADER;
        let parameter_1 = read_ptdata(engine, param1_base);
        let basic_header = BasicHeader {
            minor_rev: ((parameter_1 >> 8) & 0xff) as u8,
            major_rev: ((parameter_1 >> 16) & 0xff) as u8,
            length_dwords: ((parameter_1 >> 24) & 0xff) as u8,
        };

        let num_headers = u32::from(nph) + 1;
        let headers = if num_headers > 1 {
            read_additional_headers(engine, num_headers)?
        } else {
            Vec::new()
        };

        let table_base = (component << PTINX_COMPONENT_OFF) | PTINX_STRATUM_PARAM_TABLE;
        let dwords = basic_header.length_dwords.max(1) as u32;
        let mut basic_table = Vec::with_capacity(dwords as usize);
        for d in 0..dwords {
            let off = (d * 4) & PTINX_OFFSET_MASK;
            basic_table.push(read_ptdata(engine, table_base | off));
        }

        components.push(SfdpComponent {
            component: component as u8,
            signature,
            minor_rev,
            major_rev,
            num_param_headers: nph,
            basic_header,
            headers,
            basic_table,
        });
    }

    Ok(components)
}

/// Extract a named [`BfptField`] from a component's Basic Table, if present
pub fn read_bfpt_field(component: &SfdpComponent, field: &BfptField) -> Option<u32> {
    let dword = *component.basic_table.get(field.dword)?;
    let mask = if field.bit_width >= 32 {
        u32::MAX
    } else {
        (1u32 << field.bit_width) - 1
    };
    Some((dword >> field.bit_offset) & mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bfpt_field_extraction() {
        let component = SfdpComponent {
            basic_table: alloc::vec![0xABCD_0004, 0, 0, 0x00AB_0000],
            ..Default::default()
        };
        let erase_opcode = BfptField { name: "4KB Erase Opcode", dword: 3, bit_offset: 16, bit_width: 8 };
        assert_eq!(read_bfpt_field(&component, &erase_opcode), Some(0xAB));

        let erase_size = BfptField { name: "Block/Sector Erase Size", dword: 0, bit_offset: 2, bit_width: 2 };
        assert_eq!(read_bfpt_field(&component, &erase_size), Some(1));
    }

    #[test]
    fn missing_dword_returns_none() {
        let component = SfdpComponent::default();
        let field = BfptField { name: "x", dword: 5, bit_offset: 0, bit_width: 8 };
        assert_eq!(read_bfpt_field(&component, &field), None);
    }

    #[test]
    fn additional_header_id_manuf_uses_asymmetric_mask() {
        // byte 0 of the first dword and byte 3 (bits 31:24) of the second,
        // folded into bits 15:8 instead of 7:0 - per spi.py's own formula,
        // not the JEDEC Basic Flash Parameter layout.
        let d1 = 0x1122_33AB_u32;
        let d2 = 0xCD00_0000_u32;
        let id_manuf = ((d2 & 0xFF00_0000) >> 16) | (d1 & 0xFF);
        assert_eq!(id_manuf, 0x0000_CDAB);
    }
}
