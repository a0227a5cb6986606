//! JEDEC ID Reader
//!
//! Issues a hardware-sequencing JEDEC cycle and unpacks the 3-byte
//! manufacturer/device ID out of FDATA0, the same way SFDP reads share the
//! PTINX/PTDATA path rather than a normal FLA-addressed cycle.

use crate::cycle::CycleEngine;
use crate::error::InternalError;
use crate::regs::HwSeqCycle;

/// Raw JEDEC manufacturer + device ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JedecId {
    /// JEDEC manufacturer ID (bank 0 only - extended banks are not decoded)
    pub manufacturer: u8,
    /// Device ID, byte 1 (memory type on most parts)
    pub device_id1: u8,
    /// Device ID, byte 2 (memory density/capacity on most parts)
    pub device_id2: u8,
}

/// Issue a JEDEC ID cycle and return the raw 3 bytes latched in FDATA0.
///
/// Guarded by the same FCYCLE-field check SFDP uses: hardware too old to
/// have a wide-enough FCYCLE field can't select the JEDEC cycle kind at all.
pub fn get_spi_jedec_id(engine: &CycleEngine<'_>) -> Result<JedecId, InternalError> {
    engine.check_hardware_sequencing()?;
    if !engine.check_hwseq_available() {
        return Err(InternalError::NotSupported("JEDEC ID cycle requires a wide HSFC.FCYCLE field"));
    }

    engine.wait_cycle_done()?;
    engine.send_cycle(HwSeqCycle::Jedec, 4 - 1, 0)?;

    let dword = engine.mmio().read32(engine.fdata_offset(0));
    let manufacturer = (dword & 0xff) as u8;
    let device_id1 = ((dword >> 8) & 0xff) as u8;
    let device_id2 = ((dword >> 16) & 0xff) as u8;

    Ok(JedecId {
        manufacturer,
        device_id1,
        device_id2,
    })
}

/// A decoded, human-readable JEDEC identity
#[derive(Debug, Clone, Copy)]
pub struct JedecIdDecoded {
    /// Raw ID this was decoded from
    pub raw: JedecId,
    /// Manufacturer name, if recognized
    pub manufacturer_name: Option<&'static str>,
    /// Part name, if recognized
    pub part_name: Option<&'static str>,
}

/// JEDEC manufacturer ID -> name, common SPI flash vendors only
const MANUFACTURERS: &[(u8, &str)] = &[
    (0xEF, "Winbond"),
    (0xC2, "Macronix"),
    (0x20, "Micron/ST"),
    (0x01, "Spansion/Cypress"),
    (0x9D, "ISSI"),
    (0xBF, "SST"),
    (0x1C, "EON"),
    (0xC8, "GigaDevice"),
];

/// (manufacturer, device_id1, device_id2) -> part name, a representative
/// subset of common parts rather than an exhaustive database
const PARTS: &[(u8, u8, u8, &str)] = &[
    (0xEF, 0x40, 0x18, "W25Q128"),
    (0xEF, 0x40, 0x17, "W25Q64"),
    (0xEF, 0x40, 0x16, "W25Q32"),
    (0xC2, 0x20, 0x18, "MX25L12805D"),
    (0x20, 0xBA, 0x18, "N25Q128"),
    (0xC8, 0x40, 0x18, "GD25Q127C"),
];

/// Decode a raw [`JedecId`] against the compiled-in manufacturer/part tables
pub fn decode_jedec_id(raw: JedecId) -> JedecIdDecoded {
    let manufacturer_name = MANUFACTURERS
        .iter()
        .find(|(id, _)| *id == raw.manufacturer)
        .map(|(_, name)| *name);
    let part_name = PARTS
        .iter()
        .find(|(m, d1, d2, _)| *m == raw.manufacturer && *d1 == raw.device_id1 && *d2 == raw.device_id2)
        .map(|(_, _, _, name)| *name);

    JedecIdDecoded {
        raw,
        manufacturer_name,
        part_name,
    }
}

/// Issue a JEDEC ID cycle and decode the result against the compiled-in
/// manufacturer/part tables
pub fn get_spi_jedec_id_decoded(engine: &CycleEngine<'_>) -> Result<JedecIdDecoded, InternalError> {
    let raw = get_spi_jedec_id(engine)?;
    Ok(decode_jedec_id(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_winbond_part() {
        let raw = JedecId {
            manufacturer: 0xEF,
            device_id1: 0x40,
            device_id2: 0x18,
        };
        let decoded = decode_jedec_id(raw);
        assert_eq!(decoded.manufacturer_name, Some("Winbond"));
        assert_eq!(decoded.part_name, Some("W25Q128"));
    }

    #[test]
    fn unknown_id_decodes_to_none() {
        let raw = JedecId {
            manufacturer: 0xFF,
            device_id1: 0xFF,
            device_id2: 0xFF,
        };
        let decoded = decode_jedec_id(raw);
        assert_eq!(decoded.manufacturer_name, None);
        assert_eq!(decoded.part_name, None);
    }
}
