//! FDATA marshalling
//!
//! FDATA0..FDATA15 are treated as one flat 64-byte little-endian buffer for
//! both reads and writes, centralizing the packing/unpacking every other
//! module (Bulk I/O, SFDP) would otherwise duplicate.

use crate::cycle::CycleEngine;

/// Read `out.len()` bytes from FDATA0.. into `out`, dword by dword.
///
/// The last partial dword (when `out.len()` isn't a multiple of 4) only
/// contributes its low bytes - this is what lets the same helper serve both
/// full 64/4-byte hwseq chunks and the trailing remainder.
pub fn read_bytes(engine: &CycleEngine<'_>, out: &mut [u8]) {
    let ndwords = out.len().div_ceil(4);
    for i in 0..ndwords {
        let dword = engine.mmio().read32(engine.fdata_offset(i));
        let bytes = dword.to_le_bytes();
        let start = i * 4;
        let n = core::cmp::min(4, out.len() - start);
        out[start..start + n].copy_from_slice(&bytes[..n]);
    }
}

/// Pack up to 4 bytes little-endian into FDATA0, zero-padding any high bytes
/// beyond `data.len()`.
pub fn write_bytes(engine: &CycleEngine<'_>, data: &[u8]) {
    debug_assert!(data.len() <= 4, "write cycles never exceed a 4-byte chunk");
    let mut dword = 0u32;
    for (i, &byte) in data.iter().enumerate() {
        dword |= u32::from(byte) << (8 * i);
    }
    engine.mmio().write32(engine.fdata_offset(0), dword);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::RegisterCatalog;
    use crate::chipset::IchChipset;
    use crate::physmap::PhysMap;

    fn test_engine(mmio: &PhysMap) -> CycleEngine<'_> {
        CycleEngine::new(mmio, RegisterCatalog::new(IchChipset::Ich9))
    }

    #[test]
    #[cfg_attr(not(all(feature = "std", target_os = "linux")), ignore)]
    fn write_then_read_roundtrips_remainder() {
        // PhysMap's non-Linux stub always returns zero/errors, so this only
        // exercises the pure byte-packing logic under the Linux backend.
        if let Ok(mmio) = PhysMap::new(0, 0x200) {
            let engine = test_engine(&mmio);
            write_bytes(&engine, &[0x11, 0x22, 0x33]);
            let mut out = [0u8; 3];
            read_bytes(&engine, &mut out);
            assert_eq!(out, [0x11, 0x22, 0x33]);
        }
    }
}
