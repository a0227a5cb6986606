//! Bulk I/O Orchestrator
//!
//! Splits logical byte-range read/write/erase requests into the fixed-size
//! hardware cycles the Cycle Engine understands, and marshals FDATA through
//! [`crate::fdata`].

extern crate alloc;
use alloc::vec::Vec;

use crate::cycle::CycleEngine;
use crate::error::InternalError;
use crate::fdata;
use crate::regs::HwSeqCycle;

/// Maximum Data Byte Count for a read cycle
const MAX_READ_DBC: usize = 64;
/// Data Byte Count used for every write cycle - never widened past 4 bytes
const WRITE_DBC: usize = 4;
/// Erase granularity: hwseq always erases one hardware-defined 4 KiB block
const ERASE_BLOCK_LEN: u32 = 4096;

/// Outcome of a bulk read. `bytes` holds everything read before the first
/// failure (if any); `first_failed` names the FLA of the cycle that broke
/// the run, so a caller can tell "read this much, then X went wrong" apart
/// from "all of it succeeded".
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    /// Bytes read so far, in order
    pub bytes: Vec<u8>,
    /// FLA of the first cycle that failed, if any
    pub first_failed: Option<u32>,
}

impl ReadOutcome {
    /// Number of bytes successfully read
    pub fn bytes_read(&self) -> usize {
        self.bytes.len()
    }
}

/// Read `n` bytes starting at `fla`. Chooses DBC=64 when `n >= 64`, else 4;
/// splits into `q` full chunks plus an `r`-byte remainder. A failed chunk
/// stops the read; everything read up to that point is still returned.
pub fn read_spi(engine: &CycleEngine<'_>, fla: u32, n: usize) -> Result<ReadOutcome, InternalError> {
    engine.check_hardware_sequencing()?;

    let dbc = if n >= MAX_READ_DBC { MAX_READ_DBC } else { 4 };
    let q = n / dbc;
    let r = n % dbc;
    log::debug!(
        "reading {:#x} bytes from SPI at FLA={:#x} ({} {:#x}-byte chunks + {:#x}-byte remainder)",
        n, fla, q, dbc, r
    );

    engine.wait_cycle_done()?;

    let mut bytes = Vec::with_capacity(n);
    let mut first_failed = None;

    for i in 0..q {
        let chunk_fla = fla + (i * dbc) as u32;
        if engine.send_cycle(HwSeqCycle::Read, (dbc - 1) as u8, chunk_fla).is_err() {
            log::error!("SPI flash read failed at {:#x}", chunk_fla);
            first_failed = Some(chunk_fla);
            break;
        }
        let mut chunk = [0u8; MAX_READ_DBC];
        fdata::read_bytes(engine, &mut chunk[..dbc]);
        bytes.extend_from_slice(&chunk[..dbc]);
    }

    if r != 0 && first_failed.is_none() {
        let rem_fla = fla + (q * dbc) as u32;
        if engine.send_cycle(HwSeqCycle::Read, (r - 1) as u8, rem_fla).is_err() {
            log::error!("SPI flash read failed at {:#x}", rem_fla);
            first_failed = Some(rem_fla);
        } else {
            let mut chunk = [0u8; MAX_READ_DBC];
            fdata::read_bytes(engine, &mut chunk[..r]);
            bytes.extend_from_slice(&chunk[..r]);
        }
    }

    Ok(ReadOutcome { bytes, first_failed })
}

/// Write `buf` starting at `fla`. DBC is always 4; the return value is the
/// logical AND of every chunk's outcome.
pub fn write_spi(engine: &CycleEngine<'_>, fla: u32, buf: &[u8]) -> Result<bool, InternalError> {
    engine.check_hardware_sequencing()?;

    let n = buf.len();
    let q = n / WRITE_DBC;
    let r = n % WRITE_DBC;
    log::debug!(
        "writing {:#x} bytes to SPI at FLA={:#x} ({} {:#x}-byte chunks + {:#x}-byte remainder)",
        n, fla, q, WRITE_DBC, r
    );

    engine.wait_cycle_done()?;

    let mut ok = true;
    for i in 0..q {
        let chunk = &buf[i * WRITE_DBC..i * WRITE_DBC + WRITE_DBC];
        fdata::write_bytes(engine, chunk);
        let chunk_fla = fla + (i * WRITE_DBC) as u32;
        if engine
            .send_cycle(HwSeqCycle::Write, (WRITE_DBC - 1) as u8, chunk_fla)
            .is_err()
        {
            log::error!("SPI flash write cycle failed at {:#x}", chunk_fla);
            ok = false;
        }
    }

    if r != 0 {
        let chunk = &buf[q * WRITE_DBC..];
        fdata::write_bytes(engine, chunk);
        let rem_fla = fla + (q * WRITE_DBC) as u32;
        if engine.send_cycle(HwSeqCycle::Write, (r - 1) as u8, rem_fla).is_err() {
            log::error!("SPI flash write cycle failed at {:#x}", rem_fla);
            ok = false;
        }
    }

    Ok(ok)
}

/// Erase one hardware-defined 4 KiB block at `fla`. `fla` should be
/// block-aligned; the hardware interprets FADDR bits 11:0 as part of the
/// address regardless, so misalignment silently erases the containing block.
pub fn erase_spi_block(engine: &CycleEngine<'_>, fla: u32) -> Result<bool, InternalError> {
    engine.check_hardware_sequencing()?;
    log::debug!("erasing SPI flash block at {:#x}", fla);

    engine.wait_cycle_done()?;

    match engine.send_cycle(HwSeqCycle::Erase, 0, fla) {
        Ok(()) => Ok(true),
        Err(e) => {
            log::error!("SPI flash erase cycle failed: {}", e);
            Ok(false)
        }
    }
}

/// Block size assumed by higher-level erase-range helpers (the CLI, tests)
pub fn erase_block_len() -> u32 {
    ERASE_BLOCK_LEN
}
