//! Write command implementation

use indicatif::{ProgressBar, ProgressStyle};
use rflasher_core::programmer::OpaqueMaster;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

const CHUNK_SIZE: usize = 4096;

/// Write a file's contents to flash starting at `start`, optionally erasing
/// the target range first and verifying afterwards
pub fn run_write(
    master: &mut dyn OpaqueMaster,
    input: &Path,
    start: Option<u32>,
    do_erase: bool,
    do_verify: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = start.unwrap_or(0);

    let mut file = File::open(input)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    println!("Read {} bytes from {:?}", data.len(), input);

    let size = master.size() as u32;
    if size != 0 && start as u64 + data.len() as u64 > size as u64 {
        return Err(format!(
            "Write range 0x{:08X}..0x{:08X} exceeds flash size (0x{:08X})",
            start,
            start as u64 + data.len() as u64,
            size
        )
        .into());
    }

    if do_erase {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.set_message(format!("Erasing {} bytes at 0x{:08X}...", data.len(), start));
        pb.enable_steady_tick(Duration::from_millis(100));
        master.erase(start, data.len() as u32)?;
        pb.finish_with_message("Erase complete");
    }

    let pb = ProgressBar::new(data.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) Writing")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    while offset < data.len() {
        let chunk_len = std::cmp::min(CHUNK_SIZE, data.len() - offset);
        master.write(start + offset as u32, &data[offset..offset + chunk_len])?;
        offset += chunk_len;
        pb.set_position(offset as u64);
    }
    pb.finish_with_message("Write complete");

    if do_verify {
        verify_range(master, start, &data)?;
        println!("Verification passed");
    }

    Ok(())
}

/// Read back `expected.len()` bytes starting at `start` and compare
pub fn verify_range(
    master: &mut dyn OpaqueMaster,
    start: u32,
    expected: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(expected.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) Verifying")?
            .progress_chars("#>-"),
    );

    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut offset = 0usize;
    while offset < expected.len() {
        let chunk_len = std::cmp::min(CHUNK_SIZE, expected.len() - offset);
        let chunk = &mut buf[..chunk_len];
        master.read(start + offset as u32, chunk)?;

        let expected_chunk = &expected[offset..offset + chunk_len];
        if chunk != expected_chunk {
            pb.abandon_with_message("Verification failed");
            for (i, (a, b)) in chunk.iter().zip(expected_chunk.iter()).enumerate() {
                if a != b {
                    return Err(format!(
                        "Verification failed at offset 0x{:08X}: expected 0x{:02X}, got 0x{:02X}",
                        start as usize + offset + i,
                        b,
                        a
                    )
                    .into());
                }
            }
        }
        offset += chunk_len;
        pb.set_position(offset as u64);
    }
    pb.finish_with_message("Verification passed");
    Ok(())
}
