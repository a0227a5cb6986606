//! Read command implementation

use indicatif::{ProgressBar, ProgressStyle};
use rflasher_core::programmer::OpaqueMaster;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const CHUNK_SIZE: usize = 4096;

/// Read `length` bytes starting at `start` (defaulting to the whole reported
/// flash size) and write them to `output`
pub fn run_read(
    master: &mut dyn OpaqueMaster,
    output: &Path,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = start.unwrap_or(0);
    let length = match length {
        Some(len) => len,
        None => {
            let size = master.size() as u32;
            if size == 0 {
                return Err("Flash size unknown; specify --length explicitly".into());
            }
            size.saturating_sub(start)
        }
    };

    println!("Reading {} bytes starting at 0x{:08X}", length, start);

    let pb = ProgressBar::new(u64::from(length));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut data = vec![0u8; length as usize];
    let mut offset = 0u32;
    while offset < length {
        let chunk_len = std::cmp::min(CHUNK_SIZE, (length - offset) as usize);
        master.read(start + offset, &mut data[offset as usize..offset as usize + chunk_len])?;
        offset += chunk_len as u32;
        pb.set_position(u64::from(offset));
    }
    pb.finish_with_message("Read complete");

    let mut file = File::create(output)?;
    file.write_all(&data)?;
    println!("Wrote {} bytes to {:?}", data.len(), output);

    Ok(())
}
