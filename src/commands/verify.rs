//! Verify command implementation

use crate::commands::write::verify_range;
use rflasher_core::programmer::OpaqueMaster;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Compare flash contents starting at `start` against a file
pub fn run_verify(
    master: &mut dyn OpaqueMaster,
    input: &Path,
    start: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let start = start.unwrap_or(0);

    let mut file = File::open(input)?;
    let mut expected = Vec::new();
    file.read_to_end(&mut expected)?;
    println!("Read {} bytes from {:?}", expected.len(), input);

    let size = master.size() as u32;
    if size != 0 && start as u64 + expected.len() as u64 > size as u64 {
        return Err(format!(
            "Verify range 0x{:08X}..0x{:08X} exceeds flash size (0x{:08X})",
            start,
            start as u64 + expected.len() as u64,
            size
        )
        .into());
    }

    verify_range(master, start, &expected)?;
    println!("Verification passed!");
    Ok(())
}
