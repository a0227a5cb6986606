//! Probe command implementation

use rflasher_core::programmer::OpaqueMaster;

/// Report the flash size (and, where available, identity) the programmer
/// resolved at open time
pub fn run_probe(master: &mut dyn OpaqueMaster) -> Result<(), Box<dyn std::error::Error>> {
    let size = master.size();
    if size == 0 {
        println!("Flash size unknown. Use --length with read/erase to specify size manually.");
    } else {
        println!(
            "Flash size: {} bytes ({} KiB)",
            size,
            size / 1024
        );
    }
    Ok(())
}
