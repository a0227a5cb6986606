//! Erase command implementation

use indicatif::{ProgressBar, ProgressStyle};
use rflasher_core::programmer::OpaqueMaster;
use std::time::Duration;

/// Erase `length` bytes starting at `start`, or the whole reported flash
/// size if neither is given
pub fn run_erase(
    master: &mut dyn OpaqueMaster,
    start: Option<u32>,
    length: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (start, length) = match (start, length) {
        (Some(s), Some(l)) => (s, l),
        (None, None) => {
            let size = master.size() as u32;
            if size == 0 {
                return Err("Flash size unknown; specify --start and --length explicitly".into());
            }
            (0, size)
        }
        _ => return Err("Both --start and --length must be specified for a partial erase".into()),
    };

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Erasing {} bytes at 0x{:08X}...", length, start));
    pb.enable_steady_tick(Duration::from_millis(100));

    master.erase(start, length)?;

    pb.finish_with_message(format!("Erased {} bytes at 0x{:08X}", length, start));
    Ok(())
}
