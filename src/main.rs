//! rflasher - Intel PCH SPI hardware-sequencing flash assessment driver
//!
//! Drives the SPI controller built into Intel ICH/PCH chipsets directly
//! (the `internal` programmer), or an in-memory emulator (`dummy`) for
//! testing the CLI and its chunked I/O paths without real hardware.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use rflasher_core::programmer::OpaqueMaster;
use std::error::Error;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Commands::Probe { programmer } => {
            let mut master = open_programmer(&cli, programmer)?;
            commands::run_probe(master.as_mut())
        }
        Commands::Read { programmer, output, start, length } => {
            let mut master = open_programmer(&cli, programmer)?;
            commands::run_read(master.as_mut(), output, *start, *length)
        }
        Commands::Write { programmer, input, start, erase, verify } => {
            let mut master = open_programmer(&cli, programmer)?;
            commands::run_write(master.as_mut(), input, *start, *erase, *verify)
        }
        Commands::Erase { programmer, start, length } => {
            let mut master = open_programmer(&cli, programmer)?;
            commands::run_erase(master.as_mut(), *start, *length)
        }
        Commands::Verify { programmer, input, start } => {
            let mut master = open_programmer(&cli, programmer)?;
            commands::run_verify(master.as_mut(), input, *start)
        }
        Commands::ListProgrammers => {
            commands::list_programmers();
            Ok(())
        }
        Commands::JedecId => internal::jedec_id(&cli),
        Commands::JedecIdDecoded => internal::jedec_id_decoded(&cli),
        Commands::Sfdp => internal::sfdp(&cli),
        Commands::Regions { all } => internal::regions(&cli, *all),
        Commands::ProtectedRanges => internal::protected_ranges(&cli),
        Commands::Frap => internal::frap(&cli),
        Commands::Descriptor => internal::descriptor(&cli),
        Commands::WpStatus => internal::wp_status(&cli),
        Commands::WpEnable => internal::wp_enable(&cli),
    }
}

/// Open a programmer backend by name
fn open_programmer(cli: &Cli, name: &str) -> Result<Box<dyn OpaqueMaster>, Box<dyn Error>> {
    match name {
        #[cfg(feature = "dummy")]
        "dummy" => Ok(Box::new(rflasher_dummy::DummyFlash::new_default())),
        #[cfg(feature = "internal")]
        "internal" => {
            let controller = internal::open_controller(cli)?;
            Ok(Box::new(rflasher_internal::InternalProgrammer::from_controller(controller)?))
        }
        other => Err(format!("unknown or unavailable programmer '{}'", other).into()),
    }
}

#[cfg(feature = "internal")]
mod internal {
    use crate::cli::Cli;
    use rflasher_internal::chipset::IchChipset;
    use rflasher_internal::IchSpiController;
    use std::error::Error;

    /// Resolve a controller either via PCI auto-detection, or via the
    /// `--mmio-base`/`--chipset` manual override
    pub fn open_controller(cli: &Cli) -> Result<IchSpiController, Box<dyn Error>> {
        match (cli.mmio_base, cli.chipset.as_deref()) {
            (Some(base), Some(name)) => {
                let generation = IchChipset::parse_override_name(name)
                    .ok_or_else(|| format!("unrecognized --chipset name '{}'", name))?;
                // bus 0, device 31, function 0: the LPC/eSPI bridge that owns
                // BIOS_CNTL on every Intel PCH generation, regardless of where
                // the SPI hwseq MMIO window itself lives.
                Ok(IchSpiController::from_override(generation, base, 0, 31, 0)?)
            }
            (Some(_), None) | (None, Some(_)) => {
                Err("--mmio-base and --chipset must be given together".into())
            }
            (None, None) => Ok(IchSpiController::new()?),
        }
    }

    pub fn jedec_id(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let id = controller.get_spi_jedec_id()?;
        println!(
            "JEDEC ID: manufacturer=0x{:02X} device=0x{:02X}{:02X}",
            id.manufacturer, id.device_id1, id.device_id2
        );
        Ok(())
    }

    pub fn jedec_id_decoded(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let decoded = controller.get_spi_jedec_id_decoded()?;
        println!(
            "JEDEC ID: manufacturer=0x{:02X} device=0x{:02X}{:02X}",
            decoded.raw.manufacturer, decoded.raw.device_id1, decoded.raw.device_id2
        );
        println!("Manufacturer: {}", decoded.manufacturer_name.unwrap_or("unknown"));
        println!("Part: {}", decoded.part_name.unwrap_or("unknown"));
        Ok(())
    }

    pub fn sfdp(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let components = controller.get_spi_sfdp()?;
        if components.is_empty() {
            println!("No SFDP-capable component found.");
            return Ok(());
        }
        for component in &components {
            println!(
                "Component {}: signature=0x{:08X} rev={}.{} headers={}",
                component.component,
                component.signature,
                component.major_rev,
                component.minor_rev,
                component.num_param_headers + 1
            );
            println!(
                "  basic header: rev={}.{} length={} dwords",
                component.basic_header.major_rev,
                component.basic_header.minor_rev,
                component.basic_header.length_dwords
            );
            for header in &component.headers {
                println!(
                    "  parameter #{} id_manuf=0x{:06X} rev={}.{} length={} dwords pointer=0x{:06X}",
                    header.header_number,
                    header.id_manuf,
                    header.major_rev,
                    header.minor_rev,
                    header.length_dwords,
                    header.table_pointer
                );
            }
        }
        Ok(())
    }

    pub fn regions(cli: &Cli, all: bool) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let map = controller.get_spi_regions(all);
        print!("{}", map);
        Ok(())
    }

    pub fn protected_ranges(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let mut any = false;
        for index in 0..6u8 {
            if let Some(range) = controller.get_spi_protected_range(index) {
                println!("{}", range);
                any = true;
            }
        }
        if !any {
            println!("No protected range registers are defined for this chipset.");
        }
        Ok(())
    }

    pub fn frap(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        match controller.get_spi_frap() {
            Some(matrix) => println!("{}", matrix),
            None => println!("FRAP is not defined for this chipset."),
        }
        Ok(())
    }

    pub fn descriptor(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let dump = controller.get_flash_descriptor_dump();
        println!("{}", dump);
        Ok(())
    }

    pub fn wp_status(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        let status = controller.wp_status()?;
        println!("BIOS Lock Enable (BLE):     {}", status.ble);
        println!("BIOS Write Enable (BIOSWE): {}", status.bioswe);
        println!("SMM BIOS Write Protect:     {}", status.smm_bwp);
        Ok(())
    }

    pub fn wp_enable(cli: &Cli) -> Result<(), Box<dyn Error>> {
        let controller = open_controller(cli)?;
        if controller.enable_bios_write()? {
            println!("BIOS Write Enable set.");
        } else {
            println!("BIOS Write Enable did not take (BLE/SMM_BWP locked?).");
        }
        Ok(())
    }
}

#[cfg(not(feature = "internal"))]
mod internal {
    use crate::cli::Cli;
    use std::error::Error;

    fn unsupported() -> Box<dyn Error> {
        "the 'internal' feature is not enabled in this build".into()
    }

    pub fn jedec_id(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn jedec_id_decoded(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn sfdp(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn regions(_cli: &Cli, _all: bool) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn protected_ranges(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn frap(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn descriptor(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn wp_status(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
    pub fn wp_enable(_cli: &Cli) -> Result<(), Box<dyn Error>> { Err(unsupported()) }
}
