//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rflasher")]
#[command(author, version, about = "Intel PCH SPI flash assessment driver", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Skip PCI auto-detection and use this MMIO base address for the SPI
    /// hardware-sequencing register block instead (hex, e.g. 0xfe010000).
    /// Must be paired with --chipset.
    #[arg(long, value_parser = parse_hex_u32, global = true)]
    pub mmio_base: Option<u32>,

    /// Chipset generation to assume when --mmio-base bypasses detection
    /// (e.g. ich9, pch100, series300, emmitsburg). See chipset.rs for the
    /// full set of recognized names.
    #[arg(long, global = true)]
    pub chipset: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

fn parse_hex_u32(s: &str) -> Result<u32, String> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid hex address '{}': {}", s, e))
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe the selected programmer and report flash size / identity
    Probe {
        /// Programmer to use (dummy, internal)
        #[arg(short, long, default_value = "internal")]
        programmer: String,
    },

    /// Read flash contents to a file
    Read {
        /// Programmer to use (dummy, internal)
        #[arg(short, long, default_value = "internal")]
        programmer: String,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Start address (defaults to 0)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to read (defaults to the whole chip)
        #[arg(long)]
        length: Option<u32>,
    },

    /// Write a file's contents to flash
    Write {
        /// Programmer to use (dummy, internal)
        #[arg(short, long, default_value = "internal")]
        programmer: String,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,

        /// Start address (defaults to 0)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Erase the target range before writing
        #[arg(long)]
        erase: bool,

        /// Read back and compare after writing
        #[arg(long)]
        verify: bool,
    },

    /// Erase a range of flash (or the whole chip)
    Erase {
        /// Programmer to use (dummy, internal)
        #[arg(short, long, default_value = "internal")]
        programmer: String,

        /// Start address (required together with --length)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,

        /// Number of bytes to erase (required together with --start)
        #[arg(long)]
        length: Option<u32>,
    },

    /// Compare flash contents against a file
    Verify {
        /// Programmer to use (dummy, internal)
        #[arg(short, long, default_value = "internal")]
        programmer: String,

        /// Input file to compare against
        #[arg(short, long)]
        input: PathBuf,

        /// Start address (defaults to 0)
        #[arg(long, value_parser = parse_hex_u32)]
        start: Option<u32>,
    },

    /// List programmer backends
    ListProgrammers,

    /// Read the raw JEDEC manufacturer/device ID (internal programmer only)
    JedecId,

    /// Read and decode the JEDEC ID against the compiled-in part tables
    /// (internal programmer only)
    JedecIdDecoded,

    /// Walk the SFDP parameter tables of both flash components
    /// (internal programmer only)
    Sfdp,

    /// Decode Flash Regions 0..11 (internal programmer only)
    Regions {
        /// Include regions with limit < base (normally hidden as unavailable)
        #[arg(long)]
        all: bool,
    },

    /// Decode the Protected Range registers (internal programmer only)
    ProtectedRanges,

    /// Decode the FRAP access-grant matrix (internal programmer only)
    Frap,

    /// Dump the Flash Descriptor's observable sections (internal programmer only)
    Descriptor,

    /// Show current BIOS write-protection state (internal programmer only)
    WpStatus,

    /// Set BIOS Write Enable in BIOS_CNTL (internal programmer only)
    WpEnable,
}
