//! Error types for rflasher-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Opcode/operation is not supported by this programmer
    OpcodeNotSupported,

    // Operation errors
    /// Erase operation failed
    EraseError,
    /// Write/program operation failed
    WriteError,
    /// Read operation failed
    ReadError,
    /// Operation timed out
    Timeout,

    // Address/size errors
    /// Address is beyond flash chip size
    AddressOutOfBounds,
    /// Operation requires aligned address or size
    InvalidAlignment,
    /// Provided buffer is too small for the operation
    BufferTooSmall,

    // Protection errors
    /// Flash chip (or a region of it) is write protected
    WriteProtected,
    /// Specific region is protected
    RegionProtected,

    // Programmer errors
    /// Programmer is not ready (not initialized or busy)
    ProgrammerNotReady,
    /// General programmer error
    ProgrammerError,

    // I/O errors
    /// I/O error occurred
    IoError,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpcodeNotSupported => write!(f, "opcode/operation not supported by programmer"),
            Self::EraseError => write!(f, "erase operation failed"),
            Self::WriteError => write!(f, "write operation failed"),
            Self::ReadError => write!(f, "read operation failed"),
            Self::Timeout => write!(f, "operation timed out"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidAlignment => write!(f, "invalid alignment"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::WriteProtected => write!(f, "flash chip is write protected"),
            Self::RegionProtected => write!(f, "region is protected"),
            Self::ProgrammerNotReady => write!(f, "programmer not ready"),
            Self::ProgrammerError => write!(f, "programmer error"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
