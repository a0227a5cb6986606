//! rflasher-core - Core library for flash chip programming
//!
//! This crate provides the shared error type and programmer traits used by
//! `rflasher`'s flash drivers. It is designed to be `no_std` compatible for
//! use in embedded environments.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`)
//! - `alloc` - Enable heap allocation
//!
//! # Example
//!
//! ```ignore
//! use rflasher_core::programmer::OpaqueMaster;
//!
//! fn dump_size<M: OpaqueMaster>(master: &M) {
//!     println!("flash size: {} bytes", master.size());
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod error;
pub mod programmer;

pub use error::{Error, Result};
