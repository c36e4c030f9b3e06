// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Library to read metadata and embedded image streams from Canon CR2
//! raw files. The TIFF directory structure is decoded once, embedded
//! streams (preview, thumbnail, medium JPEG, raw sensor data) are read
//! on demand as raw bytes, nothing gets decompressed.
//!
//! # Example
//! ```rust,no_run
//! use std::fs::File;
//! use std::io::BufReader;
//! use cr2meta::ImageKind;
//!
//! fn main() -> cr2meta::Result<()> {
//!   let mut reader = BufReader::new(File::open("IMG_0001.CR2")?);
//!   let cr2 = cr2meta::open(&mut reader)?;
//!   println!("{:?} {:?}", cr2.make(), cr2.model());
//!   if let Some(thumbnail) = cr2.extract_image(&mut reader, ImageKind::Thumbnail)? {
//!     std::fs::write("thumbnail.jpg", thumbnail)?;
//!   }
//!   Ok(())
//! }
//! ```

#![deny(
    //missing_docs,
    //missing_debug_implementations,
    //missing_copy_implementations,
    //unsafe_code,
    unstable_features,
    //unused_import_braces,
    //unused_qualifications
  )]

pub mod bits;
pub(crate) mod envparams;
pub mod formats;
pub mod params;
pub mod tags;

pub use bits::Endian;
pub use formats::cr2::{Cr2File, Header, ImageKind};
pub use formats::tiff::{Entry, IFD, Value};
pub use params::Cr2Params;
pub use tags::{Cr2Tag, TagKey};

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Cr2Error {
  /// Malformed structure, decoding of the file is aborted
  #[error("Format error: {}", _0)]
  Format(String),

  /// Out-of-line value or image stream ends before its declared size
  #[error("Truncated data for tag 0x{tag:04x}: expected {expected} bytes at offset {offset}, got {got}")]
  TruncatedData { tag: u16, offset: u32, expected: u64, got: u64 },

  #[error("IFD index {index} is out of range, file has {count} IFDs")]
  IndexOutOfRange { index: usize, count: usize },

  /// Error of the underlying byte source, passed through untouched
  #[error("I/O error: {:?}", _0)]
  Io(#[from] std::io::Error),
}

impl Cr2Error {
  pub(crate) fn format(msg: impl Into<String>) -> Self {
    Self::Format(msg.into())
  }
}

pub type Result<T> = std::result::Result<T, Cr2Error>;

/// Decode the CR2 structure from a readable source with default parameters.
///
/// The source position is restored after decoding.
pub fn open<R: Read + Seek>(reader: &mut R) -> Result<Cr2File> {
  Cr2File::new(reader, &Cr2Params::default())
}

/// Take a path to a CR2 file and decode its structure
///
/// Parameters are taken from the environment, see [`Cr2Params::from_env`].
///
/// # Example
/// ```rust,ignore
/// let cr2 = match cr2meta::decode_file("path/to/your/file.CR2") {
///   Ok(val) => val,
///   Err(e) => ... some appropriate action when the file is unreadable ...
/// };
/// ```
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Cr2File> {
  let mut reader = BufReader::new(File::open(path.as_ref())?);
  Cr2File::new(&mut reader, &Cr2Params::from_env())
}

#[cfg(test)]
pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}
