// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use serde::{Deserialize, Serialize};

use crate::{Cr2Error, Result, bits::Endian, formats::tiff::TIFF_MAGIC};

pub const HEADER_SIZE: usize = 16;

/// "CR" as found at offset 8 of every CR2 file
pub const CR2_MAGIC: [u8; 2] = *b"CR";

/// The 16-byte CR2 file header
///
/// | Offset | Size | Field          |
/// |--------|------|----------------|
/// | 0      | 2    | byte order     |
/// | 2      | 2    | TIFF magic, 42 |
/// | 4      | 4    | TIFF offset    |
/// | 8      | 2    | CR2 magic      |
/// | 10     | 1    | major version  |
/// | 11     | 1    | minor version  |
/// | 12     | 4    | raw IFD offset |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
  pub endian: Endian,
  pub tiff_magic_word: u16,
  /// Offset of the first IFD
  pub tiff_offset: u32,
  pub cr2_magic_word: u16,
  pub major_version: u8,
  pub minor_version: u8,
  pub raw_ifd_offset: u32,
  /// Header bytes as found in the file
  pub raw: [u8; HEADER_SIZE],
}

impl Header {
  /// Read and validate the header at the current reader position.
  pub fn parse<R: Read>(reader: &mut R) -> Result<Header> {
    let mut blob = Vec::with_capacity(HEADER_SIZE);
    reader.take(HEADER_SIZE as u64).read_to_end(&mut blob)?;
    Self::new(&blob)
  }

  /// Validate and unpack a header from its raw bytes
  pub fn new(blob: &[u8]) -> Result<Header> {
    let raw: [u8; HEADER_SIZE] = blob
      .get(..HEADER_SIZE)
      .and_then(|b| b.try_into().ok())
      .ok_or_else(|| Cr2Error::format("bad header length"))?;

    let marker = BigEndian::read_u16(&raw[0..2]);
    let endian = Endian::from_marker(marker).ok_or_else(|| Cr2Error::format("bad byte order marker"))?;

    let tiff_magic_word = endian.read_u16(&raw, 2);
    if tiff_magic_word != TIFF_MAGIC {
      return Err(Cr2Error::format("bad tiff magic"));
    }

    Ok(Header {
      endian,
      tiff_magic_word,
      tiff_offset: endian.read_u32(&raw, 4),
      cr2_magic_word: endian.read_u16(&raw, 8),
      major_version: raw[10],
      minor_version: raw[11],
      raw_ifd_offset: endian.read_u32(&raw, 12),
      raw,
    })
  }

  /// Check for the "CR" signature. Plain TIFF files pass header
  /// validation but are not CR2 files.
  pub fn is_canon_cr2(&self) -> bool {
    self.raw[8..10] == CR2_MAGIC
  }
}
