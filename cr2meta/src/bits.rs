// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use serde::{Deserialize, Serialize};

/// Byte order marker for little endian files ("II")
pub const MARKER_LITTLE: u16 = 0x4949;
/// Byte order marker for big endian files ("MM")
pub const MARKER_BIG: u16 = 0x4d4d;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Endian {
  Big,
  Little,
}

impl Default for Endian {
  fn default() -> Self {
    Self::Little
  }
}

impl Endian {
  /// Classify a TIFF byte order marker.
  ///
  /// Both markers are palindromes, so the two bytes can be read
  /// in any byte order. Unknown markers yield `None`, there is
  /// no fallback to the native byte order.
  pub fn from_marker(marker: u16) -> Option<Self> {
    match marker {
      MARKER_LITTLE => Some(Self::Little),
      MARKER_BIG => Some(Self::Big),
      _ => None,
    }
  }

  #[inline]
  pub fn read_u16(&self, buf: &[u8], offset: usize) -> u16 {
    match *self {
      Self::Big => BigEndian::read_u16(&buf[offset..]),
      Self::Little => LittleEndian::read_u16(&buf[offset..]),
    }
  }

  #[inline]
  pub fn read_u32(&self, buf: &[u8], offset: usize) -> u32 {
    match *self {
      Self::Big => BigEndian::read_u32(&buf[offset..]),
      Self::Little => LittleEndian::read_u32(&buf[offset..]),
    }
  }
}
