// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

#![allow(dead_code)]

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use cr2meta::Endian;

pub(crate) fn init_test_logger() {
  let _ = env_logger::builder().is_test(true).try_init();
}

/// Raw 12-byte IFD entry
pub(crate) struct RawEntry {
  pub tag: u16,
  pub typ: u16,
  pub count: u32,
  /// Inline value or data offset, already in file byte order
  pub field: [u8; 4],
}

/// Writes synthetic CR2 files byte by byte
pub(crate) struct Cr2Builder {
  endian: Endian,
  buf: Vec<u8>,
}

impl Cr2Builder {
  pub fn new(endian: Endian) -> Self {
    Self { endian, buf: Vec::new() }
  }

  pub fn position(&self) -> u32 {
    self.buf.len() as u32
  }

  pub fn u16(&mut self, v: u16) -> &mut Self {
    match self.endian {
      Endian::Little => self.buf.write_u16::<LittleEndian>(v),
      Endian::Big => self.buf.write_u16::<BigEndian>(v),
    }
    .expect("write to vec");
    self
  }

  pub fn u32(&mut self, v: u32) -> &mut Self {
    match self.endian {
      Endian::Little => self.buf.write_u32::<LittleEndian>(v),
      Endian::Big => self.buf.write_u32::<BigEndian>(v),
    }
    .expect("write to vec");
    self
  }

  pub fn bytes(&mut self, data: &[u8]) -> &mut Self {
    self.buf.extend_from_slice(data);
    self
  }

  /// Zero-fill up to `offset`
  pub fn pad_to(&mut self, offset: u32) -> &mut Self {
    assert!(offset >= self.position(), "pad_to({}) behind position {}", offset, self.position());
    self.buf.resize(offset as usize, 0);
    self
  }

  /// 16 byte CR2 header, version 2.0
  pub fn header(&mut self, first_ifd: u32, raw_ifd: u32) -> &mut Self {
    self.bytes(match self.endian {
      Endian::Little => b"II",
      Endian::Big => b"MM",
    });
    self.u16(42).u32(first_ifd).bytes(b"CR").bytes(&[2, 0]).u32(raw_ifd)
  }

  pub fn ifd(&mut self, entries: &[RawEntry], next_ifd: u32) -> &mut Self {
    self.u16(entries.len() as u16);
    for entry in entries {
      self.u16(entry.tag).u16(entry.typ).u32(entry.count).bytes(&entry.field);
    }
    self.u32(next_ifd)
  }

  pub fn short(&self, tag: u16, v: u16) -> RawEntry {
    let mut field = [0; 4];
    match self.endian {
      Endian::Little => field[..2].copy_from_slice(&v.to_le_bytes()),
      Endian::Big => field[..2].copy_from_slice(&v.to_be_bytes()),
    }
    RawEntry { tag, typ: 3, count: 1, field }
  }

  pub fn long(&self, tag: u16, v: u32) -> RawEntry {
    let field = match self.endian {
      Endian::Little => v.to_le_bytes(),
      Endian::Big => v.to_be_bytes(),
    };
    RawEntry { tag, typ: 4, count: 1, field }
  }

  /// Entry whose value lives out-of-line at `offset`
  pub fn out_of_line(&self, tag: u16, typ: u16, count: u32, offset: u32) -> RawEntry {
    RawEntry {
      typ,
      count,
      ..self.long(tag, offset)
    }
  }

  /// Short ASCII value stored inline, at most 3 chars plus NUL
  pub fn ascii(&self, tag: u16, s: &str) -> RawEntry {
    let mut field = [0; 4];
    field[..s.len()].copy_from_slice(s.as_bytes());
    RawEntry {
      tag,
      typ: 2,
      count: s.len() as u32 + 1,
      field,
    }
  }

  pub fn build(&self) -> Vec<u8> {
    self.buf.clone()
  }
}
