// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::io::{Read, Seek};

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
  ENTRY_SIZE, INLINE_SIZE, TagType, Value,
  reader::{EndianReader, ReadByteOrder},
};
use crate::{Cr2Error, Result, tags::TagKey};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub tag: u16,
  /// Raw type code as found in the file
  pub typ: u16,
  pub count: u32,
  pub value: Value,
  /// Absolute file offset of the value if it was stored out-of-line,
  /// `None` for values embedded in the entry record.
  pub offset: Option<u32>,
}

impl std::ops::Deref for Entry {
  type Target = Value;

  fn deref(&self) -> &Self::Target {
    &self.value
  }
}

impl Entry {
  /// Decode one 12-byte entry record at the current reader position.
  ///
  /// Out-of-line values are read eagerly. On success the reader is
  /// positioned at the start of the next entry record.
  pub fn parse<R: Read + Seek>(reader: &mut EndianReader<R>) -> Result<Entry> {
    let pos = reader.position()?;

    let tag = reader.read_u16()?;
    let typ = reader.read_u16()?;
    let count = reader.read_u32()?;
    let mut field = [0; INLINE_SIZE];
    reader.read_u8_into(&mut field)?;

    debug!("Tag: {:#x}, Typ: {:#x}, count: {}", tag, typ, count);

    let bytesize = count as u64 * TagType::size_of_code(typ) as u64;
    let (value, offset) = if bytesize <= INLINE_SIZE as u64 {
      (Value::decode(typ, count as usize, reader.endian(), &field)?, None)
    } else {
      let offset = reader.endian().read_u32(&field, 0);
      let truncated = |got: u64| Cr2Error::TruncatedData {
        tag,
        offset,
        expected: bytesize,
        got,
      };
      let size = usize::try_from(bytesize).map_err(|_| truncated(0))?;
      let data = reader.read_at_most(offset as u64, size)?;
      if data.len() < size {
        return Err(truncated(data.len() as u64));
      }
      reader.goto(pos + ENTRY_SIZE)?;
      (Value::decode(typ, count as usize, reader.endian(), &data)?, Some(offset))
    };

    Ok(Entry {
      tag,
      typ,
      count,
      value,
      offset,
    })
  }

  pub fn key(&self) -> TagKey {
    TagKey::from(self.tag)
  }

  pub fn value_type(&self) -> u16 {
    self.typ
  }

  /// Size of the value data in bytes
  pub fn byte_size(&self) -> u64 {
    self.count as u64 * TagType::size_of_code(self.typ) as u64
  }

  pub fn is_inline(&self) -> bool {
    self.offset.is_none()
  }

  pub fn type_name(&self) -> String {
    self.value.value_type_name()
  }
}
