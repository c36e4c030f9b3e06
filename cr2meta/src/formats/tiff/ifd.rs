// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use super::{
  ENTRY_SIZE, Entry, Value,
  reader::{EndianReader, ReadByteOrder},
};
use crate::{
  Cr2Error, Result,
  bits::Endian,
  params::Cr2Params,
  tags::{Cr2Tag, TagKey, TiffTag},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::{
  collections::{BTreeMap, HashSet},
  io::{Read, Seek},
};

/// A decoded image file directory.
///
/// `entries` holds the directory's own entries in file order, repeated
/// tags included. Resolved subdirectories (Exif, GPS, MakerNote) are kept
/// in `sub`, keyed by their pointer tag. Lookups and `fields()` see the
/// merged view: own entries first, then subdirectory entries whose tag
/// is not already present.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IFD {
  pub offset: u32,
  pub next_ifd: u32,
  pub endian: Endian,
  pub entries: Vec<Entry>,
  pub sub: BTreeMap<u16, IFD>,
}

impl IFD {
  /// Decode the IFD at absolute `offset`, resolving subdirectories
  /// as configured in `params`.
  pub fn new<R: Read + Seek>(reader: &mut R, offset: u32, endian: Endian, params: &Cr2Params) -> Result<IFD> {
    let mut visited = HashSet::from([offset]);
    Self::new_nested(reader, offset, endian, params, 0, &mut visited)
  }

  fn new_nested<R: Read + Seek>(
    reader: &mut R,
    offset: u32,
    endian: Endian,
    params: &Cr2Params,
    depth: usize,
    visited: &mut HashSet<u32>,
  ) -> Result<IFD> {
    let mut reader = EndianReader::new(reader, endian);
    let len = reader.stream_len()?;
    if offset as u64 + 2 > len {
      return Err(Cr2Error::format("truncated ifd"));
    }
    reader.goto(offset as u64)?;
    let entry_count = reader.read_u16()?;
    let entries_end = offset as u64 + 2 + entry_count as u64 * ENTRY_SIZE;
    if entries_end > len {
      debug!("IFD at {} declares {} entries, but source has only {} bytes", offset, entry_count, len);
      return Err(Cr2Error::format("truncated ifd"));
    }

    debug!("Parse {} entries of IFD at offset {}", entry_count, offset);
    let mut entries = Vec::with_capacity(entry_count as usize);
    let mut sub_ifd_offsets = Vec::new();
    for _ in 0..entry_count {
      let entry = Entry::parse(&mut reader)?;
      if params.follow_subdirs && Cr2Tag::n(entry.tag).is_some_and(|tag| tag.is_sub_directory()) {
        match sub_directory_offset(&entry) {
          Some(sub_offset) => sub_ifd_offsets.push((entry.tag, sub_offset)),
          None => warn!(
            "Found subdirectory tag 0x{:X}, but type mismatch: {}. Ignoring it",
            entry.tag,
            entry.type_name()
          ),
        }
      }
      entries.push(entry);
    }

    // Some writers skip the next ifd pointer, EOF here ends the chain.
    let next_ifd = if entries_end + 4 <= len {
      reader.read_u32()?
    } else {
      debug!("IFD at {} has no next IFD pointer, assuming end of chain", offset);
      0
    };

    let reader = reader.into_inner();
    let mut sub = BTreeMap::new();
    for (tag, sub_offset) in sub_ifd_offsets {
      // Each directory of the tree is decoded once
      if !visited.insert(sub_offset) {
        debug!("Subdirectory 0x{:X} points to already decoded IFD at {}", tag, sub_offset);
        return Err(Cr2Error::format("cyclic subdirectory"));
      }
      if depth >= params.max_sub_depth {
        return Err(Cr2Error::format("subdirectory nesting too deep"));
      }
      debug!("Resolve subdirectory 0x{:X} at offset {}", tag, sub_offset);
      let ifd = Self::new_nested(reader, sub_offset, endian, params, depth + 1, visited)?;
      sub.insert(tag, ifd);
    }

    Ok(IFD {
      offset,
      next_ifd,
      endian,
      entries,
      sub,
    })
  }

  /// Number of entries stored in this directory itself
  pub fn entry_count(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn next_ifd(&self) -> u32 {
    self.next_ifd
  }

  pub fn entries(&self) -> &[Entry] {
    &self.entries
  }

  /// Resolved subdirectories, ordered like their pointer entries
  fn subs_in_file_order(&self) -> impl Iterator<Item = &IFD> {
    let mut seen = HashSet::new();
    self
      .entries
      .iter()
      .filter(move |entry| seen.insert(entry.tag))
      .filter_map(move |entry| self.sub.get(&entry.tag))
  }

  fn merged_entries<'a>(&'a self, out: &mut Vec<&'a Entry>, seen: &mut HashSet<u16>) {
    out.extend(self.entries.iter());
    seen.extend(self.entries.iter().map(|entry| entry.tag));
    for ifd in self.subs_in_file_order() {
      let mut nested = Vec::new();
      ifd.merged_entries(&mut nested, &mut HashSet::new());
      for entry in nested {
        if seen.insert(entry.tag) {
          out.push(entry);
        } else {
          debug!("Subdirectory entry 0x{:X} collides with parent entry, keeping parent", entry.tag);
        }
      }
    }
  }

  /// Entries with their resolved keys: own entries in file order,
  /// followed by the merged subdirectory entries.
  pub fn fields(&self) -> impl Iterator<Item = (TagKey, &Entry)> {
    let mut entries = Vec::new();
    self.merged_entries(&mut entries, &mut HashSet::new());
    entries.into_iter().map(|entry| (entry.key(), entry))
  }

  /// Entry for `tag`. Own entries take precedence over subdirectory
  /// entries, for repeated tags the last one wins.
  pub fn get_entry<T: TiffTag>(&self, tag: T) -> Option<&Entry> {
    let tag: u16 = tag.into();
    self
      .entries
      .iter()
      .rev()
      .find(|entry| entry.tag == tag)
      .or_else(|| self.subs_in_file_order().find_map(|ifd| ifd.get_entry(tag)))
  }

  pub fn get_key(&self, key: TagKey) -> Option<&Entry> {
    self.get_entry(key.id())
  }

  pub fn has_entry<T: TiffTag>(&self, tag: T) -> bool {
    self.get_entry(tag).is_some()
  }

  pub fn sub_ifds(&self) -> &BTreeMap<u16, IFD> {
    &self.sub
  }

  pub fn get_sub_ifd<T: TiffTag>(&self, tag: T) -> Option<&IFD> {
    let tag: u16 = tag.into();
    self.sub.get(&tag)
  }

  /// Render one line per field, values are shortened to `limit` items
  pub fn dump(&self, limit: usize) -> Vec<String> {
    self
      .fields()
      .map(|(key, entry)| {
        format!(
          "{} (0x{:04x}) {}[{}]: {}",
          key,
          entry.tag,
          entry.type_name(),
          entry.count,
          entry.visual_rep(limit)
        )
      })
      .collect()
  }
}

/// Offset of the nested IFD a subdirectory entry points to.
///
/// Exif and GPS pointers are LONG (or SHORT) values, a MakerNote is an
/// UNDEFINED blob whose data offset is the start of the nested IFD.
fn sub_directory_offset(entry: &Entry) -> Option<u32> {
  match &entry.value {
    Value::Long(_) | Value::Short(_) => entry.get_u32(0),
    Value::Undefined(_) | Value::Byte(_) | Value::Unknown(..) => entry.offset,
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Cursor;

  #[test]
  fn empty_directory() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut cursor = Cursor::new(vec![0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    let ifd = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default())?;
    assert!(ifd.is_empty());
    assert_eq!(ifd.next_ifd(), 0);
    assert!(ifd.dump(4).is_empty());
    Ok(())
  }

  #[test]
  fn entries_and_next_pointer() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let buf = vec![
      0x00, 0x02, // 2 entries, big endian
      0x01, 0x00, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01, 0x0f, 0xa0, 0x00, 0x00, // image_width = 4000
      0xfe, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xaa, 0xbb, 0x00, 0x00, // unknown tag, 2 bytes
      0x00, 0x00, 0x01, 0x00, // next ifd
    ];
    let mut cursor = Cursor::new(buf);
    let ifd = IFD::new(&mut cursor, 0, Endian::Big, &Cr2Params::default())?;
    assert_eq!(ifd.entry_count(), 2);
    assert_eq!(ifd.next_ifd(), 0x100);
    assert_eq!(ifd.get_entry(Cr2Tag::ImageWidth).and_then(|e| e.get_u32(0)), Some(4000));
    let keys: Vec<TagKey> = ifd.fields().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![TagKey::Known(Cr2Tag::ImageWidth), TagKey::Numeric(0xfe01)]);
    assert_eq!(ifd.get_key(TagKey::Numeric(0xfe01)).map(|e| &e.value), Some(&Value::Byte(vec![0xaa, 0xbb])));
    assert_eq!(ifd.dump(8)[0], "image_width (0x0100) SHORT[1]: 4000");
    Ok(())
  }

  #[test]
  fn truncated_entry_list() {
    // Declares 3 entries but holds only one
    let buf = vec![0x03, 0x00, 0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    let mut cursor = Cursor::new(buf);
    let result = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default());
    assert!(matches!(result, Err(Cr2Error::Format(msg)) if msg == "truncated ifd"));
  }

  #[test]
  fn offset_past_eof() {
    let mut cursor = Cursor::new(vec![0x00, 0x00]);
    let result = IFD::new(&mut cursor, 100, Endian::Little, &Cr2Params::default());
    assert!(matches!(result, Err(Cr2Error::Format(msg)) if msg == "truncated ifd"));
  }

  #[test]
  fn missing_next_pointer() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let buf = vec![0x01, 0x00, 0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00];
    let mut cursor = Cursor::new(buf);
    let ifd = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default())?;
    assert_eq!(ifd.entry_count(), 1);
    assert_eq!(ifd.next_ifd(), 0);
    Ok(())
  }

  fn exif_layout() -> Vec<u8> {
    vec![
      // IFD0 at 0: orientation + exif pointer to 30
      0x02, 0x00, //
      0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, //
      0x69, 0x87, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1e, 0x00, 0x00, 0x00, //
      0x00, 0x00, 0x00, 0x00, //
      // Exif IFD at 30: orientation (collides) + iso
      0x02, 0x00, //
      0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00, //
      0x27, 0x88, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x90, 0x01, 0x00, 0x00, //
      0x00, 0x00, 0x00, 0x00,
    ]
  }

  #[test]
  fn merge_exif_subdirectory() -> std::result::Result<(), Box<dyn std::error::Error>> {
    crate::init_test_logger();
    let mut cursor = Cursor::new(exif_layout());
    let ifd = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default())?;
    assert_eq!(ifd.entry_count(), 2);
    let tags: Vec<u16> = ifd.fields().map(|(_, e)| e.tag).collect();
    assert_eq!(tags, vec![0x0112, 0x8769, 0x8827]);
    assert_eq!(ifd.get_entry(Cr2Tag::IsoSpeedRatings).and_then(|e| e.get_u32(0)), Some(400));
    // Parent entry wins on collision
    assert_eq!(ifd.get_entry(Cr2Tag::Orientation).and_then(|e| e.get_u32(0)), Some(1));
    let exif = ifd.get_sub_ifd(Cr2Tag::Exif).ok_or("no exif")?;
    assert_eq!(exif.offset, 30);
    assert_eq!(exif.get_entry(Cr2Tag::Orientation).and_then(|e| e.get_u32(0)), Some(8));
    Ok(())
  }

  #[test]
  fn subdirectories_disabled() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let mut cursor = Cursor::new(exif_layout());
    let ifd = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default().without_subdirs())?;
    assert_eq!(ifd.entry_count(), 2);
    assert!(ifd.sub_ifds().is_empty());
    Ok(())
  }

  #[test]
  fn self_referencing_subdirectory() {
    crate::init_test_logger();
    let buf = vec![
      0x01, 0x00, //
      0x69, 0x87, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // exif -> 0
      0x00, 0x00, 0x00, 0x00,
    ];
    let mut cursor = Cursor::new(buf);
    let result = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default());
    assert!(matches!(result, Err(Cr2Error::Format(msg)) if msg == "cyclic subdirectory"));
  }

  #[test]
  fn shared_subdirectory_offset() {
    // Exif and GPS pointers both point to the IFD at 30
    let mut buf = exif_layout();
    buf[2..14].copy_from_slice(&[0x25, 0x88, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0x1e, 0x00, 0x00, 0x00]);
    let mut cursor = Cursor::new(buf);
    let result = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default());
    assert!(matches!(result, Err(Cr2Error::Format(msg)) if msg == "cyclic subdirectory"));
  }

  #[test]
  fn keep_file_order_and_repeated_tags() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let buf = vec![
      0x03, 0x00, //
      0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, // orientation = 1
      0x00, 0x01, 0x04, 0x00, 0x01, 0x00, 0x00, 0x00, 0xa0, 0x0f, 0x00, 0x00, // image_width = 4000
      0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, 0x06, 0x00, 0x00, 0x00, // orientation = 6
      0x00, 0x00, 0x00, 0x00,
    ];
    let mut cursor = Cursor::new(buf);
    let ifd = IFD::new(&mut cursor, 0, Endian::Little, &Cr2Params::default())?;
    assert_eq!(ifd.entry_count(), 3);
    let tags: Vec<u16> = ifd.fields().map(|(_, e)| e.tag).collect();
    assert_eq!(tags, vec![0x0112, 0x0100, 0x0112]);
    assert_eq!(ifd.entries().iter().map(|e| e.get_u16(0)).collect::<Vec<_>>(), vec![Some(1), Some(4000), Some(6)]);
    assert_eq!(ifd.get_entry(Cr2Tag::Orientation).and_then(|e| e.get_u16(0)), Some(6));
    let lines = ifd.dump(4);
    assert_eq!(lines[0], "orientation (0x0112) SHORT[1]: 1");
    assert_eq!(lines[1], "image_width (0x0100) LONG[1]: 4000");
    assert_eq!(lines[2], "orientation (0x0112) SHORT[1]: 6");
    Ok(())
  }
}
