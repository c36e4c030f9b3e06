// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Canon CR2 container
//!
//! A CR2 file is a TIFF file with a 16 byte header. By convention the
//! IFD chain holds four directories:
//!
//! * IFD #0: full size JPEG preview and most of the metadata
//! * IFD #1: small thumbnail JPEG
//! * IFD #2: medium size uncompressed RGB preview
//! * IFD #3: lossless JPEG compressed raw sensor data
//!
//! Partial files with less directories are accepted, missing slots
//! are reported on extraction.

use std::io::{Cursor, Read, Seek, SeekFrom};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
  Cr2Error, Result,
  formats::tiff::{Entry, IFD},
  params::Cr2Params,
  tags::{Cr2Tag, TiffTag},
};

pub mod chain;
pub mod header;

pub use header::Header;

/// The embedded image streams of a CR2 file
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
  /// Full size JPEG preview
  Preview,
  /// Small JPEG thumbnail
  Thumbnail,
  /// Medium size uncompressed preview
  Medium,
  /// Compressed raw sensor data
  Raw,
}

impl ImageKind {
  /// Index of the IFD describing this stream
  pub fn ifd_index(&self) -> usize {
    match self {
      Self::Preview => 0,
      Self::Thumbnail => 1,
      Self::Medium => 2,
      Self::Raw => 3,
    }
  }

  /// Tags for offset and length of this stream
  pub fn fields(&self) -> (Cr2Tag, Cr2Tag) {
    match self {
      Self::Thumbnail => (Cr2Tag::ThumbnailOffset, Cr2Tag::ThumbnailLength),
      Self::Preview | Self::Medium | Self::Raw => (Cr2Tag::StripOffset, Cr2Tag::StripByteCounts),
    }
  }
}

/// Decoded structure of a CR2 file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cr2File {
  header: Header,
  chain: Vec<IFD>,
}

impl Cr2File {
  /// Decode header and IFD chain.
  ///
  /// The header is read at the current reader position, IFD offsets
  /// are absolute. The reader position is restored afterwards, on
  /// success and on error.
  pub fn new<R: Read + Seek>(reader: &mut R, params: &Cr2Params) -> Result<Cr2File> {
    let pos = reader.stream_position()?;
    let result = Self::parse(reader, params);
    let restored = reader.seek(SeekFrom::Start(pos));
    let file = result?;
    restored?;
    Ok(file)
  }

  /// Decode from an in-memory copy of the file
  pub fn new_from_buffer(buf: &[u8], params: &Cr2Params) -> Result<Cr2File> {
    Self::new(&mut Cursor::new(buf), params)
  }

  fn parse<R: Read + Seek>(reader: &mut R, params: &Cr2Params) -> Result<Cr2File> {
    let header = Header::parse(reader)?;
    if !header.is_canon_cr2() {
      warn!("CR2 signature not found, decoding as plain TIFF");
    }
    debug!(
      "CR2 header: {:?}, version {}.{}, first IFD at {}",
      header.endian, header.major_version, header.minor_version, header.tiff_offset
    );
    let chain = chain::walk_chain(reader, header.tiff_offset, header.endian, params)?;
    debug!("Found {} IFDs", chain.len());
    Ok(Cr2File { header, chain })
  }

  pub fn header(&self) -> &Header {
    &self.header
  }

  pub fn directories(&self) -> &[IFD] {
    &self.chain
  }

  pub fn directory(&self, index: usize) -> Option<&IFD> {
    self.chain.get(index)
  }

  /// First entry for `tag` along the IFD chain
  pub fn get_entry<T: TiffTag>(&self, tag: T) -> Option<&Entry> {
    self.chain.iter().find_map(|ifd| ifd.get_entry(tag))
  }

  pub fn make(&self) -> Option<&str> {
    self.get_entry(Cr2Tag::Make).and_then(|entry| entry.as_string()).map(str::trim_end)
  }

  pub fn model(&self) -> Option<&str> {
    self.get_entry(Cr2Tag::Model).and_then(|entry| entry.as_string()).map(str::trim_end)
  }

  pub fn datetime(&self) -> Option<&str> {
    self.get_entry(Cr2Tag::DateTime).and_then(|entry| entry.as_string())
  }

  pub fn orientation(&self) -> Option<u16> {
    self.get_entry(Cr2Tag::Orientation).and_then(|entry| entry.get_u16(0))
  }

  /// Image dimensions as declared in IFD `index`
  pub fn image_size(&self, index: usize) -> Option<(u32, u32)> {
    let ifd = self.directory(index)?;
    let width = ifd.get_entry(Cr2Tag::ImageWidth)?.get_u32(0)?;
    let height = ifd.get_entry(Cr2Tag::ImageLength)?.get_u32(0)?;
    Some((width, height))
  }

  /// Read the byte range described by an offset and a length field of IFD `index`.
  ///
  /// Returns `None` if one of the fields is missing. The reader position
  /// is the same before and after the call, also if reading fails.
  pub fn extract<R, O, L>(&self, reader: &mut R, index: usize, offset_tag: O, length_tag: L) -> Result<Option<Vec<u8>>>
  where
    R: Read + Seek,
    O: TiffTag,
    L: TiffTag,
  {
    let (offset_id, length_id): (u16, u16) = (offset_tag.into(), length_tag.into());
    let ifd = self.chain.get(index).ok_or(Cr2Error::IndexOutOfRange {
      index,
      count: self.chain.len(),
    })?;
    let (Some(offset), Some(length)) = (
      ifd.get_entry(offset_id).and_then(|entry| entry.get_u32(0)),
      ifd.get_entry(length_id).and_then(|entry| entry.get_u32(0)),
    ) else {
      debug!("IFD #{} has no data for tags 0x{:X}/0x{:X}", index, offset_id, length_id);
      return Ok(None);
    };

    let pos = reader.stream_position()?;
    let data = read_range(reader, offset, length, offset_id);
    let restored = reader.seek(SeekFrom::Start(pos));
    let data = data?;
    restored?;
    Ok(Some(data))
  }

  pub fn extract_image<R: Read + Seek>(&self, reader: &mut R, kind: ImageKind) -> Result<Option<Vec<u8>>> {
    let (offset_tag, length_tag) = kind.fields();
    self.extract(reader, kind.ifd_index(), offset_tag, length_tag)
  }

  pub fn preview_image<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
    self.extract_image(reader, ImageKind::Preview)
  }

  pub fn thumbnail_image<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
    self.extract_image(reader, ImageKind::Thumbnail)
  }

  pub fn medium_image<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
    self.extract_image(reader, ImageKind::Medium)
  }

  pub fn raw_data<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
    self.extract_image(reader, ImageKind::Raw)
  }

  /// Render all directories, see [`IFD::dump`]
  pub fn dump(&self, limit: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, ifd) in self.chain.iter().enumerate() {
      lines.push(format!("IFD #{} at offset {}, {} entries", i, ifd.offset, ifd.entry_count()));
      lines.extend(ifd.dump(limit).into_iter().map(|line| format!("  {}", line)));
    }
    lines
  }
}

fn read_range<R: Read + Seek>(reader: &mut R, offset: u32, length: u32, tag: u16) -> Result<Vec<u8>> {
  reader.seek(SeekFrom::Start(offset as u64))?;
  let mut buf = Vec::with_capacity((length as usize).min(1 << 24));
  reader.take(length as u64).read_to_end(&mut buf)?;
  if buf.len() < length as usize {
    return Err(Cr2Error::TruncatedData {
      tag,
      offset,
      expected: length as u64,
      got: buf.len() as u64,
    });
  }
  Ok(buf)
}
