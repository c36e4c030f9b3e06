// SPDX-License-Identifier: MIT
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

pub mod entry;
pub mod ifd;
pub mod reader;
pub mod value;

pub use entry::Entry;
pub use ifd::IFD;
pub use reader::EndianReader;
pub use value::{Rational, SRational, TagType, Value};

pub const TIFF_MAGIC: u16 = 42;

/// Size of a single IFD entry record
pub(crate) const ENTRY_SIZE: u64 = 12;

/// Values up to this size are embedded in the entry record
pub(crate) const INLINE_SIZE: usize = 4;
