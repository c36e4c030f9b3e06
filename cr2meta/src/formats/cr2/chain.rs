// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use std::collections::HashSet;
use std::io::{Read, Seek};

use log::{debug, warn};

use crate::{Cr2Error, Result, bits::Endian, formats::tiff::IFD, params::Cr2Params};

/// Follow the next-IFD pointers starting at `root`.
///
/// Directories are returned in file order. A pointer back to an
/// already visited directory is an error, malformed files would
/// loop forever otherwise.
pub fn walk_chain<R: Read + Seek>(reader: &mut R, root: u32, endian: Endian, params: &Cr2Params) -> Result<Vec<IFD>> {
  let mut chain = Vec::new();
  let mut visited = HashSet::new();
  let mut next_ifd = root;

  while next_ifd != 0 {
    if let Some(max) = params.max_chain {
      if chain.len() >= max {
        warn!("IFD chain exceeds limit of {} directories, ignoring the rest", max);
        break;
      }
    }
    if !visited.insert(next_ifd) {
      debug!("IFD offset {} visited twice", next_ifd);
      return Err(Cr2Error::format("cyclic ifd chain"));
    }
    debug!("Parse IFD #{} at offset {}", chain.len(), next_ifd);
    let ifd = IFD::new(reader, next_ifd, endian, params)?;
    next_ifd = ifd.next_ifd;
    chain.push(ifd);
  }

  Ok(chain)
}
