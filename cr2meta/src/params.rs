// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use serde::{Deserialize, Serialize};

use crate::envparams;

/// Default limit for nested subdirectories (IFD0 -> Exif -> MakerNote is 2)
pub const DEFAULT_MAX_SUB_DEPTH: usize = 4;

/// Parameters for decoding the CR2 structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cr2Params {
  /// Stop walking the IFD chain after this many directories
  pub max_chain: Option<usize>,
  /// Maximum nesting level of subdirectories
  pub max_sub_depth: usize,
  /// Resolve Exif, GPS and MakerNote subdirectories
  pub follow_subdirs: bool,
}

impl Default for Cr2Params {
  fn default() -> Self {
    Self {
      max_chain: None,
      max_sub_depth: DEFAULT_MAX_SUB_DEPTH,
      follow_subdirs: true,
    }
  }
}

impl Cr2Params {
  /// Default parameters, overridden by `CR2META_MAX_CHAIN`,
  /// `CR2META_MAX_SUB_DEPTH` and `CR2META_IGNORE_SUBDIRS`.
  pub fn from_env() -> Self {
    let mut params = Self::default();
    if let Some(max) = envparams::cr2meta_max_chain() {
      params.max_chain = Some(max);
    }
    if let Some(depth) = envparams::cr2meta_max_sub_depth() {
      params.max_sub_depth = depth;
    }
    if envparams::cr2meta_ignore_subdirs() {
      params.follow_subdirs = false;
    }
    params
  }

  pub fn with_max_chain(self, max_chain: usize) -> Self {
    Self {
      max_chain: Some(max_chain),
      ..self
    }
  }

  pub fn with_max_sub_depth(self, max_sub_depth: usize) -> Self {
    Self { max_sub_depth, ..self }
  }

  pub fn without_subdirs(self) -> Self {
    Self {
      follow_subdirs: false,
      ..self
    }
  }
}
