// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use log::warn;

fn usize_param(name: &str) -> Option<usize> {
  match std::env::var(name).map(|val| val.parse::<usize>()) {
    Ok(Ok(value)) => Some(value),
    Ok(Err(_)) => {
      warn!("Invalid value for {}", name);
      None
    }
    Err(_) => None,
  }
}

pub(crate) fn cr2meta_max_chain() -> Option<usize> {
  usize_param("CR2META_MAX_CHAIN")
}

pub(crate) fn cr2meta_max_sub_depth() -> Option<usize> {
  usize_param("CR2META_MAX_SUB_DEPTH")
}

pub(crate) fn cr2meta_ignore_subdirs() -> bool {
  match std::env::var("CR2META_IGNORE_SUBDIRS").map(|val| val.parse::<u32>()) {
    Ok(Ok(value)) => value == 1,
    Ok(Err(_)) => {
      warn!("Invalid value for CR2META_IGNORE_SUBDIRS");
      false
    }
    Err(_) => false,
  }
}
