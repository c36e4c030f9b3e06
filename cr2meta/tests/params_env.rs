// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

//! Environment overrides for `Cr2Params`.
//!
//! Kept as the only test of its own binary: changing the process
//! environment is unsound while other threads read it.

use cr2meta::Cr2Params;
use cr2meta::params::DEFAULT_MAX_SUB_DEPTH;

#[test]
fn params_from_env() {
  // SAFETY: this binary runs a single test, no other thread reads the environment
  unsafe {
    std::env::set_var("CR2META_MAX_CHAIN", "2");
    std::env::set_var("CR2META_MAX_SUB_DEPTH", "not-a-number");
    std::env::set_var("CR2META_IGNORE_SUBDIRS", "1");
  }
  let params = Cr2Params::from_env();
  assert_eq!(params.max_chain, Some(2));
  assert_eq!(params.max_sub_depth, DEFAULT_MAX_SUB_DEPTH);
  assert!(!params.follow_subdirs);

  // SAFETY: see above
  unsafe {
    std::env::remove_var("CR2META_MAX_CHAIN");
    std::env::remove_var("CR2META_MAX_SUB_DEPTH");
    std::env::remove_var("CR2META_IGNORE_SUBDIRS");
  }
  assert_eq!(Cr2Params::from_env(), Cr2Params::default());
}
