// SPDX-License-Identifier: LGPL-2.1
// Copyright 2021 Daniel Vogelbacher <daniel@chaospixel.com>

use criterion::{Criterion, criterion_group, criterion_main};
use cr2meta::{Cr2File, Cr2Params, ImageKind};
use std::hint::black_box;
use std::io::Cursor;

/// CR2 layout with a chain of `ifds` directories, each holding
/// `entries` SHORT entries plus a 4 KiB strip.
fn generate_file(ifds: u32, entries: u16) -> Vec<u8> {
  const STRIP: u32 = 4096;
  let ifd_size = 2 + entries as u32 * 12 + 12 * 2 + 4;
  let mut buf = b"II\x2a\x00\x10\x00\x00\x00CR\x02\x00\x00\x00\x00\x00".to_vec();
  let strips_start = 16 + ifds * ifd_size;
  for i in 0..ifds {
    let next = if i + 1 < ifds { 16 + (i + 1) * ifd_size } else { 0 };
    buf.extend_from_slice(&(entries + 2).to_le_bytes());
    for tag in 0..entries {
      buf.extend_from_slice(&(0xc000 + tag).to_le_bytes());
      buf.extend_from_slice(&[0x03, 0x00, 0x01, 0x00, 0x00, 0x00]);
      buf.extend_from_slice(&(tag as u32).to_le_bytes());
    }
    for (tag, value) in [(0x0111_u16, strips_start + i * STRIP), (0x0117, STRIP)] {
      buf.extend_from_slice(&tag.to_le_bytes());
      buf.extend_from_slice(&[0x04, 0x00, 0x01, 0x00, 0x00, 0x00]);
      buf.extend_from_slice(&value.to_le_bytes());
    }
    buf.extend_from_slice(&next.to_le_bytes());
  }
  buf.resize((strips_start + ifds * STRIP) as usize, 0xaa);
  buf
}

fn criterion_benchmark(c: &mut Criterion) {
  let mut group = c.benchmark_group("cr2-parse");
  group.significance_level(0.1).sample_size(50);

  let file = generate_file(4, 200);

  group.bench_with_input("decode_4x200", &file, |b, data| {
    b.iter(|| Cr2File::new_from_buffer(black_box(data), &Cr2Params::default()))
  });

  let cr2 = Cr2File::new_from_buffer(&file, &Cr2Params::default()).expect("valid benchmark file");
  group.bench_with_input("extract_raw", &file, |b, data| {
    let mut cursor = Cursor::new(data);
    b.iter(|| cr2.extract_image(black_box(&mut cursor), ImageKind::Raw))
  });

  group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
