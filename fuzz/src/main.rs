use afl::fuzz;
use cr2meta::{Cr2File, Cr2Params, ImageKind};
use std::io::Cursor;

fn main() {
  fuzz!(|data: &[u8]| {
    let mut cursor = Cursor::new(data);
    if let Ok(cr2) = Cr2File::new(&mut cursor, &Cr2Params::default()) {
      let _ = cr2.dump(16);
      for kind in [ImageKind::Preview, ImageKind::Thumbnail, ImageKind::Medium, ImageKind::Raw] {
        let _ = cr2.extract_image(&mut cursor, kind);
      }
    }
  });
}
