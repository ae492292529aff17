#![no_main]
use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use zenbmpfx::Bmp;

fuzz_target!(|data: &[u8]| {
    // If we can load it, writing and loading again must produce identical pixels
    let Ok(first) = Bmp::from_reader(Cursor::new(data)) else {
        return;
    };

    let mut written = Vec::new();
    first
        .write_to(&mut written)
        .expect("writing a loaded image failed");
    let Ok(second) = Bmp::from_reader(Cursor::new(written)) else {
        panic!("written data failed to load");
    };

    assert_eq!(first.image(), second.image(), "roundtrip pixel mismatch");
    assert_eq!(first.info_header().width, second.info_header().width);
    assert_eq!(first.info_header().height, second.info_header().height);
});
