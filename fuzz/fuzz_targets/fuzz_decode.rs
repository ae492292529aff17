#![no_main]
use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use zenbmpfx::{Limits, bmp};

fuzz_target!(|data: &[u8]| {
    // Header parsing alone must never panic
    let _ = bmp::probe_reader(&mut Cursor::new(data), &Limits::default());

    // Neither may a full load under tight limits
    let limits = Limits {
        max_pixels: Some(1 << 20),
        ..Default::default()
    };
    let _ = zenbmpfx::Bmp::from_reader_with(
        Cursor::new(data),
        &limits,
        bmp::Permissiveness::Standard,
        enough::Unstoppable,
    );
});
