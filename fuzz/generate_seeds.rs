#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

/// 24-bit BI_RGB file with `offset` bytes before the pixel rows.
fn bmp(width: i32, height: i32, offset: u32, fill: u8) -> Vec<u8> {
    let stride = (width.unsigned_abs() as usize * 3).div_ceil(4) * 4;
    let pixel_bytes = stride * height.unsigned_abs() as usize;
    let size = offset as usize + pixel_bytes;
    let mut out = vec![0u8; size];
    out[0] = b'B'; out[1] = b'M';
    out[2..6].copy_from_slice(&(size as u32).to_le_bytes()); // file size
    out[10..14].copy_from_slice(&offset.to_le_bytes()); // data offset
    out[14..18].copy_from_slice(&40u32.to_le_bytes()); // DIB header size
    out[18..22].copy_from_slice(&width.to_le_bytes());
    out[22..26].copy_from_slice(&height.to_le_bytes());
    out[26..28].copy_from_slice(&1u16.to_le_bytes()); // planes
    out[28..30].copy_from_slice(&24u16.to_le_bytes()); // bpp
    out[34..38].copy_from_slice(&(pixel_bytes as u32).to_le_bytes());
    for b in &mut out[offset as usize..] {
        *b = fill;
    }
    out
}

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    fs::write(format!("{dir}/bmp_1x1.bmp"), bmp(1, 1, 54, 0xff)).unwrap();
    fs::write(format!("{dir}/bmp_4x4.bmp"), bmp(4, 4, 54, 0x40)).unwrap();
    fs::write(format!("{dir}/bmp_5x3.bmp"), bmp(5, 3, 54, 0x80)).unwrap();
    fs::write(format!("{dir}/bmp_topdown_3x2.bmp"), bmp(3, -2, 54, 0x11)).unwrap();
    fs::write(format!("{dir}/bmp_gap_2x2.bmp"), bmp(2, 2, 70, 0x22)).unwrap();

    let mut os2 = bmp(2, 2, 54, 0);
    os2[..2].copy_from_slice(b"BA");
    fs::write(format!("{dir}/os2_array.bin"), os2).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/bm_short.bin"), b"BM\x00\x00").unwrap();
    let full = bmp(4, 4, 54, 0x33);
    fs::write(format!("{dir}/bmp_truncated_rows.bin"), &full[..80]).unwrap();

    println!("Generated seed corpus in {dir}/");
}
