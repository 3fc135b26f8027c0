#![no_main]
use libfuzzer_sys::fuzz_target;
use ndlz::{compress, compress_bound, decompress, BlockShape};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // first two bytes pick the shape, the rest is the block
    let rows = data[0] as u32 + 1;
    let cols = data[1] as u32 + 1;
    let shape = BlockShape::new(rows, cols);
    let block = &data[2..];
    if block.len() != shape.len() || block.len() < 16 {
        return;
    }

    let mut compressed = vec![0u8; compress_bound(shape)];
    let written = compress(block, shape, &mut compressed).expect("bound-sized buffer never overflows");

    let mut restored = vec![0u8; block.len()];
    decompress(&compressed[..written], &mut restored).expect("own output must decode");
    assert!(restored == block, "decompression result did not match the original block");
});
