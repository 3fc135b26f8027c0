//! Round-trip coverage over many shapes and data textures.
//!
//! Everything here is seeded, so a failure reproduces exactly.

use ndlz::{compress, compress_bound, decompress, BlockShape, CompressError, MatchTables};
use rand::prelude::*;

fn roundtrip(block: &[u8], rows: u32, cols: u32) {
    let shape = BlockShape::new(rows, cols);
    let mut compressed = vec![0u8; compress_bound(shape)];
    let written = compress(block, shape, &mut compressed).unwrap();
    assert!(written <= compress_bound(shape));

    let mut restored = vec![0u8; block.len()];
    decompress(&compressed[..written], &mut restored).unwrap();
    assert_eq!(restored, block, "round-trip failed for a {}x{} block", rows, cols);
}

#[test]
fn random_noise_blocks() {
    // incompressible data: everything ends up literal, which is the
    // worst case for the size bound
    let mut rng = StdRng::seed_from_u64(0x4e444c5a);
    for _ in 0..50 {
        let rows = rng.gen_range(1, 65);
        let cols = rng.gen_range(1, 65);
        let shape = BlockShape::new(rows, cols);
        if shape.len() < 16 {
            continue;
        }
        let mut block = vec![0u8; shape.len()];
        rng.fill(&mut block[..]);
        roundtrip(&block, rows, cols);
    }
}

#[test]
fn random_tiled_blocks() {
    // a small tile stamped across the block: dense cell matches, plus
    // padded edges whenever the shape is not a multiple of four
    let mut rng = StdRng::seed_from_u64(0x7461626c);
    for _ in 0..50 {
        let rows = rng.gen_range(4, 100);
        let cols = rng.gen_range(4, 100);
        let mut tile = [0u8; 16];
        rng.fill(&mut tile[..]);

        let block: Vec<u8> = (0..rows as usize * cols as usize)
            .map(|i| {
                let (r, c) = (i / cols as usize, i % cols as usize);
                tile[(r % 4) * 4 + c % 4]
            })
            .collect();
        roundtrip(&block, rows, cols);
    }
}

#[test]
fn random_sparse_blocks() {
    // mostly one value with scattered outliers: all-equal cells with the
    // occasional literal or partial match
    let mut rng = StdRng::seed_from_u64(0x73707273);
    for _ in 0..50 {
        let rows = rng.gen_range(4, 80);
        let cols = rng.gen_range(4, 80);
        let mut block = vec![0x5Au8; rows as usize * cols as usize];
        for _ in 0..block.len() / 19 {
            let at = rng.gen_range(0, block.len());
            block[at] = rng.gen();
        }
        roundtrip(&block, rows, cols);
    }
}

#[test]
fn random_row_shifted_blocks() {
    // rows repeat with a vertical period that is coprime to the cell
    // height, exercising the triple and pair paths
    let mut rng = StdRng::seed_from_u64(0x726f7773);
    for _ in 0..30 {
        let rows = rng.gen_range(8, 64);
        let cols = rng.gen_range(8, 64);
        let mut row_pattern = vec![0u8; cols as usize];
        rng.fill(&mut row_pattern[..]);

        let block: Vec<u8> = (0..rows as usize)
            .flat_map(|r| {
                let rotation = (r * 3) % row_pattern.len();
                let mut row = row_pattern.clone();
                row.rotate_left(rotation);
                row
            })
            .collect();
        roundtrip(&block, rows, cols);
    }
}

#[test]
fn shared_tables_across_many_blocks() {
    // reusing one table allocation must not let state leak between blocks
    let mut rng = StdRng::seed_from_u64(0x61726e61);
    let shape = BlockShape::new(24, 24);
    let mut tables = MatchTables::new();
    for _ in 0..20 {
        let mut block = vec![0u8; shape.len()];
        rng.fill(&mut block[..]);

        let mut with_fresh = vec![0u8; compress_bound(shape)];
        let mut with_reused = vec![0u8; compress_bound(shape)];
        let a = compress(&block, shape, &mut with_fresh).unwrap();
        let b =
            ndlz::compress_with_tables(&block, shape, &mut tables, &mut with_reused).unwrap();
        assert_eq!(with_fresh[..a], with_reused[..b]);
    }
}

#[test]
fn corrupted_streams_never_panic() {
    // single-byte corruption of a valid stream must decode to an error or
    // to some block, never to a crash or an out-of-bounds write
    let mut rng = StdRng::seed_from_u64(0x66757a7a);
    let shape = BlockShape::new(16, 16);
    let block: Vec<u8> = (0..shape.len()).map(|i| (i % 64) as u8).collect();
    let mut stream = vec![0u8; compress_bound(shape)];
    let written = compress(&block, shape, &mut stream).unwrap();
    stream.truncate(written);

    for _ in 0..2000 {
        let mut corrupted = stream.clone();
        let at = rng.gen_range(0, corrupted.len());
        corrupted[at] ^= 1 << rng.gen_range(0, 8);

        let mut output = vec![0u8; shape.len()];
        let _ = decompress(&corrupted, &mut output);
    }
}

#[test]
fn truncated_streams_never_panic() {
    let shape = BlockShape::new(12, 12);
    let block: Vec<u8> = (0..shape.len()).map(|i| (i % 5) as u8).collect();
    let mut stream = vec![0u8; compress_bound(shape)];
    let written = compress(&block, shape, &mut stream).unwrap();
    stream.truncate(written);

    for len in 0..stream.len() {
        let mut output = vec![0u8; shape.len()];
        assert!(decompress(&stream[..len], &mut output).is_err());
    }
}

#[test]
fn undersized_buffers_are_rejected_up_front() {
    let shape = BlockShape::new(8, 8);
    let block = vec![0u8; shape.len()];
    let mut tiny = vec![0u8; 10];
    assert_eq!(
        compress(&block, shape, &mut tiny).unwrap_err(),
        CompressError::OutputTooSmall(10, 9 + 4 + 16)
    );
}
