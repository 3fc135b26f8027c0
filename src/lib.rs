#![forbid(unsafe_code)]

//! NDLZ: lossless compression for two-dimensional byte arrays.
//!
//! Most LZ-family codecs look for repetition along the one axis their input
//! has: earlier bytes in a linear stream. NDLZ instead assumes its input is
//! a 2-D array whose redundancy is *spatial* — a sample tends to resemble
//! its neighbours above and beside it, which row-major memory order tears
//! apart. The codec tiles the block into 4×4 cells and matches whole cells,
//! row triples and row pairs against everything it has emitted so far,
//! falling back to literals where nothing repeats.
//!
//! One call compresses exactly one block; there is no streaming, no
//! cross-block state and no checksum. Wrap the stream in whatever container
//! you already have.
//!
//! ```
//! use ndlz::{compress, compress_bound, decompress, BlockShape};
//!
//! let shape = BlockShape::new(8, 8);
//! let block = vec![42u8; shape.len()];
//!
//! let mut compressed = vec![0u8; compress_bound(shape)];
//! let written = compress(&block, shape, &mut compressed).unwrap();
//!
//! let mut restored = vec![0u8; shape.len()];
//! decompress(&compressed[..written], &mut restored).unwrap();
//! assert_eq!(restored, block);
//! ```

pub mod block;

pub use block::{
    compress, compress_bound, compress_with_tables, decompress, BlockShape, CompressError,
    DecompressError, MatchTables,
};
