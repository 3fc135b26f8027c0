use byteorder::{ByteOrder, LE};
use culpa::{throw, throws};
use thiserror::Error;

use super::layout::BlockShape;
use super::HEADER_SIZE;

/// Only two-dimensional blocks exist in this format.
const RANK: u8 = 2;

/// Errors when parsing a block header.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum ParseError {
    #[error("input shorter than the 9-byte block header; this is not a block stream")]
    Truncated,
    #[error("header declares rank {0}, but this codec only handles rank-2 blocks")]
    UnsupportedRank(u8),
}

/// Write the 9-byte header: rank, then both dimensions as little-endian u32.
///
/// The caller guarantees `out` holds at least [`HEADER_SIZE`] bytes.
pub(crate) fn write_header(shape: BlockShape, out: &mut [u8]) {
    out[0] = RANK;
    LE::write_u32(&mut out[1..5], shape.rows);
    LE::write_u32(&mut out[5..9], shape.cols);
}

/// Read the header back off the front of a compressed stream.
#[throws(ParseError)]
pub(crate) fn parse_header(input: &[u8]) -> BlockShape {
    if input.len() < HEADER_SIZE {
        throw!(ParseError::Truncated);
    }
    let rank = input[0];
    if rank != RANK {
        throw!(ParseError::UnsupportedRank(rank));
    }
    BlockShape {
        rows: LE::read_u32(&input[1..5]),
        cols: LE::read_u32(&input[5..9]),
    }
}
