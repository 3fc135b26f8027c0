use byteorder::{ByteOrder, LE};
use culpa::{throw, throws};
use log::debug;
use thiserror::Error;

use super::header::{self, parse_header};
use super::token::{missing_row, remaining_rows, Token};
use super::{CELL_BYTES, CELL_DIM, HEADER_SIZE, ROW_BYTES};

/// Errors when decoding a block stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum DecompressError {
    #[error("block stream ended mid-record; either the input was truncated or it was never a block stream")]
    UnexpectedEnd,
    #[error("invalid header")]
    Header(#[from] header::ParseError),
    #[error("header declares a {rows}x{cols} block, but the output buffer holds {output} bytes")]
    ShapeMismatch { rows: u32, cols: u32, output: usize },
    #[error("unknown token byte {0:#04x}; you are probably decoding corrupted input")]
    InvalidToken(u8),
    #[error("back-reference points outside the already-read part of the stream; this is always corrupted input")]
    InvalidBackReference,
}
type Error = DecompressError; // do it this way for better docs

/// Decompress one block stream into an output buffer of exactly the
/// declared shape's size.
///
/// Back-references in the stream address *earlier bytes of the stream
/// itself*, never the output buffer: a matched cell was written to the
/// stream once, as part of some literal record, and every later occurrence
/// copies it from there. The decoder therefore only ever reads behind its
/// own cursor.
///
/// Returns the number of bytes written (`rows * cols`). On any error the
/// output buffer contents are unspecified and must be discarded.
#[throws]
pub fn decompress(input: &[u8], output: &mut [u8]) -> usize {
    let shape = parse_header(input)?;
    if shape.len() != output.len() {
        debug!("rejecting decode: {}x{} header against {}-byte output", shape.rows, shape.cols, output.len());
        throw!(Error::ShapeMismatch { rows: shape.rows, cols: shape.cols, output: output.len() });
    }

    for byte in output.iter_mut() {
        *byte = 0;
    }

    let cols = shape.cols as usize;
    let mut ip = HEADER_SIZE;
    let mut cell_bytes = [0u8; CELL_BYTES];

    for cell in shape.cells() {
        if cell.is_padded() {
            // padded cells are raw bytes with no token; the extent comes
            // from the header shape, same as on the encoding side
            let raw = take(input, &mut ip, cell.pad_rows * cell.pad_cols)?;
            for r in 0..cell.pad_rows {
                output[cell.origin + r * cols..][..cell.pad_cols]
                    .copy_from_slice(&raw[r * cell.pad_cols..][..cell.pad_cols]);
            }
            continue;
        }

        let record_start = ip;
        let token_byte = take(input, &mut ip, 1)?[0];
        let token = Token::decode(token_byte).ok_or_else(|| {
            debug!("invalid token {:#04x} at stream offset {}", token_byte, record_start);
            Error::InvalidToken(token_byte)
        })?;

        match token {
            Token::Literal => {
                cell_bytes.copy_from_slice(take(input, &mut ip, CELL_BYTES)?);
            }
            Token::AllEqual => {
                cell_bytes = [take(input, &mut ip, 1)?[0]; CELL_BYTES];
            }
            Token::CellMatch => {
                let matched = back_reference(input, &mut ip, record_start, CELL_BYTES)?;
                cell_bytes.copy_from_slice(matched);
            }
            Token::TripleMatch { rows } => {
                let matched = back_reference(input, &mut ip, record_start, 3 * ROW_BYTES)?;
                let spare = take(input, &mut ip, ROW_BYTES)?;
                for (slot, &r) in rows.iter().enumerate() {
                    cell_bytes[r * ROW_BYTES..][..ROW_BYTES]
                        .copy_from_slice(&matched[slot * ROW_BYTES..][..ROW_BYTES]);
                }
                let r = missing_row(rows);
                cell_bytes[r * ROW_BYTES..][..ROW_BYTES].copy_from_slice(spare);
            }
            Token::PairMatch { rows } => {
                let matched = back_reference(input, &mut ip, record_start, 2 * ROW_BYTES)?;
                let spare = take(input, &mut ip, 2 * ROW_BYTES)?;
                for (slot, &r) in rows.iter().enumerate() {
                    cell_bytes[r * ROW_BYTES..][..ROW_BYTES]
                        .copy_from_slice(&matched[slot * ROW_BYTES..][..ROW_BYTES]);
                }
                for (slot, &r) in remaining_rows(rows).iter().enumerate() {
                    cell_bytes[r * ROW_BYTES..][..ROW_BYTES]
                        .copy_from_slice(&spare[slot * ROW_BYTES..][..ROW_BYTES]);
                }
            }
        }

        for r in 0..CELL_DIM {
            output[cell.origin + r * cols..][..ROW_BYTES]
                .copy_from_slice(&cell_bytes[r * ROW_BYTES..][..ROW_BYTES]);
        }
    }

    shape.len()
}

/// Read `n` bytes off the stream, or fail if it ends first.
fn take<'a>(input: &'a [u8], ip: &mut usize, n: usize) -> Result<&'a [u8], Error> {
    let bytes = input
        .get(*ip..)
        .and_then(|rest| rest.get(..n))
        .ok_or(Error::UnexpectedEnd)?;
    *ip += n;
    Ok(bytes)
}

/// Read a u16 back-offset and resolve it to the referenced bytes, which
/// must lie entirely between the end of the header and the start of the
/// current record.
#[throws]
fn back_reference<'a>(input: &'a [u8], ip: &mut usize, record_start: usize, len: usize) -> &'a [u8] {
    let offset = LE::read_u16(take(input, ip, 2)?) as usize;
    let start = match record_start.checked_sub(offset) {
        Some(start) if offset > 0 && start >= HEADER_SIZE && start + len <= record_start => start,
        _ => {
            debug!("back-reference {} at stream offset {} escapes the stream", offset, record_start);
            throw!(Error::InvalidBackReference);
        }
    };
    &input[start..start + len]
}
