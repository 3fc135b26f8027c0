use byteorder::{ByteOrder, LE};
use culpa::{throw, throws};
use log::debug;
use thiserror::Error;

use super::hash::pattern_hash;
use super::header::write_header;
use super::layout::BlockShape;
use super::table::{MatchTable, MatchTables};
use super::token::{missing_row, remaining_rows, Token, PAIRS, TRIPLES};
use super::{CELL_BYTES, CELL_DIM, HEADER_SIZE, MAX_DISTANCE, ROW_BYTES};

/// Errors when compressing a block.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum CompressError {
    #[error("input is {len} bytes but the declared shape is {rows}x{cols}")]
    InputShapeMismatch { len: usize, rows: u32, cols: u32 },
    #[error("blocks below 16 bytes don't have a single full cell; hand them to a linear codec instead")]
    InputTooSmall,
    #[error("output buffer holds {0} bytes but this block needs at least {1} to even start")]
    OutputTooSmall(usize, usize),
    #[error("compressed stream would outgrow the output buffer; the block is not compressible enough")]
    OutputOverflow,
}
type Error = CompressError; // do it this way for better docs

/// Worst-case compressed size for a block of this shape: the header, one
/// token byte per cell and every input byte spelled out literally.
///
/// An output buffer of this size makes [`compress`] immune to
/// [`OutputOverflow`](CompressError::OutputOverflow).
pub fn compress_bound(shape: BlockShape) -> usize {
    HEADER_SIZE + shape.cell_count() + shape.len()
}

/// Compress one block, allocating the match tables on the stack.
///
/// Returns the total number of bytes written, header included. On any error
/// the output buffer contents are unspecified and must be discarded.
#[throws]
pub fn compress(input: &[u8], shape: BlockShape, output: &mut [u8]) -> usize {
    compress_with_tables(input, shape, &mut MatchTables::default(), output)?
}

/// Compress one block using caller-owned match tables.
///
/// The tables are cleared on entry — a block stream is a function of the
/// block alone, never of what was compressed before it — so reuse buys only
/// the 48KiB of stack traffic, not warm state.
#[throws]
pub fn compress_with_tables(
    input: &[u8],
    shape: BlockShape,
    tables: &mut MatchTables,
    output: &mut [u8],
) -> usize {
    if input.len() != shape.len() {
        debug!("rejecting encode: {} input bytes for a {}x{} block", input.len(), shape.rows, shape.cols);
        throw!(Error::InputShapeMismatch { len: input.len(), rows: shape.rows, cols: shape.cols });
    }
    if input.len() < CELL_BYTES {
        throw!(Error::InputTooSmall);
    }
    let min_output = HEADER_SIZE + shape.cell_count() + CELL_BYTES;
    if output.len() < min_output {
        debug!("rejecting encode: output buffer {} below minimum {}", output.len(), min_output);
        throw!(Error::OutputTooSmall(output.len(), min_output));
    }

    tables.reset();

    write_header(shape, output);
    let mut op = HEADER_SIZE;

    let cols = shape.cols as usize;
    for cell in shape.cells() {
        if cell.is_padded() {
            // raw row-by-row copy, no token; the decoder re-derives the
            // extent from the header shape
            for r in 0..cell.pad_rows {
                let row = &input[cell.origin + r * cols..][..cell.pad_cols];
                op = emit(output, op, row)?;
            }
            continue;
        }

        let bytes = read_cell(input, cols, cell.origin);
        // offsets in the tables and in emitted records are all relative to
        // the end of the header
        let anchor = (op - HEADER_SIZE) as u32;

        if bytes.iter().all(|&b| b == bytes[0]) {
            op = emit(output, op, &[Token::AllEqual.encode(), bytes[0]])?;
            continue;
        }

        let cell_hash = pattern_hash(&bytes);
        if let Some(offset) = accept(&tables.cell, cell_hash, anchor, &bytes, &output[..op]) {
            op = emit_match(output, op, Token::CellMatch, offset, &[])?;
            continue;
        }

        if let Some(new_op) = try_rows(&bytes, anchor, tables, output, op)? {
            op = new_op;
            continue;
        }

        // literal fallback seeds the cell table with the position the 16
        // bytes are about to occupy
        tables.cell.insert(cell_hash, anchor + 1);
        let mut record = [0u8; 1 + CELL_BYTES];
        record[0] = Token::Literal.encode();
        record[1..].copy_from_slice(&bytes);
        op = emit(output, op, &record)?;
    }

    op
}

/// Probe the row-triple and row-pair tables for a partial-cell match and
/// emit the first hit. Returns the advanced cursor, or `None` when the cell
/// has to fall back to a literal.
#[throws]
fn try_rows(
    bytes: &[u8; CELL_BYTES],
    anchor: u32,
    tables: &mut MatchTables,
    output: &mut [u8],
    op: usize,
) -> Option<usize> {
    for &triple in TRIPLES.iter() {
        let key = triple_key(bytes, triple);
        let hash = pattern_hash(&key);
        if let Some(offset) = accept(&tables.triple, hash, anchor, &key, &output[..op]) {
            let spare = row(bytes, missing_row(triple));
            return Some(emit_match(output, op, Token::TripleMatch { rows: triple }, offset, spare)?);
        }
        // a miss seeds the table with where the run's first row would land
        // in a literal record, but only for runs that are contiguous there
        if triple[1] == triple[0] + 1 && triple[2] == triple[1] + 1 {
            tables.triple.insert_if_vacant(hash, anchor + 1 + (triple[0] * ROW_BYTES) as u32);
        }
    }

    for &pair in PAIRS.iter() {
        let key = pair_key(bytes, pair);
        let hash = pattern_hash(&key);
        if let Some(offset) = accept(&tables.pair, hash, anchor, &key, &output[..op]) {
            let [a, b] = remaining_rows(pair);
            let mut spare = [0u8; 2 * ROW_BYTES];
            spare[..ROW_BYTES].copy_from_slice(row(bytes, a));
            spare[ROW_BYTES..].copy_from_slice(row(bytes, b));
            return Some(emit_match(output, op, Token::PairMatch { rows: pair }, offset, &spare)?);
        }
        if pair[1] == pair[0] + 1 {
            tables.pair.insert_if_vacant(hash, anchor + 1 + (pair[0] * ROW_BYTES) as u32);
        }
    }

    None
}

/// The acceptance rule. A table hit becomes a match only when the stored
/// offset lies strictly before the current record, within reach of a 16-bit
/// back-offset, and the bytes actually written there equal the candidate.
/// Anything else — including entries seeded for records that were never
/// emitted as literals — is a miss.
fn accept(table: &MatchTable, hash: usize, anchor: u32, pattern: &[u8], written: &[u8]) -> Option<u16> {
    let stored = table.lookup(hash)?;
    let distance = anchor.checked_sub(stored).filter(|&d| d > 0 && d < MAX_DISTANCE)?;
    let candidate = written.get(HEADER_SIZE + stored as usize..)?.get(..pattern.len())?;
    if candidate != pattern {
        return None;
    }
    Some(distance as u16)
}

/// Append bytes at the cursor, refusing to write anything on overflow.
#[throws]
fn emit(output: &mut [u8], op: usize, bytes: &[u8]) -> usize {
    let end = op + bytes.len();
    if end > output.len() {
        debug!("compressed stream reached {} bytes, past the {}-byte output buffer", end, output.len());
        throw!(Error::OutputOverflow);
    }
    output[op..end].copy_from_slice(bytes);
    end
}

/// Append a back-reference record: token, little-endian offset, then any
/// rows the match leaves to be spelled out.
#[throws]
fn emit_match(output: &mut [u8], op: usize, token: Token, offset: u16, spare_rows: &[u8]) -> usize {
    let mut record = [0u8; 3 + 2 * ROW_BYTES];
    record[0] = token.encode();
    LE::write_u16(&mut record[1..3], offset);
    record[3..3 + spare_rows.len()].copy_from_slice(spare_rows);
    emit(output, op, &record[..3 + spare_rows.len()])?
}

/// Gather a full cell's 16 bytes from its four block rows.
fn read_cell(input: &[u8], cols: usize, origin: usize) -> [u8; CELL_BYTES] {
    let mut bytes = [0u8; CELL_BYTES];
    for r in 0..CELL_DIM {
        bytes[r * ROW_BYTES..][..ROW_BYTES]
            .copy_from_slice(&input[origin + r * cols..][..ROW_BYTES]);
    }
    bytes
}

fn row(bytes: &[u8; CELL_BYTES], r: usize) -> &[u8] {
    &bytes[r * ROW_BYTES..][..ROW_BYTES]
}

fn triple_key(bytes: &[u8; CELL_BYTES], rows: [usize; 3]) -> [u8; 3 * ROW_BYTES] {
    let mut key = [0u8; 3 * ROW_BYTES];
    for (slot, &r) in rows.iter().enumerate() {
        key[slot * ROW_BYTES..][..ROW_BYTES].copy_from_slice(row(bytes, r));
    }
    key
}

fn pair_key(bytes: &[u8; CELL_BYTES], rows: [usize; 2]) -> [u8; 2 * ROW_BYTES] {
    let mut key = [0u8; 2 * ROW_BYTES];
    for (slot, &r) in rows.iter().enumerate() {
        key[slot * ROW_BYTES..][..ROW_BYTES].copy_from_slice(row(bytes, r));
    }
    key
}
