#![no_main]
use byteorder::{ByteOrder, LE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() < 9 {
        return;
    }
    // size the output from the header like a real container would, but cap
    // it so garbage dimensions don't turn into huge allocations
    let rows = LE::read_u32(&data[1..5]) as usize;
    let cols = LE::read_u32(&data[5..9]) as usize;
    let size = rows.saturating_mul(cols);
    if size > 1 << 22 {
        return;
    }
    let mut output = vec![0u8; size];
    let _ = ndlz::decompress(data, &mut output);
});
