use super::hash::HASH_BITS;

const TABLE_SIZE: usize = 1 << HASH_BITS;

/// One content-addressed match table: a 12-bit hash maps to the offset,
/// past the header, at which a previously written pattern begins.
///
/// Entries are offsets rather than pointers, so a candidate is resolved to
/// actual bytes only at verification time, by slicing the already-written
/// part of the output. The value 0 means "vacant"; that encoding is safe
/// because the first byte any pattern can occupy sits behind a record's
/// token byte, making every legal offset strictly positive.
pub(crate) struct MatchTable {
    slots: [u32; TABLE_SIZE],
}

impl Default for MatchTable {
    fn default() -> Self {
        MatchTable { slots: [0; TABLE_SIZE] }
    }
}

impl MatchTable {
    pub fn lookup(&self, hash: usize) -> Option<u32> {
        match self.slots[hash] {
            0 => None,
            offset => Some(offset),
        }
    }

    /// Unconditional store; the previous occupant is forgotten.
    pub fn insert(&mut self, hash: usize, offset: u32) {
        debug_assert!(offset > 0);
        self.slots[hash] = offset;
    }

    /// Store only into a vacant slot; the first occupant wins.
    pub fn insert_if_vacant(&mut self, hash: usize, offset: u32) {
        debug_assert!(offset > 0);
        if self.slots[hash] == 0 {
            self.slots[hash] = offset;
        }
    }

    fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = 0;
        }
    }
}

/// The three tables an encode runs on: whole 16-byte cells, 12-byte row
/// triples and 8-byte row pairs.
///
/// One value of this type is 48KiB of plain `u32`s. The convenience entry
/// point creates it per call; callers compressing many blocks can allocate
/// it once and reuse it, which skips nothing but the stack traffic — the
/// encoder clears it on entry either way, since every block stream must be
/// a pure function of the block alone.
pub struct MatchTables {
    pub(crate) cell: MatchTable,
    pub(crate) triple: MatchTable,
    pub(crate) pair: MatchTable,
}

impl Default for MatchTables {
    fn default() -> Self {
        MatchTables {
            cell: MatchTable::default(),
            triple: MatchTable::default(),
            pair: MatchTable::default(),
        }
    }
}

impl MatchTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reset(&mut self) {
        self.cell.clear();
        self.triple.clear();
        self.pair.clear();
    }
}
