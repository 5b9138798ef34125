//! Precomputed per-square adjacency masks, built once at compile time.

use crate::bitboard::Bitboard;
use crate::square::{NUM_SQUARES, SIDE};

/// Squares at Chebyshev distance 1 from each square — the clone targets.
pub(crate) static NEIGHBORS1: [Bitboard; NUM_SQUARES] = build_neighbors(1, 1);

/// Squares at Chebyshev distance exactly 2 from each square — the leap targets.
pub(crate) static NEIGHBORS2: [Bitboard; NUM_SQUARES] = build_neighbors(2, 2);

/// Build a table of per-square masks for all squares at Chebyshev distance
/// in `[min_dist, max_dist]` from that square, clipped to the board.
const fn build_neighbors(min_dist: i32, max_dist: i32) -> [Bitboard; NUM_SQUARES] {
    let mut table = [Bitboard::EMPTY; NUM_SQUARES];
    let side = SIDE as i32;
    let mut idx = 0;
    while idx < NUM_SQUARES {
        let file = (idx as i32) % side;
        let rank = (idx as i32) / side;
        let mut mask = 0u64;
        let mut df = -max_dist;
        while df <= max_dist {
            let mut dr = -max_dist;
            while dr <= max_dist {
                let dist = if df.abs() > dr.abs() { df.abs() } else { dr.abs() };
                if dist >= min_dist && dist <= max_dist {
                    let nf = file + df;
                    let nr = rank + dr;
                    if nf >= 0 && nf < side && nr >= 0 && nr < side {
                        let nidx = nr * side + nf;
                        mask |= 1u64 << nidx;
                    }
                }
                dr += 1;
            }
            df += 1;
        }
        table[idx] = Bitboard::new(mask);
        idx += 1;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::Square;

    #[test]
    fn center_square_has_8_clone_neighbors() {
        let center = Square::new(3, 3);
        assert_eq!(NEIGHBORS1[center.index()].count(), 8);
    }

    #[test]
    fn center_square_has_16_leap_neighbors() {
        let center = Square::new(3, 3);
        assert_eq!(NEIGHBORS2[center.index()].count(), 16);
    }

    #[test]
    fn corner_square_has_3_clone_neighbors() {
        let corner = Square::new(0, 0);
        assert_eq!(NEIGHBORS1[corner.index()].count(), 3);
    }

    #[test]
    fn neighbor_masks_never_include_self() {
        for sq in Square::all() {
            assert!(!NEIGHBORS1[sq.index()].contains(sq));
            assert!(!NEIGHBORS2[sq.index()].contains(sq));
        }
    }
}
